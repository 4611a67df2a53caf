//! Integration tests for the invocation endpoint.
//!
//! These drive the full dispatch pipeline through the axum router with the
//! noop controller (or a counting double) behind it, verifying the envelope
//! contract, validation, and the safety guard short-circuit.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use deskmote::controller::{ActionResult, Controller, MouseButton, NoopController, ScrollDirection};
use deskmote::{health_handler, invoke_handler, ready_handler, AppState, Catalog, Config};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// Controller double that counts every call before delegating to the noop
/// backend, so tests can assert the controller was never reached.
struct CountingController {
    inner: NoopController,
    calls: AtomicUsize,
}

impl CountingController {
    fn new() -> Self {
        Self {
            inner: NoopController::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Controller for CountingController {
    fn click(&self, x: i64, y: i64, button: MouseButton) -> ActionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.click(x, y, button)
    }

    fn type_text(&self, text: &str, press_enter: bool) -> ActionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.type_text(text, press_enter)
    }

    fn scroll(&self, amount: i64, direction: ScrollDirection) -> ActionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.scroll(amount, direction)
    }

    fn list_windows(&self) -> ActionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_windows()
    }

    fn focus_window(&self, title: &str) -> ActionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.focus_window(title)
    }

    fn launch_app(&self, target: &str) -> ActionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.launch_app(target)
    }

    fn backend(&self) -> &'static str {
        "counting"
    }
}

fn create_test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/invoke", post(invoke_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
}

fn noop_state() -> Arc<AppState> {
    Arc::new(AppState::with_controller(
        Config::for_tests(),
        Arc::new(NoopController::new()),
    ))
}

fn counting_state() -> (Arc<AppState>, Arc<CountingController>) {
    let controller = Arc::new(CountingController::new());
    let state = Arc::new(AppState::with_controller(
        Config::for_tests(),
        controller.clone(),
    ));
    (state, controller)
}

/// Helper to make a JSON request to the router.
async fn json_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let req = match method {
        "GET" => Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
        "POST" => Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.unwrap_or(json!({})).to_string()))
            .unwrap(),
        _ => panic!("Unsupported method"),
    };

    let response = app.oneshot(req).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

async fn invoke(app: Router, tool: &str, params: Value) -> (StatusCode, Value) {
    json_request(
        app,
        "POST",
        "/invoke",
        Some(json!({ "tool": tool, "params": params })),
    )
    .await
}

// ============================================================================
// Health Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_200() {
    let app = create_test_app(noop_state());
    let (status, body) = json_request(app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_endpoint_reports_backend() {
    let app = create_test_app(noop_state());
    let (status, body) = json_request(app, "GET", "/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["backend"], "noop");
}

// ============================================================================
// Envelope Contract Tests
// ============================================================================

#[tokio::test]
async fn test_unknown_tool_returns_envelope_without_controller_call() {
    let (state, controller) = counting_state();
    let app = create_test_app(state);

    let (status, body) = invoke(app, "nonexistent_tool", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["result"], Value::Null);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("nonexistent_tool"));
    assert_eq!(controller.count(), 0);
}

#[tokio::test]
async fn test_click_echoes_coordinates_and_button() {
    let app = create_test_app(noop_state());

    let (status, body) = invoke(
        app,
        "click",
        json!({ "x": 100, "y": 200, "button": "left" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["tool"], "click");
    assert_eq!(body["error"], Value::Null);
    assert_eq!(body["result"]["success"], true);

    let message = body["result"]["message"].as_str().unwrap();
    assert!(message.contains("100"));
    assert!(message.contains("200"));
    assert!(message.contains("left"));
}

#[tokio::test]
async fn test_click_defaults_to_left_button() {
    let app = create_test_app(noop_state());

    let (_, body) = invoke(app, "click", json!({ "x": 5, "y": 7 })).await;

    assert_eq!(body["success"], true);
    assert!(body["result"]["message"].as_str().unwrap().contains("left"));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[tokio::test]
async fn test_missing_required_parameter_rejected_before_controller() {
    let (state, controller) = counting_state();
    let app = create_test_app(state);

    let (status, body) = invoke(app, "click", json!({ "x": 100 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("'y'"), "error should name the parameter: {error}");
    assert_eq!(controller.count(), 0);
}

#[tokio::test]
async fn test_wrong_parameter_type_rejected() {
    let (state, controller) = counting_state();
    let app = create_test_app(state);

    let (_, body) = invoke(app, "click", json!({ "x": "abc", "y": 200 })).await;

    assert_eq!(body["success"], false);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("'x'"));
    assert!(error.contains("integer"));
    assert_eq!(controller.count(), 0);
}

#[tokio::test]
async fn test_out_of_enum_button_rejected() {
    let (state, controller) = counting_state();
    let app = create_test_app(state);

    let (_, body) = invoke(
        app,
        "click",
        json!({ "x": 1, "y": 1, "button": "top" }),
    )
    .await;

    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("'button'"));
    assert_eq!(controller.count(), 0);
}

#[tokio::test]
async fn test_unexpected_parameter_rejected() {
    let app = create_test_app(noop_state());

    let (_, body) = invoke(
        app,
        "list_windows",
        json!({ "verbose": true }),
    )
    .await;

    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("'verbose'"));
}

// ============================================================================
// Safety Guard Tests (through the dispatch pipeline)
// ============================================================================

#[tokio::test]
async fn test_destructive_launch_target_never_reaches_controller() {
    let (state, controller) = counting_state();
    let app = create_test_app(state);

    let (status, body) = invoke(app, "launch_app", json!({ "target": "rm -rf /" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["tool"], "launch_app");
    assert_eq!(body["result"], Value::Null);
    assert!(!body["error"].as_str().unwrap().is_empty());
    assert_eq!(controller.count(), 0);
}

#[tokio::test]
async fn test_destructive_typed_text_never_reaches_controller() {
    let (state, controller) = counting_state();
    let app = create_test_app(state);

    let (_, body) = invoke(
        app,
        "type_text",
        json!({ "text": ":(){ :|:& };:", "enter": true }),
    )
    .await;

    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("fork bomb"));
    assert_eq!(controller.count(), 0);
}

#[tokio::test]
async fn test_benign_text_is_typed() {
    let app = create_test_app(noop_state());

    let (_, body) = invoke(
        app,
        "type_text",
        json!({ "text": "hello world", "enter": true }),
    )
    .await;

    assert_eq!(body["success"], true);
    assert!(body["result"]["message"]
        .as_str()
        .unwrap()
        .contains("Enter"));
}

// ============================================================================
// Noop Backend Properties
// ============================================================================

#[tokio::test]
async fn test_list_windows_is_idempotent() {
    let state = noop_state();

    let (_, first) = invoke(create_test_app(state.clone()), "list_windows", json!({})).await;
    let (_, second) = invoke(create_test_app(state), "list_windows", json!({})).await;

    assert_eq!(first["success"], true);
    assert_eq!(first, second);
}

/// Every advertised tool must be invocable with arguments built from its own
/// schema, and succeed against the noop backend.
#[tokio::test]
async fn test_every_catalog_tool_is_invocable_from_its_schema() {
    let state = noop_state();
    let catalog = Catalog::build();

    for descriptor in catalog.list() {
        let schema = descriptor.input_schema();
        let mut params = serde_json::Map::new();

        for name in schema["required"].as_array().unwrap() {
            let name = name.as_str().unwrap();
            let prop = &schema["properties"][name];
            let value = match prop["type"].as_str().unwrap() {
                "integer" => json!(42),
                "boolean" => json!(false),
                "string" => prop["enum"]
                    .as_array()
                    .and_then(|values| values.first().cloned())
                    .unwrap_or(json!("sample")),
                other => panic!("unhandled schema type {other}"),
            };
            params.insert(name.to_string(), value);
        }

        let app = create_test_app(state.clone());
        let (status, body) = invoke(app, descriptor.name, Value::Object(params)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["success"], true,
            "tool {} failed: {body}",
            descriptor.name
        );
    }
}
