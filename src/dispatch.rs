//! Invocation dispatcher: catalog lookup, validation, safety, execution.
//!
//! Every request flows through [`invoke`] and comes back as a uniform
//! [`InvokeResponse`] envelope. Failures of any kind are folded into the
//! envelope at this boundary; a single bad invocation can never take down
//! the process or a streaming session.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::catalog::Catalog;
use crate::controller::{ActionResult, Controller, MouseButton, ScrollDirection};
use crate::error::{DispatchError, Result};
use crate::safety::OperationKind;
use crate::state::AppState;

/// Hard ceiling on one controller action, covering the case of an OS call
/// that never returns.
///
/// Must exceed the native controller's per-subprocess timeout: when this
/// timeout fires the blocking task is abandoned (not cancelled) and the
/// controller gate is released, so the subprocess must already have been
/// killed for the serialization invariant to hold.
const ACTION_TIMEOUT: Duration = Duration::from_secs(15);

const _: () = assert!(
    ACTION_TIMEOUT.as_secs() > crate::controller::SUBPROCESS_TIMEOUT.as_secs(),
    "action timeout must outlast the subprocess timeout"
);

/// One tool invocation as received from the caller.
#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    pub tool: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// Uniform response envelope. Exactly one of `result`/`error` is populated,
/// matching `success`.
#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    pub success: bool,
    pub tool: String,
    pub result: Option<ActionResult>,
    pub error: Option<String>,
}

/// Fully parsed controller action, built only after validation passes.
enum Action {
    Click {
        x: i64,
        y: i64,
        button: MouseButton,
    },
    TypeText {
        text: String,
        enter: bool,
    },
    Scroll {
        amount: i64,
        direction: ScrollDirection,
    },
    ListWindows,
    FocusWindow {
        title: String,
    },
    LaunchApp {
        target: String,
    },
}

/// Dispatch a single invocation end to end.
pub async fn invoke(state: &AppState, request: InvokeRequest) -> InvokeResponse {
    let tool = request.tool.clone();
    let started = Instant::now();

    let outcome = run(state, &request).await;

    metrics::counter!("invoke_requests_total", "tool" => tool.clone()).increment(1);
    metrics::histogram!("invoke_duration_seconds").record(started.elapsed().as_secs_f64());

    match outcome {
        Ok(result) => {
            tracing::info!(tool = %tool, success = result.success, "invocation completed");
            let success = result.success;
            let (result, error) = if success {
                (Some(result), None)
            } else {
                (None, Some(result.message))
            };
            InvokeResponse {
                success,
                tool,
                result,
                error,
            }
        }
        Err(err) => {
            metrics::counter!("invoke_failures_total", "kind" => err.kind()).increment(1);
            tracing::warn!(tool = %tool, kind = err.kind(), "invocation rejected");
            InvokeResponse {
                success: false,
                tool,
                result: None,
                error: Some(err.to_string()),
            }
        }
    }
}

async fn run(state: &AppState, request: &InvokeRequest) -> Result<ActionResult> {
    let descriptor = state
        .catalog
        .get(&request.tool)
        .ok_or_else(|| DispatchError::ToolNotFound(request.tool.clone()))?;

    Catalog::validate(descriptor, &request.params)?;

    let action = parse_action(&request.tool, &request.params)?;

    // Safety runs on the resolved string values, after validation, so a
    // renamed or aliased field can never slip a payload past the guard.
    match &action {
        Action::TypeText { text, .. } => {
            let verdict = state.guard.check(OperationKind::FreeText, text);
            if !verdict.allowed {
                return Err(DispatchError::SafetyRejected(
                    verdict.reason.unwrap_or_else(|| "text input rejected".to_string()),
                ));
            }
        }
        Action::LaunchApp { target } => {
            let verdict = state.guard.check(OperationKind::LaunchTarget, target);
            if !verdict.allowed {
                return Err(DispatchError::SafetyRejected(
                    verdict.reason.unwrap_or_else(|| "launch target rejected".to_string()),
                ));
            }
        }
        _ => {}
    }

    execute(state, action).await
}

/// Run the controller action on the blocking pool, serialized behind the
/// controller gate. A panicking task or an action that outlives
/// [`ACTION_TIMEOUT`] surfaces as an error envelope, never a crash.
async fn execute(state: &AppState, action: Action) -> Result<ActionResult> {
    let _gate = state.controller_gate.lock().await;
    let controller = Arc::clone(&state.controller);

    let task = tokio::task::spawn_blocking(move || perform(controller.as_ref(), action));

    match tokio::time::timeout(ACTION_TIMEOUT, task).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(join_err)) => Err(DispatchError::Internal(format!(
            "controller task failed: {join_err}"
        ))),
        Err(_) => Err(DispatchError::Backend(format!(
            "controller action did not finish within {}s",
            ACTION_TIMEOUT.as_secs()
        ))),
    }
}

fn perform(controller: &dyn Controller, action: Action) -> ActionResult {
    match action {
        Action::Click { x, y, button } => controller.click(x, y, button),
        Action::TypeText { text, enter } => controller.type_text(&text, enter),
        Action::Scroll { amount, direction } => controller.scroll(amount, direction),
        Action::ListWindows => controller.list_windows(),
        Action::FocusWindow { title } => controller.focus_window(&title),
        Action::LaunchApp { target } => controller.launch_app(&target),
    }
}

fn parse_action(tool: &str, params: &Map<String, Value>) -> Result<Action> {
    match tool {
        "click" => Ok(Action::Click {
            x: require_i64(params, "x")?,
            y: require_i64(params, "y")?,
            button: MouseButton::parse(optional_str(params, "button", "left"))
                .ok_or_else(|| internal("button"))?,
        }),
        "type_text" => Ok(Action::TypeText {
            text: require_str(params, "text")?.to_string(),
            enter: optional_bool(params, "enter", false),
        }),
        "scroll" => Ok(Action::Scroll {
            amount: require_i64(params, "amount")?,
            direction: ScrollDirection::parse(optional_str(params, "direction", "vertical"))
                .ok_or_else(|| internal("direction"))?,
        }),
        "list_windows" => Ok(Action::ListWindows),
        "focus_window" => Ok(Action::FocusWindow {
            title: require_str(params, "title")?.to_string(),
        }),
        "launch_app" => Ok(Action::LaunchApp {
            target: require_str(params, "target")?.to_string(),
        }),
        other => Err(DispatchError::ToolNotFound(other.to_string())),
    }
}

// Extraction helpers. Validation has already passed by the time these run,
// so a miss here is an internal inconsistency, not a caller error.

fn internal(name: &str) -> DispatchError {
    DispatchError::Internal(format!("parameter '{name}' invalid after validation"))
}

fn require_i64(params: &Map<String, Value>, name: &str) -> Result<i64> {
    params
        .get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| internal(name))
}

fn require_str<'a>(params: &'a Map<String, Value>, name: &str) -> Result<&'a str> {
    params
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| internal(name))
}

fn optional_str<'a>(params: &'a Map<String, Value>, name: &str, default: &'a str) -> &'a str {
    params.get(name).and_then(Value::as_str).unwrap_or(default)
}

fn optional_bool(params: &Map<String, Value>, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}
