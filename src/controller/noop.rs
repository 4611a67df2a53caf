//! Deterministic no-op controller for headless environments.
//!
//! Every action synthesizes a success message echoing its arguments without
//! touching any input device or window manager. Repeated calls with the same
//! arguments produce structurally identical results, which the integration
//! tests rely on.

use serde_json::json;

use super::{ActionResult, Controller, MouseButton, ScrollDirection};

pub struct NoopController;

impl NoopController {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoopController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for NoopController {
    fn click(&self, x: i64, y: i64, button: MouseButton) -> ActionResult {
        ActionResult::ok(format!(
            "click at ({x}, {y}) with {} button recorded (noop mode)",
            button.as_str()
        ))
    }

    fn type_text(&self, text: &str, press_enter: bool) -> ActionResult {
        let suffix = if press_enter { ", then pressed Enter" } else { "" };
        ActionResult::ok(format!(
            "typed {} characters{suffix} (noop mode)",
            text.chars().count()
        ))
    }

    fn scroll(&self, amount: i64, direction: ScrollDirection) -> ActionResult {
        ActionResult::ok(format!(
            "scroll {} by {amount} recorded (noop mode)",
            direction.as_str()
        ))
    }

    fn list_windows(&self) -> ActionResult {
        ActionResult::ok_with_data(
            "window listing not available in noop mode, returning empty list",
            json!({ "windows": [] }),
        )
    }

    fn focus_window(&self, title: &str) -> ActionResult {
        ActionResult::ok(format!("focus request for '{title}' recorded (noop mode)"))
    }

    fn launch_app(&self, target: &str) -> ActionResult {
        ActionResult::ok(format!("launch request for '{target}' recorded (noop mode)"))
    }

    fn backend(&self) -> &'static str {
        "noop"
    }
}
