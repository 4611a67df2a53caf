//! Desktop controller capability: one trait, two backends.
//!
//! The dispatcher only ever sees the [`Controller`] trait; whether actions
//! hit a real X11 desktop or the deterministic noop stand-in is decided once
//! at startup by [`select_backend`] and never revisited.

mod native;
mod noop;

pub use native::NativeController;
pub(crate) use native::SUBPROCESS_TIMEOUT;
pub use noop::NoopController;

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::{BackendChoice, Config};

/// Mouse button for `click`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "middle" => Some(Self::Middle),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Middle => "middle",
        }
    }
}

/// Scroll axis for `scroll`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Vertical,
    Horizontal,
}

impl ScrollDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "vertical" => Some(Self::Vertical),
            "horizontal" => Some(Self::Horizontal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
        }
    }
}

/// Outcome of a single controller action. Immutable once returned.
///
/// Backend failures are reported here as `success=false` with the platform
/// error message; they never propagate as panics or process faults.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn ok_with_data(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Primitive UI actions exposed to the dispatcher.
///
/// Implementations must be infallible at the type level: platform errors are
/// folded into the returned [`ActionResult`].
pub trait Controller: Send + Sync {
    fn click(&self, x: i64, y: i64, button: MouseButton) -> ActionResult;
    fn type_text(&self, text: &str, press_enter: bool) -> ActionResult;
    fn scroll(&self, amount: i64, direction: ScrollDirection) -> ActionResult;
    fn list_windows(&self) -> ActionResult;
    fn focus_window(&self, title: &str) -> ActionResult;
    fn launch_app(&self, target: &str) -> ActionResult;

    /// Backend name for logs and the readiness probe.
    fn backend(&self) -> &'static str;
}

/// Pick the controller backend once, at process start.
///
/// `BackendChoice::Auto` probes for a usable X11 session (a `DISPLAY`
/// variable plus the `xdotool` binary); anything short of that falls back to
/// the noop controller so the same dispatch path keeps working headless.
pub fn select_backend(config: &Config) -> Arc<dyn Controller> {
    match config.backend {
        BackendChoice::Noop => Arc::new(NoopController::new()),
        BackendChoice::Native => Arc::new(NativeController::new()),
        BackendChoice::Auto => {
            if native_available() {
                Arc::new(NativeController::new())
            } else {
                tracing::info!("no usable display automation found, using noop backend");
                Arc::new(NoopController::new())
            }
        }
    }
}

/// True when the OS-backed controller can plausibly drive a desktop.
fn native_available() -> bool {
    if std::env::var_os("DISPLAY").is_none() {
        return false;
    }
    binary_on_path("xdotool")
}

fn binary_on_path(name: &str) -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| dir.join(name).is_file())
}
