//! Deskmote - remote desktop-automation tool server
//!
//! This library exposes the protocol and dispatch core, enabling
//! integration tests and embedding in other applications: the tool catalog,
//! the safety guard, the controller capability, the dispatcher, and the
//! streaming-session handler.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod safety;
pub mod state;

// Re-export key types for convenience
pub use catalog::{Catalog, ToolDescriptor};
pub use config::Config;
pub use controller::{ActionResult, Controller, NoopController};
pub use dispatch::{InvokeRequest, InvokeResponse};
pub use error::{DispatchError, Result};
pub use handlers::{health_handler, invoke_handler, ready_handler, sse_handler};
pub use safety::{OperationKind, SafetyGuard, Verdict};
pub use state::AppState;
