use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::controller::{select_backend, Controller};
use crate::safety::SafetyGuard;

/// Application state shared across all request handlers.
///
/// Everything here is fixed after startup: the catalog is immutable, the
/// controller selection never changes, and the guard's deny-list is
/// compiled in. Request handling therefore needs no application-level
/// locking beyond the controller gate.
pub struct AppState {
    pub catalog: Catalog,
    pub guard: SafetyGuard,
    pub controller: Arc<dyn Controller>,
    /// Single-owner gate serializing controller calls. There is one
    /// pointer/keyboard per display, so concurrent invocations must not
    /// interleave their actions.
    pub controller_gate: Mutex<()>,
    /// Flag indicating the backend has been selected and the server is
    /// accepting invocations.
    pub ready: AtomicBool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Initialize application state, selecting the controller backend once.
    pub fn new(config: Config) -> Self {
        let controller = select_backend(&config);
        Self::with_controller(config, controller)
    }

    /// Initialize with an explicit controller. Used by tests to substitute
    /// a counting double.
    pub fn with_controller(config: Config, controller: Arc<dyn Controller>) -> Self {
        tracing::info!(backend = controller.backend(), "controller backend selected");

        let guard = SafetyGuard::new(config.allowed_launch_targets.clone());
        let state = Self {
            catalog: Catalog::build(),
            guard,
            controller,
            controller_gate: Mutex::new(()),
            ready: AtomicBool::new(false),
            config: Arc::new(config),
        };
        state.ready.store(true, Ordering::SeqCst);
        state
    }

    /// Check if the service is ready to handle requests.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}
