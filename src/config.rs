use std::env;

/// Which controller backend to activate at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendChoice {
    /// Probe for a usable display; fall back to noop when none is found.
    Auto,
    /// Force the OS-backed controller.
    Native,
    /// Force the deterministic no-op controller.
    Noop,
}

impl BackendChoice {
    fn from_env() -> Self {
        match env::var("DESKMOTE_BACKEND")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "native" | "x11" => Self::Native,
            "noop" | "headless" | "off" => Self::Noop,
            _ => Self::Auto,
        }
    }
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Backend selection policy, fixed for the process lifetime.
    pub backend: BackendChoice,
    /// Seconds between `ping` events on a streaming session.
    pub heartbeat_secs: u64,
    /// Optional launch allow-list. When non-empty, `launch_app` targets must
    /// appear on it in addition to clearing the safety deny-list.
    pub allowed_launch_targets: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// `DESKMOTE_BACKEND` selects the controller backend (`auto`, `native`,
    /// `noop`); `DESKMOTE_ALLOWED_APPS` is a comma-separated launch
    /// allow-list, empty meaning "any target that clears the deny-list".
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            backend: BackendChoice::from_env(),
            heartbeat_secs: env::var("DESKMOTE_HEARTBEAT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            allowed_launch_targets: env::var("DESKMOTE_ALLOWED_APPS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Configuration for tests and embedded use: noop backend, fast
    /// heartbeat, no allow-list.
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            shutdown_timeout_secs: 0,
            backend: BackendChoice::Noop,
            heartbeat_secs: 1,
            allowed_launch_targets: Vec::new(),
        }
    }
}
