use thiserror::Error;

/// Failures produced while dispatching a tool invocation.
///
/// Every variant is recovered at the dispatch boundary and surfaced to the
/// caller inside the response envelope; none of these terminate the process
/// or the streaming session.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("unknown tool: {0}")]
    ToolNotFound(String),

    #[error("invalid parameters: {0}")]
    Validation(String),

    #[error("blocked by safety guard: {0}")]
    SafetyRejected(String),

    #[error("backend action failed: {0}")]
    Backend(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    /// Short machine-readable kind, used in logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ToolNotFound(_) => "tool_not_found",
            Self::Validation(_) => "validation",
            Self::SafetyRejected(_) => "safety_rejected",
            Self::Backend(_) => "backend",
            Self::Internal(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
