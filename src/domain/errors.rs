//! Domain errors for the relayops orchestrator.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the orchestration engine.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported OS type: {0}")]
    UnsupportedOs(String),

    #[error("Upstream service failure: {0}")]
    Upstream(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

impl OrchestratorError {
    /// Whether the error is a caller mistake (never retried internally).
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::TaskNotFound(_)
                | Self::AgentNotFound(_)
                | Self::InvalidTransition { .. }
                | Self::InvalidInput(_)
                | Self::UnsupportedOs(_)
        )
    }
}

impl From<sqlx::Error> for OrchestratorError {
    fn from(err: sqlx::Error) -> Self {
        OrchestratorError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for OrchestratorError {
    fn from(err: serde_json::Error) -> Self {
        OrchestratorError::Serialization(err.to_string())
    }
}
