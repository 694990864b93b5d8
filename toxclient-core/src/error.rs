//! Error types for client operations

use thiserror::Error;

use crate::engine::EngineError;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by every client operation, in both blocking and
/// non-blocking form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The engine handle is not live (never created, or already destroyed)
    #[error("Handle invalid: {0}")]
    HandleInvalid(String),

    /// Referenced friend or groupchat does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Secret key requested but the engine holds none
    #[error("Key unavailable: {0}")]
    KeyUnavailable(String),

    /// Underlying engine call failed
    #[error("Engine failure: {0}")]
    EngineFailure(String),

    /// Argument rejected before reaching the engine
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ClientError {
    /// Short, stable label for the error category (used in logs and metrics)
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::HandleInvalid(_) => "handle_invalid",
            ClientError::NotFound(_) => "not_found",
            ClientError::KeyUnavailable(_) => "key_unavailable",
            ClientError::EngineFailure(_) => "engine_failure",
            ClientError::InvalidArgument(_) => "invalid_argument",
        }
    }

    pub fn is_handle_invalid(&self) -> bool {
        matches!(self, ClientError::HandleInvalid(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

impl From<EngineError> for ClientError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::NotFound(msg) => ClientError::NotFound(msg),
            EngineError::InvalidArgument(msg) => ClientError::InvalidArgument(msg),
            EngineError::KeyUnavailable => {
                ClientError::KeyUnavailable("engine holds no secret key".to_string())
            }
            EngineError::Destroyed => ClientError::HandleInvalid("engine destroyed".to_string()),
            EngineError::Failure(msg) => ClientError::EngineFailure(msg),
        }
    }
}
