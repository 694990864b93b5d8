//! Engine-side error type

use thiserror::Error;

/// Errors returned by a [`NetworkEngine`](super::NetworkEngine) call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Referenced friend or groupchat does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Engine rejected an argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Engine holds no secret key
    #[error("No secret key available")]
    KeyUnavailable,

    /// Engine was destroyed while the call was outstanding
    #[error("Engine destroyed")]
    Destroyed,

    /// Any other engine failure
    #[error("Engine failure: {0}")]
    Failure(String),
}
