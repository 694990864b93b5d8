//! Audio/video companion
//!
//! Call negotiation lives in the engine; the client only creates this
//! companion when AV is enabled and ties its lifetime to the handle.

use std::sync::{Arc, Weak};

use crate::error::{ClientError, ClientResult};
use crate::handle::HandleGuard;

/// AV companion of a client, present when `enable_av` was set
#[derive(Debug, Clone)]
pub struct AvCompanion {
    guard: Weak<HandleGuard>,
}

impl AvCompanion {
    pub(crate) fn attach(guard: &Arc<HandleGuard>) -> Self {
        Self {
            guard: Arc::downgrade(guard),
        }
    }

    /// True while the owning client's handle is live
    pub fn is_attached(&self) -> bool {
        self.guard.upgrade().is_some_and(|g| g.is_live())
    }

    /// `HandleInvalid` once the owning client was killed or dropped
    pub fn check(&self) -> ClientResult<()> {
        match self.guard.upgrade() {
            Some(guard) => guard.check(),
            None => Err(ClientError::HandleInvalid("client dropped".to_string())),
        }
    }
}
