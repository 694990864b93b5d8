//! Engine handle lifecycle
//!
//! The client owns exactly one engine, tracked through an explicit state
//! tag: `Uninitialized -> Live -> Destroyed`. Operations take a shared
//! [`Lease`] for the duration of their engine call; destroying takes the
//! exclusive lock, so it can never interleave with an in-flight call.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use tracing::{debug, info};

use crate::engine::NetworkEngine;
use crate::error::{ClientError, ClientResult};

/// Lifecycle state of the engine handle
pub enum HandleState {
    Uninitialized,
    Live(Arc<dyn NetworkEngine>),
    /// Terminal
    Destroyed,
}

impl HandleState {
    pub fn name(&self) -> &'static str {
        match self {
            HandleState::Uninitialized => "uninitialized",
            HandleState::Live(_) => "live",
            HandleState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Debug for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn invalid(state: &HandleState) -> ClientError {
    ClientError::HandleInvalid(format!("handle is {}", state.name()))
}

/// Guards the engine handle
#[derive(Debug)]
pub struct HandleGuard {
    state: RwLock<HandleState>,
}

/// Shared lease on a live handle
///
/// While any lease exists the handle cannot be destroyed.
pub struct Lease<'a> {
    _state: RwLockReadGuard<'a, HandleState>,
    engine: Arc<dyn NetworkEngine>,
}

impl Lease<'_> {
    pub fn engine(&self) -> &dyn NetworkEngine {
        self.engine.as_ref()
    }
}

impl HandleGuard {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(HandleState::Uninitialized),
        }
    }

    /// Guard that is already live
    pub fn live(engine: Arc<dyn NetworkEngine>) -> Self {
        Self {
            state: RwLock::new(HandleState::Live(engine)),
        }
    }

    // A panic while the lock is held happens outside the state transitions
    // below, so the tag is always consistent and poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HandleState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install the engine. Only valid from `Uninitialized`.
    pub fn install(&self, engine: Arc<dyn NetworkEngine>) -> ClientResult<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match *state {
            HandleState::Uninitialized => {
                *state = HandleState::Live(engine);
                info!("Engine handle live");
                Ok(())
            }
            ref other => Err(ClientError::HandleInvalid(format!(
                "cannot install engine, handle is {}",
                other.name()
            ))),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(*self.read(), HandleState::Live(_))
    }

    pub fn state_name(&self) -> &'static str {
        self.read().name()
    }

    /// `Ok(())` when live, `HandleInvalid` otherwise
    pub fn check(&self) -> ClientResult<()> {
        let state = self.read();
        match *state {
            HandleState::Live(_) => Ok(()),
            ref other => Err(invalid(other)),
        }
    }

    /// Take a shared lease on the live engine
    pub fn lease(&self) -> ClientResult<Lease<'_>> {
        let state = self.read();
        let engine = match *state {
            HandleState::Live(ref engine) => engine.clone(),
            ref other => return Err(invalid(other)),
        };
        Ok(Lease {
            _state: state,
            engine,
        })
    }

    /// Clone out the live engine without holding a lease
    pub fn engine(&self) -> ClientResult<Arc<dyn NetworkEngine>> {
        Ok(self.lease()?.engine.clone())
    }

    /// Destroy the engine and clear the handle
    ///
    /// Waits for every outstanding lease. Fails with `HandleInvalid` unless
    /// the handle is live, so a second destroy is an error.
    pub fn destroy(&self) -> ClientResult<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let engine = match std::mem::replace(&mut *state, HandleState::Destroyed) {
            HandleState::Live(engine) => engine,
            other => {
                let err = invalid(&other);
                *state = other;
                return Err(err);
            }
        };
        engine.destroy();
        info!("Engine handle destroyed");
        debug!(remaining_refs = Arc::strong_count(&engine) - 1, "Engine released");
        Ok(())
    }
}

impl Default for HandleGuard {
    fn default() -> Self {
        Self::new()
    }
}
