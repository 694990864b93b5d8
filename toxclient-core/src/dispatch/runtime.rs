//! Execution context for non-blocking work
//!
//! Inside a tokio runtime the client borrows it. Outside of one it builds
//! its own multi-threaded runtime and shuts it down when dropped.

use std::future::Future;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

pub struct Executor {
    handle: Handle,
    owned: Option<Runtime>,
}

impl Executor {
    /// Use the current runtime, or start one with `worker_threads` workers
    pub fn new(worker_threads: usize) -> ClientResult<Self> {
        if let Ok(handle) = Handle::try_current() {
            debug!("Using ambient tokio runtime");
            return Ok(Self {
                handle,
                owned: None,
            });
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("toxclient-worker")
            .enable_all()
            .build()
            .map_err(|e| ClientError::EngineFailure(format!("failed to start runtime: {}", e)))?;
        debug!(worker_threads, "Started owned tokio runtime");
        Ok(Self {
            handle: runtime.handle().clone(),
            owned: Some(runtime),
        })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// True when the runtime belongs to this executor
    pub fn owns_runtime(&self) -> bool {
        self.owned.is_some()
    }

    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }

    pub fn spawn_blocking<F, R>(&self, f: F) -> JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.handle.spawn_blocking(f)
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        if let Some(runtime) = self.owned.take() {
            // May run inside another runtime, where a blocking shutdown panics
            runtime.shutdown_background();
            debug!("Owned tokio runtime shut down");
        }
    }
}
