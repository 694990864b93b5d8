/*
    Dispatch - one execution path, two ways to finish

    Every client operation is an `Operation`: an engine request (or the
    validation error that prevented building one) plus a decoder for the
    engine's response. `Dispatcher::execute` runs the shared steps:

    1. Count and log the operation
    2. Report a validation error, or a handle that is not live
    3. Capture the engine and draw a ticket for the touched resource

    and hands the prepared call to a `Completion` strategy:

    - Immediate: wait for the ticket on the caller's thread, lease the
      handle, invoke, return `ClientResult<T>`
    - Deferred:  do the same on the blocking pool and return a `Pending<T>`

    Both end in `Prepared::run`, so the two forms cannot drift apart.
*/

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::engine::{EngineRequest, EngineResponse, NetworkEngine};
use crate::error::{ClientError, ClientResult};
use crate::handle::HandleGuard;
use crate::metrics::{self, Mode, Timer};

pub mod runtime;
pub mod sequencer;

pub use runtime::Executor;
pub use sequencer::{Sequencer, Ticket};

/// Turns a successful engine response into the operation's result
pub type Decode<T> = Box<dyn FnOnce(EngineResponse) -> ClientResult<T> + Send>;

/// A client operation ready for dispatch
pub struct Operation<T> {
    name: &'static str,
    request: ClientResult<EngineRequest>,
    decode: Decode<T>,
}

impl<T> Operation<T> {
    pub fn new<D>(request: EngineRequest, decode: D) -> Self
    where
        D: FnOnce(EngineResponse) -> ClientResult<T> + Send + 'static,
    {
        Self {
            name: request.name(),
            request: Ok(request),
            decode: Box::new(decode),
        }
    }

    /// Operation whose request came out of argument validation
    pub fn validated<D>(name: &'static str, request: ClientResult<EngineRequest>, decode: D) -> Self
    where
        D: FnOnce(EngineResponse) -> ClientResult<T> + Send + 'static,
    {
        Self {
            name,
            request,
            decode: Box::new(decode),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Error for a response variant the operation does not expect
pub fn unexpected(op: &'static str, response: &EngineResponse) -> ClientError {
    ClientError::EngineFailure(format!(
        "{} got unexpected {} response",
        op,
        response.variant()
    ))
}

/// A validated call, bound to an engine and its place in line
pub struct Prepared<T> {
    name: &'static str,
    request: EngineRequest,
    decode: Decode<T>,
    engine: Arc<dyn NetworkEngine>,
    guard: Arc<HandleGuard>,
    ticket: Option<Ticket>,
}

impl<T> Prepared<T> {
    /// Wait for the resource, lease the handle and invoke the engine
    pub fn run(self) -> ClientResult<T> {
        let Prepared {
            name,
            request,
            decode,
            engine,
            guard,
            ticket,
        } = self;

        if let Some(ticket) = &ticket {
            ticket.wait_turn();
        }

        let timer = Timer::new(name);
        let result = match guard.lease() {
            // Handle destroyed after scheduling
            Err(e) => Err(e),
            Ok(_lease) => engine
                .invoke(request)
                .map_err(ClientError::from)
                .and_then(decode),
        };
        timer.stop();
        drop(ticket);

        if let Err(e) = &result {
            note_failure(name, e);
        }
        result
    }
}

fn note_failure(op: &'static str, error: &ClientError) {
    metrics::record_operation_failed(op);
    warn!(op, kind = error.kind(), %error, "Operation failed");
}

/// How an executed operation hands back its result
pub trait Completion {
    type Output<T: Send + 'static>;

    const MODE: Mode;

    /// Deliver a result that is already known
    fn ready<T: Send + 'static>(dispatcher: &Dispatcher, result: ClientResult<T>) -> Self::Output<T>;

    /// Run `work` and deliver its result
    fn submit<T, F>(dispatcher: &Dispatcher, work: F) -> Self::Output<T>
    where
        T: Send + 'static,
        F: FnOnce() -> ClientResult<T> + Send + 'static;
}

/// Blocking form: runs on the caller's thread
pub struct Immediate;

impl Completion for Immediate {
    type Output<T: Send + 'static> = ClientResult<T>;

    const MODE: Mode = Mode::Blocking;

    fn ready<T: Send + 'static>(_: &Dispatcher, result: ClientResult<T>) -> ClientResult<T> {
        result
    }

    fn submit<T, F>(_: &Dispatcher, work: F) -> ClientResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> ClientResult<T> + Send + 'static,
    {
        work()
    }
}

/// Non-blocking form: runs on the blocking pool, result through [`Pending`]
pub struct Deferred;

impl Completion for Deferred {
    type Output<T: Send + 'static> = Pending<T>;

    const MODE: Mode = Mode::NonBlocking;

    fn ready<T: Send + 'static>(dispatcher: &Dispatcher, result: ClientResult<T>) -> Pending<T> {
        Pending::ready(result, dispatcher.executor.handle().clone())
    }

    fn submit<T, F>(dispatcher: &Dispatcher, work: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce() -> ClientResult<T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        dispatcher.executor.spawn_blocking(move || {
            // Receiver may be gone; the work still runs to completion
            let _ = tx.send(work());
        });
        Pending::new(rx, dispatcher.executor.handle().clone())
    }
}

/// Result of a non-blocking operation
///
/// Await it, [`wait`](Pending::wait) on it from synchronous code, or hand
/// it a callback with [`on_complete`](Pending::on_complete). Dropping it
/// does not cancel the operation.
#[must_use = "the result of the operation is only observable through the Pending"]
pub struct Pending<T> {
    rx: oneshot::Receiver<ClientResult<T>>,
    handle: Handle,
}

fn abandoned() -> ClientError {
    ClientError::EngineFailure("operation did not complete".to_string())
}

impl<T: Send + 'static> Pending<T> {
    fn new(rx: oneshot::Receiver<ClientResult<T>>, handle: Handle) -> Self {
        Self { rx, handle }
    }

    fn ready(result: ClientResult<T>, handle: Handle) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { rx, handle }
    }

    /// Block the current thread until the result is available
    ///
    /// # Panics
    /// When called from within an asynchronous execution context; `.await`
    /// the `Pending` there instead.
    pub fn wait(self) -> ClientResult<T> {
        self.rx.blocking_recv().unwrap_or_else(|_| Err(abandoned()))
    }

    /// The result, if the operation has already finished
    pub fn try_take(&mut self) -> Option<ClientResult<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(abandoned())),
        }
    }

    /// Call `f` with the result once it is available
    pub fn on_complete<F>(self, f: F)
    where
        F: FnOnce(ClientResult<T>) + Send + 'static,
    {
        let handle = self.handle.clone();
        handle.spawn(async move {
            f(self.await);
        });
    }
}

impl<T> Future for Pending<T> {
    type Output = ClientResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(abandoned())))
    }
}

/// Shared dispatch core behind every client operation
pub struct Dispatcher {
    guard: Arc<HandleGuard>,
    sequencer: Sequencer,
    executor: Executor,
}

impl Dispatcher {
    pub fn new(guard: Arc<HandleGuard>, executor: Executor) -> Self {
        Self {
            guard,
            sequencer: Sequencer::new(),
            executor,
        }
    }

    pub fn guard(&self) -> &Arc<HandleGuard> {
        &self.guard
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Run an engine operation, finishing it through `C`
    pub fn execute<C, T>(&self, op: Operation<T>) -> C::Output<T>
    where
        C: Completion,
        T: Send + 'static,
    {
        let Operation {
            name,
            request,
            decode,
        } = op;
        metrics::record_operation(name, C::MODE);
        debug!(op = name, mode = C::MODE.as_str(), "Dispatching operation");

        let prepared = request.and_then(|request| {
            let engine = self.guard.engine()?;
            let ticket = request.resource().map(|r| self.sequencer.issue(r));
            Ok(Prepared {
                name,
                request,
                decode,
                engine,
                guard: self.guard.clone(),
                ticket,
            })
        });

        match prepared {
            Ok(prepared) => C::submit(self, move || prepared.run()),
            Err(e) => {
                note_failure(name, &e);
                C::ready(self, Err(e))
            }
        }
    }

    /// Run client-side work that does not go through `invoke`, with the
    /// same logging, metrics and completion as engine operations
    pub fn run_local<C, T, F>(&self, name: &'static str, work: F) -> C::Output<T>
    where
        C: Completion,
        T: Send + 'static,
        F: FnOnce(&HandleGuard) -> ClientResult<T> + Send + 'static,
    {
        metrics::record_operation(name, C::MODE);
        debug!(op = name, mode = C::MODE.as_str(), "Dispatching operation");
        let guard = self.guard.clone();
        C::submit(self, move || {
            let result = work(&guard);
            if let Err(e) = &result {
                note_failure(name, e);
            }
            result
        })
    }
}
