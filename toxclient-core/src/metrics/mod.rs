//! Metrics for client operations and event delivery
//!
//! Everything goes through the `metrics` facade; installing a recorder or
//! exporter is left to the application.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Instant;

use crate::events::EventKind;

pub const OPERATIONS_TOTAL: &str = "client.operations.total";
pub const OPERATIONS_FAILED: &str = "client.operations.failed";
pub const OPERATION_DURATION_MS: &str = "client.operation.duration_ms";
pub const EVENTS_DELIVERED: &str = "client.events.delivered";
pub const LISTENERS_ACTIVE: &str = "client.listeners.active";

/// Initialize metrics with descriptions
pub fn init_metrics() {
    describe_counter!(OPERATIONS_TOTAL, "Client operations issued, by operation and mode");
    describe_counter!(OPERATIONS_FAILED, "Client operations that returned an error");
    describe_histogram!(
        OPERATION_DURATION_MS,
        "Client operation duration in milliseconds"
    );
    describe_counter!(EVENTS_DELIVERED, "Events handed to listeners, by kind");
    describe_gauge!(LISTENERS_ACTIVE, "Number of registered event listeners");
}

/// Dispatch path an operation went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Blocking,
    NonBlocking,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Blocking => "blocking",
            Mode::NonBlocking => "non_blocking",
        }
    }
}

pub fn record_operation(op: &'static str, mode: Mode) {
    counter!(OPERATIONS_TOTAL, "op" => op, "mode" => mode.as_str()).increment(1);
}

pub fn record_operation_failed(op: &'static str) {
    counter!(OPERATIONS_FAILED, "op" => op).increment(1);
}

pub fn record_event_delivered(kind: EventKind) {
    counter!(EVENTS_DELIVERED, "kind" => kind.as_str()).increment(1);
}

pub fn record_active_listeners(count: usize) {
    gauge!(LISTENERS_ACTIVE).set(count as f64);
}

/// Timer for measuring operation duration
pub struct Timer {
    op: &'static str,
    start: Instant,
}

impl Timer {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
        }
    }

    /// Stop the timer and record the duration
    pub fn stop(self) {
        let duration = self.start.elapsed();
        histogram!(OPERATION_DURATION_MS, "op" => self.op).record(duration.as_secs_f64() * 1000.0);
    }
}
