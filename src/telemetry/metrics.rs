//! Metric instrument factories for taskpool.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"taskpool"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for taskpool instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("taskpool")
}

/// Counter: number of tasks created.
/// Labels: `kind`.
pub fn tasks_created() -> Counter<u64> {
    meter()
        .u64_counter("taskpool.tasks.created")
        .with_description("Number of tasks created")
        .build()
}

/// Counter: task status transitions.
/// Labels: `from`, `to`.
pub fn task_state_transitions() -> Counter<u64> {
    meter()
        .u64_counter("taskpool.tasks.state_transitions")
        .with_description("Number of task status transitions")
        .build()
}

/// Counter: claim attempts.
/// Labels: `result` ("claimed" | "fallback" | "none" | "already_in_progress").
pub fn claim_attempts() -> Counter<u64> {
    meter()
        .u64_counter("taskpool.claim.attempts")
        .with_description("Number of claim attempts by outcome")
        .build()
}

/// Histogram: operation duration in milliseconds.
/// Labels: `operation`.
pub fn operation_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("taskpool.operation.duration_ms")
        .with_description("Operation duration in milliseconds")
        .with_unit("ms")
        .build()
}
