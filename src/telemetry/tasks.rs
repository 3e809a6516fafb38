//! Claim span helpers.
//!
//! Provides span creation and claim-outcome recording for tasks flowing
//! through the assignment engine.

use tracing::Span;

use crate::model::{TaskId, WorkerId};

/// Start a span for a claim attempt.
///
/// The `task.id` field is declared empty and is filled in via
/// [`record_claimed`] once a candidate wins.
pub fn start_claim_span(worker: &WorkerId) -> Span {
    tracing::info_span!(
        "task.claim",
        "task.worker" = %worker,
        "task.id" = tracing::field::Empty,
    )
}

/// Record a successful claim on the span.
///
/// Emits a tracing `info` event scoped to the given span; `fallback` marks
/// claims that went through the unfiltered retry.
pub fn record_claimed(span: &Span, task: &TaskId, fallback: bool) {
    span.record("task.id", task.0);
    span.in_scope(|| {
        tracing::info!(task = %task, fallback, "task claimed");
    });
}
