//! Batch span helpers.
//!
//! One span per `batch_exists` call. The batch moves through
//! `created → dispatching → collecting → succeeded | failed`; each step is
//! recorded as an event on the span.

use tracing::Span;
use uuid::Uuid;

/// Start a span for one batch existence check.
///
/// The `batch.state` field is declared empty and is updated by
/// [`record_state_transition`].
pub fn start_batch_span(keys: usize, workers: usize) -> Span {
    tracing::info_span!(
        "keys_exist.batch",
        "batch.id" = %Uuid::new_v4(),
        "batch.keys" = keys,
        "batch.workers" = workers,
        "batch.state" = tracing::field::Empty,
    )
}

/// Record a state transition on the batch span.
pub fn record_state_transition(span: &Span, from: &str, to: &str) {
    span.record("batch.state", to);
    span.in_scope(|| {
        tracing::debug!(from = from, to = to, "state_transition");
    });
}
