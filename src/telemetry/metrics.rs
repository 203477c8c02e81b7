//! Metric instrument factories for keys-exist.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"keys-exist"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for keys-exist instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("keys-exist")
}

/// Counter: individual oracle lookups performed by workers.
/// Labels: `result` ("found" | "missing" | "error" | "cancelled").
pub fn lookups() -> Counter<u64> {
    meter()
        .u64_counter("keys_exist.lookups")
        .with_description("Number of key lookups performed by workers")
        .build()
}

/// Counter: batches finished.
/// Labels: `outcome` ("succeeded" | "failed" | "rejected").
pub fn batches() -> Counter<u64> {
    meter()
        .u64_counter("keys_exist.batches")
        .with_description("Number of batch existence checks")
        .build()
}

/// Histogram: wall time of a batch in milliseconds.
/// Labels: `outcome`.
pub fn batch_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("keys_exist.batch.duration_ms")
        .with_description("Batch existence check duration in milliseconds")
        .with_unit("ms")
        .build()
}
