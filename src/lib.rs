//! # keys-exist
//!
//! Batch existence checks over a pluggable key oracle.
//!
//! Fans lookups out to a fixed pool of tokio workers and reassembles the
//! answers in input order. Ships a Postgres-backed oracle (sqlx), an
//! in-memory oracle for tests, and OpenTelemetry observability.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod model;
pub mod oracle;
pub mod telemetry;

pub use engine::{batch_exists, batch_exists_with_cancel};
pub use error::{Error, Result};
pub use model::{Key, KeyId};
pub use oracle::KeyOracle;
