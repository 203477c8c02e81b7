//! Error types for keys-exist.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("worker count must be >= 1, got {0}")]
    InvalidWorkerCount(i64),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("kind {kind:?} does not exist in namespace {namespace:?}")]
    UnknownKind { namespace: String, kind: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("lookup cancelled")]
    Cancelled,

    #[error("worker pool failed: {0}")]
    WorkerPool(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
