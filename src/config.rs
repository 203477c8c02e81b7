//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing or the
//! worker count is out of range. The database URL is wrapped in
//! secrecy::SecretString so credentials never end up in logs.

use crate::engine::worker_count;
use crate::error::{Error, Result};
use secrecy::SecretString;

/// Worker pool size used when `KEYS_EXIST_WORKERS` is unset.
pub const DEFAULT_WORKERS: usize = 8;

#[derive(Debug)]
pub struct Config {
    pub database_url: SecretString,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
    pub workers: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let workers = match std::env::var("KEYS_EXIST_WORKERS") {
            Ok(raw) => {
                let n = raw.trim().parse::<i64>().map_err(|e| {
                    Error::Config(format!("KEYS_EXIST_WORKERS is not an integer ({raw:?}): {e}"))
                })?;
                worker_count(n)?
            }
            Err(_) => DEFAULT_WORKERS,
        };

        Ok(Self {
            database_url: SecretString::from(required_var("DATABASE_URL")?),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            workers,
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}
