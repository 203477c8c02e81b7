//! The key oracle capability.
//!
//! An oracle answers one question for one key: does it exist? The engine
//! depends on nothing else, so any backend (Postgres, in-memory, a mock)
//! can be swapped in without touching it.

pub mod memory;

pub use memory::MemoryOracle;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Existence lookup for keys of type `K`.
///
/// Called concurrently from every worker in a batch, so implementations must
/// either be stateless or synchronize internally. Any error is treated by the
/// engine as "this lookup failed" and aborts the batch.
#[async_trait]
pub trait KeyOracle<K: Sync>: Send + Sync {
    /// Report whether `key` exists.
    ///
    /// `cancel` fires when the batch is abandoned. Implementations doing slow
    /// I/O should give up and return [`crate::Error::Cancelled`] once it does;
    /// the engine also races every call against it.
    async fn key_exists(&self, key: &K, cancel: &CancellationToken) -> Result<bool>;
}

#[async_trait]
impl<K, O> KeyOracle<K> for Arc<O>
where
    K: Sync,
    O: KeyOracle<K> + ?Sized,
{
    async fn key_exists(&self, key: &K, cancel: &CancellationToken) -> Result<bool> {
        (**self).key_exists(key, cancel).await
    }
}
