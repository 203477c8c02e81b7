//! In-memory oracle for tests and local runs.
//!
//! Deterministic: a key exists iff it was inserted, and a lookup fails iff
//! the key's kind was never registered. Optional per-key latency lets tests
//! force workers to finish out of order.

use super::KeyOracle;
use crate::error::{Error, Result};
use crate::model::Key;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
pub struct MemoryOracle {
    kinds: HashSet<(String, String)>,
    keys: HashSet<Key>,
    delays: HashMap<Key, Duration>,
    calls: AtomicUsize,
}

impl MemoryOracle {
    /// Create an empty oracle: no kinds, no keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind in the default namespace.
    pub fn with_kind(self, kind: impl Into<String>) -> Self {
        self.with_namespaced_kind("", kind)
    }

    pub fn with_namespaced_kind(
        mut self,
        namespace: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        self.kinds.insert((namespace.into(), kind.into()));
        self
    }

    /// Store a key. Its kind is registered as a side effect.
    pub fn with_key(mut self, key: Key) -> Self {
        self.kinds
            .insert((key.namespace().to_string(), key.kind.clone()));
        self.keys.insert(key);
        self
    }

    pub fn with_keys(self, keys: impl IntoIterator<Item = Key>) -> Self {
        keys.into_iter().fold(self, Self::with_key)
    }

    /// Delay every lookup of `key` by `delay`.
    pub fn with_delay(mut self, key: Key, delay: Duration) -> Self {
        self.delays.insert(key, delay);
        self
    }

    /// Number of lookups performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyOracle<Key> for MemoryOracle {
    async fn key_exists(&self, key: &Key, cancel: &CancellationToken) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(key).copied() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        if !self
            .kinds
            .contains(&(key.namespace().to_string(), key.kind.clone()))
        {
            return Err(Error::UnknownKind {
                namespace: key.namespace().to_string(),
                kind: key.kind.clone(),
            });
        }

        Ok(self.keys.contains(key))
    }
}
