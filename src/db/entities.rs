//! Entity key registry and the Postgres-backed key oracle.
//!
//! Entities are stored by encoded key path under a namespace. A lookup
//! against a kind that was never registered is an access failure, not a miss.

use crate::error::{Error, Result};
use crate::model::Key;
use crate::oracle::KeyOracle;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

impl super::Db {
    /// Register a kind (idempotent).
    pub async fn register_kind(&self, namespace: &str, kind: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO entity_kinds (namespace, kind) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(namespace)
        .bind(kind)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Store a key, registering its kind if needed (idempotent).
    pub async fn put_key(&self, key: &Key) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            "INSERT INTO entity_kinds (namespace, kind) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(key.namespace())
        .bind(&key.kind)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO entities (namespace, kind, key_path) VALUES ($1, $2, $3)
             ON CONFLICT (namespace, key_path) DO NOTHING",
        )
        .bind(key.namespace())
        .bind(&key.kind)
        .bind(key.path())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(key = %key, "key stored");
        Ok(())
    }

    /// Delete a key. Returns whether a row was removed.
    pub async fn delete_key(&self, key: &Key) -> Result<bool> {
        let done = sqlx::query("DELETE FROM entities WHERE namespace = $1 AND key_path = $2")
            .bind(key.namespace())
            .bind(key.path())
            .execute(self.pool())
            .await?;
        Ok(done.rows_affected() > 0)
    }

    /// Look up a single key. `Ok(false)` if absent, `UnknownKind` if the
    /// kind is not registered in the key's namespace.
    pub async fn lookup_key(&self, key: &Key) -> Result<bool> {
        let (kind_known, found): (bool, bool) = sqlx::query_as(
            "SELECT
                 EXISTS (SELECT 1 FROM entity_kinds WHERE namespace = $1 AND kind = $2),
                 EXISTS (SELECT 1 FROM entities WHERE namespace = $1 AND key_path = $3)",
        )
        .bind(key.namespace())
        .bind(&key.kind)
        .bind(key.path())
        .fetch_one(self.pool())
        .await?;

        if !kind_known {
            return Err(Error::UnknownKind {
                namespace: key.namespace().to_string(),
                kind: key.kind.clone(),
            });
        }
        Ok(found)
    }
}

#[async_trait]
impl KeyOracle<Key> for super::Db {
    async fn key_exists(&self, key: &Key, cancel: &CancellationToken) -> Result<bool> {
        tokio::select! {
            _ = cancel.cancelled() => Err(Error::Cancelled),
            r = self.lookup_key(key) => r,
        }
    }
}
