//! SQLite-backed key-value table with optional per-key expiry.
//!
//! Expired rows are invisible to reads and removed by `prune_expired`,
//! which the refresh daemon calls once per cycle.

use crate::error::StatsError;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::time::Duration;

/// Key-value store backed by SQLite.
#[derive(Clone)]
pub struct KvStore {
    pool: SqlitePool,
}

impl KvStore {
    pub async fn new(db_url: &str) -> Result<Self, StatsError> {
        // Every connection to `:memory:` is its own database; pin to one.
        let in_memory = db_url.contains(":memory:");
        let options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = options
            .connect(db_url)
            .await
            .map_err(|e| StatsError::Store(format!("Failed to open SQLite store: {e}")))?;

        Ok(Self { pool })
    }

    /// Run schema migrations.
    pub async fn migrate(&self) -> Result<(), StatsError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                key         TEXT PRIMARY KEY,
                value       TEXT NOT NULL,
                expires_at  INTEGER,
                updated_at  INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_kv_entries_expiry ON kv_entries(expires_at) WHERE expires_at IS NOT NULL"
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Read a live value.
    pub async fn get(&self, key: &str) -> Result<Option<String>, StatsError> {
        let row = sqlx::query(
            r#"
            SELECT value FROM kv_entries
            WHERE key = ?1 AND (expires_at IS NULL OR expires_at > ?2)
            "#,
        )
        .bind(key)
        .bind(now_millis())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    /// Write a value, replacing any previous one. `ttl = None` never expires.
    pub async fn put(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StatsError> {
        let now = now_millis();
        let expires_at = ttl.map(|t| now.saturating_add(t.as_millis() as i64));

        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, expires_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<bool, StatsError> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete expired rows. Returns how many were removed.
    pub async fn prune_expired(&self) -> Result<u64, StatsError> {
        let result = sqlx::query(
            "DELETE FROM kv_entries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
        )
        .bind(now_millis())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> KvStore {
        let store = KvStore::new("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_put_get_overwrite() {
        let store = test_store().await;
        assert_eq!(store.get("k").await.unwrap(), None);

        store.put("k", "first", None).await.unwrap();
        store.put("k", "second", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_expired_value_reads_as_absent() {
        let store = test_store().await;
        store
            .put("short", "v", Some(Duration::from_millis(1)))
            .await
            .unwrap();
        store
            .put("long", "v", Some(Duration::from_secs(3600)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(store.get("short").await.unwrap(), None);
        assert_eq!(store.get("long").await.unwrap().as_deref(), Some("v"));

        assert_eq!(store.prune_expired().await.unwrap(), 1);
        assert_eq!(store.prune_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = test_store().await;
        store.put("k", "v", None).await.unwrap();
        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
