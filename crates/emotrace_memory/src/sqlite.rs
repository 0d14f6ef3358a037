use crate::store::KeyValueStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::path::Path;

/// SQLite-backed key-value store: a single `kv` table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display());
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// In-memory database, mostly for tests.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory SQLite database")?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create kv table")?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read key '{}'", key))?;
        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write key '{}'", key))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete key '{}'", key))?;
        Ok(result.rows_affected() > 0)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM kv ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list keys")?;
        Ok(rows.into_iter().map(|r| r.get::<String, _>("key")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_store_roundtrip() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert_eq!(store.get("theme_preference").await.unwrap(), None);

        store.set("theme_preference", "light").await.unwrap();
        store.set("theme_preference", "dark").await.unwrap();
        assert_eq!(
            store.get("theme_preference").await.unwrap().as_deref(),
            Some("dark")
        );

        store.set("another", "x").await.unwrap();
        assert_eq!(
            store.keys().await.unwrap(),
            vec!["another".to_string(), "theme_preference".to_string()]
        );

        assert!(store.delete("another").await.unwrap());
        assert!(!store.delete("another").await.unwrap());
    }

    #[tokio::test]
    async fn test_sqlite_store_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kv.db");
        {
            let store = SqliteStore::new(&path).await.unwrap();
            store.set("k", "v").await.unwrap();
        }
        let reopened = SqliteStore::new(&path).await.unwrap();
        assert_eq!(reopened.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
