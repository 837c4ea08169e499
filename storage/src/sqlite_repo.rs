//! Document-collection story repository backed by SQLite.
//!
//! Each record is one JSON document keyed by id. Single-statement inserts and replaces are
//! atomic per document, so no application-level lock is needed. The database runs in WAL
//! mode with a busy timeout so a CLI invocation and a long-running process can share it.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::StorageError;
use crate::models::{new_id, StoryRecord};
use crate::repository::StoryRepository;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_CONNECTIONS: u32 = 4;

#[derive(Clone)]
pub struct SqliteStoryRepository {
    pool: SqlitePool,
}

impl SqliteStoryRepository {
    /// Opens the database file, creating it and the `stories` table if missing.
    pub async fn new(database_path: &str) -> Result<Self, StorageError> {
        info!(database_path, "Opening SQLite story store");

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating stories table if not exist");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stories (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                document TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn decode(row: &sqlx::sqlite::SqliteRow) -> Result<StoryRecord, StorageError> {
        let id: String = row.try_get("id")?;
        let document: String = row.try_get("document")?;
        let mut record: StoryRecord = serde_json::from_str(&document)?;
        record.id = Some(id);
        Ok(record)
    }
}

#[async_trait]
impl StoryRepository for SqliteStoryRepository {
    async fn add(&self, mut record: StoryRecord) -> Result<StoryRecord, StorageError> {
        let id = record.id.get_or_insert_with(new_id).clone();
        let document = serde_json::to_string(&record)?;

        let result = sqlx::query("INSERT INTO stories (id, created_at, document) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(record.created_at.to_rfc3339())
            .bind(&document)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                info!(story_id = %id, photos = record.photos.len(), "Added story document");
                Ok(record)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StorageError::AlreadyExists(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<StoryRecord>, StorageError> {
        let rows = sqlx::query("SELECT id, document FROM stories ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::decode).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<StoryRecord>, StorageError> {
        if id.is_empty() {
            return Ok(None);
        }
        let row = sqlx::query("SELECT id, document FROM stories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::decode).transpose()
    }

    async fn update(&self, record: &StoryRecord) -> Result<(), StorageError> {
        let id = record
            .id
            .as_deref()
            .ok_or_else(|| StorageError::NotFound("story id is required for update".to_string()))?;
        let document = serde_json::to_string(record)?;

        let result = sqlx::query("UPDATE stories SET created_at = ?, document = ? WHERE id = ?")
            .bind(record.created_at.to_rfc3339())
            .bind(&document)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        info!(story_id = %id, photos = record.photos.len(), "Replaced story document");
        Ok(())
    }

    async fn ensure_indexes(&self) -> Result<(), StorageError> {
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_stories_created_at ON stories(created_at)")
            .execute(&self.pool)
            .await?;
        info!("Ensured stories indexes");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_new_opens_in_wal_mode() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("stories.db");

        let repo = SqliteStoryRepository::new(db_path.to_str().unwrap())
            .await
            .unwrap();

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        let timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(timeout, 5000);
        assert!(db_path.exists());
    }
}
