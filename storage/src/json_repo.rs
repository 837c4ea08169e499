//! Flat-file story repository: one JSON array of story documents.
//!
//! Every operation reads the whole file; writes rewrite it through a sibling `.tmp` file
//! that is synced and renamed over the original, so readers never see a half-written
//! document. A per-instance mutex serialises read-modify-write sequences so concurrent
//! writers cannot lose each other's updates.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::{new_id, StoryRecord};
use crate::repository::StoryRepository;

pub struct JsonFileStoryRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStoryRepository {
    /// Opens the store at `path`, creating the parent directory and an empty array if missing.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        if !tokio::fs::try_exists(&path).await? {
            tokio::fs::write(&path, "[]").await?;
        }
        info!(path = %path.display(), "Opened JSON story store");
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    /// Reads all documents. Caller must hold `lock`.
    async fn read_all(&self) -> Result<Vec<StoryRecord>, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    /// Replaces the file contents atomically. Caller must hold `lock`.
    async fn write_all(&self, records: &[StoryRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(records)?;
        let temp_path = self.temp_path();
        {
            let mut file = tokio::fs::File::create(&temp_path).await?;
            file.write_all(&json).await?;
            file.sync_all().await?;
        }
        tokio::fs::rename(&temp_path, &self.path).await?;
        debug!(count = records.len(), path = %self.path.display(), "Rewrote story file");
        Ok(())
    }
}

#[async_trait]
impl StoryRepository for JsonFileStoryRepository {
    async fn add(&self, mut record: StoryRecord) -> Result<StoryRecord, StorageError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;

        match record.id.as_deref() {
            Some(id) if records.iter().any(|r| r.id.as_deref() == Some(id)) => {
                return Err(StorageError::AlreadyExists(id.to_string()));
            }
            Some(_) => {}
            None => record.id = Some(new_id()),
        }

        records.push(record.clone());
        self.write_all(&records).await?;
        info!(story_id = %record.id_str(), photos = record.photos.len(), "Added story record");
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<StoryRecord>, StorageError> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn get(&self, id: &str) -> Result<Option<StoryRecord>, StorageError> {
        if id.is_empty() {
            return Ok(None);
        }
        let _guard = self.lock.lock().await;
        let records = self.read_all().await?;
        Ok(records.into_iter().find(|r| r.id.as_deref() == Some(id)))
    }

    async fn update(&self, record: &StoryRecord) -> Result<(), StorageError> {
        let id = record
            .id
            .as_deref()
            .ok_or_else(|| StorageError::NotFound("story id is required for update".to_string()))?;

        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        let slot = records
            .iter_mut()
            .find(|r| r.id.as_deref() == Some(id))
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        *slot = record.clone();
        self.write_all(&records).await?;
        info!(story_id = %id, photos = record.photos.len(), "Updated story record");
        Ok(())
    }
}
