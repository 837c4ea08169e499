//! Repository trait shared by every story backend.

use async_trait::async_trait;
use tracing::info;

use crate::error::StorageError;
use crate::models::StoryRecord;

/// Durable CRUD for [`StoryRecord`]. Each write is atomic: readers observe either the old
/// or the new document set, never a partial one.
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Stores a new record and returns it with its final id.
    ///
    /// A record without id gets a generated one; a caller-supplied id must not exist yet
    /// ([`StorageError::AlreadyExists`]).
    async fn add(&self, record: StoryRecord) -> Result<StoryRecord, StorageError>;

    /// All records in the backend's natural (insertion) order.
    async fn list(&self) -> Result<Vec<StoryRecord>, StorageError>;

    /// Point lookup; `None` when no record has this id.
    async fn get(&self, id: &str) -> Result<Option<StoryRecord>, StorageError>;

    /// Full replace of an existing record. [`StorageError::NotFound`] when the id is unknown
    /// or missing; the store is unchanged in that case.
    async fn update(&self, record: &StoryRecord) -> Result<(), StorageError>;

    /// Creates lookup indexes. No-op for backends without indexes.
    async fn ensure_indexes(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Copies every record from one backend to another, keeping ids and timestamps.
///
/// Returns the number of records copied.
pub async fn copy_records(
    from: &dyn StoryRepository,
    to: &dyn StoryRepository,
) -> Result<usize, StorageError> {
    let records = from.list().await?;
    let mut count = 0;
    for record in records {
        to.add(record).await?;
        count += 1;
    }
    info!(count, "Copied story records between backends");
    Ok(count)
}
