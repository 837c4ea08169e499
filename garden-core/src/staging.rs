//! Staged photo files: written to disk but not yet referenced by any stored record.
//!
//! Dropping a [`StagedPhotos`] without [`StagedPhotos::commit`] removes its files, so a
//! failed narration or record write never leaves orphaned uploads behind.

use std::io::ErrorKind;

use storage::{PhotoStorage, StoredPhoto};
use tracing::{info, warn};

pub struct StagedPhotos {
    storage: PhotoStorage,
    photos: Vec<StoredPhoto>,
    committed: bool,
}

impl StagedPhotos {
    pub fn new(storage: PhotoStorage, photos: Vec<StoredPhoto>) -> Self {
        Self {
            storage,
            photos,
            committed: false,
        }
    }

    pub fn empty(storage: PhotoStorage) -> Self {
        Self::new(storage, Vec::new())
    }

    pub fn photos(&self) -> &[StoredPhoto] {
        &self.photos
    }

    /// Marks the files as owned by a stored record; they are kept from now on.
    pub fn commit(mut self) -> Vec<StoredPhoto> {
        self.committed = true;
        std::mem::take(&mut self.photos)
    }
}

impl Drop for StagedPhotos {
    fn drop(&mut self) {
        if self.committed || self.photos.is_empty() {
            return;
        }
        for photo in &self.photos {
            let path = self.storage.path(photo);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(photo_id = %photo.id, path = %path.display(), error = %e, "Failed to discard staged photo")
                }
            }
        }
        info!(count = self.photos.len(), "Discarded staged photos");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::PhotoUpload;
    use tempfile::TempDir;

    async fn staged(temp_dir: &TempDir) -> (PhotoStorage, Vec<StoredPhoto>) {
        let storage = PhotoStorage::new(temp_dir.path().join("uploads")).unwrap();
        let photos = storage
            .persist(vec![PhotoUpload::new(b"bytes".to_vec(), None, None)])
            .await
            .unwrap()
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        (storage, photos)
    }

    #[tokio::test]
    async fn test_drop_without_commit_removes_files() {
        let temp_dir = TempDir::new().unwrap();
        let (storage, photos) = staged(&temp_dir).await;
        let path = storage.path(&photos[0]);

        drop(StagedPhotos::new(storage, photos));

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_commit_keeps_files() {
        let temp_dir = TempDir::new().unwrap();
        let (storage, photos) = staged(&temp_dir).await;
        let path = storage.path(&photos[0]);

        let kept = StagedPhotos::new(storage, photos).commit();

        assert_eq!(kept.len(), 1);
        assert!(path.exists());
    }
}
