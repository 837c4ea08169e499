//! Photo file storage: persists uploads under generated names in one directory.
//!
//! The story record is the authority for file lifetime; this type only writes, reads and
//! removes files. Stored paths are relative to the directory's parent so that the
//! `uploads/` directory can sit next to `data/` and `audio/` under a single root.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::models::{new_id, PhotoUpload, StoredPhoto};
use crate::stored_path::{to_slash, StoredPath};

const DEFAULT_EXTENSION: &str = ".jpg";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct PhotoStorage {
    /// Always absolute, so every resolved path is too.
    root: PathBuf,
    root_name: String,
}

impl PhotoStorage {
    /// Opens (and creates if needed) the upload directory. A relative `root` is taken
    /// relative to the current directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let root = std::path::absolute(&root)?;
        let root_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(root = %root.display(), "Initialized photo storage");
        Ok(Self { root, root_name })
    }

    /// Writes every upload to `<root>/<id><ext>` and returns metadata plus the raw bytes.
    ///
    /// All uploads are checked before anything is written: one empty upload fails the whole
    /// batch with [`StorageError::EmptyUpload`] and leaves the directory untouched. If a write
    /// fails midway, files already written by this call are removed.
    pub async fn persist(
        &self,
        uploads: Vec<PhotoUpload>,
    ) -> Result<Vec<(StoredPhoto, Vec<u8>)>, StorageError> {
        if let Some(empty) = uploads.iter().find(|u| u.bytes.is_empty()) {
            return Err(StorageError::EmptyUpload(empty.display_name().to_string()));
        }

        let mut stored: Vec<(StoredPhoto, Vec<u8>)> = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let id = new_id();
            let generated_name = format!("{}{}", id, extension_for(upload.filename.as_deref()));
            let destination = self.root.join(&generated_name);

            if let Err(e) = tokio::fs::write(&destination, &upload.bytes).await {
                warn!(error = %e, path = %destination.display(), "Photo write failed; rolling back batch");
                let written: Vec<StoredPhoto> = stored.into_iter().map(|(photo, _)| photo).collect();
                // Rollback is best effort; the write error is what the caller needs.
                let _ = self.delete_many(&written).await;
                return Err(e.into());
            }

            let photo = StoredPhoto {
                id,
                filename: upload
                    .filename
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| generated_name.clone()),
                content_type: upload
                    .content_type
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
                size: upload.bytes.len() as u64,
                path: format!("{}/{}", self.root_name, generated_name),
            };
            debug!(photo_id = %photo.id, size = photo.size, path = %photo.path, "Persisted photo");
            stored.push((photo, upload.bytes));
        }

        info!(count = stored.len(), "Persisted photo batch");
        Ok(stored)
    }

    /// Maps a stored path to its absolute location on disk.
    pub fn resolve(&self, stored: &str) -> PathBuf {
        StoredPath::classify(stored, &self.root_name).resolve(&self.root)
    }

    pub fn path(&self, photo: &StoredPhoto) -> PathBuf {
        self.resolve(&photo.path)
    }

    pub async fn exists(&self, photo: &StoredPhoto) -> bool {
        tokio::fs::try_exists(self.path(photo)).await.unwrap_or(false)
    }

    /// Reads the photo fully into memory.
    pub async fn load_bytes(&self, photo: &StoredPhoto) -> Result<Vec<u8>, StorageError> {
        let path = self.path(photo);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::PhotoNotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the photo's file. A file that is already gone counts as deleted.
    pub async fn delete(&self, photo: &StoredPhoto) -> Result<(), StorageError> {
        let path = self.path(photo);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(photo_id = %photo.id, path = %path.display(), "Deleted photo file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(photo_id = %photo.id, path = %path.display(), "Photo file already absent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes every photo; a failure does not stop the remaining deletes.
    ///
    /// Returns the first error after all deletes have been attempted.
    pub async fn delete_many(&self, photos: &[StoredPhoto]) -> Result<(), StorageError> {
        let mut first_error = None;
        for photo in photos {
            if let Err(e) = self.delete(photo).await {
                warn!(photo_id = %photo.id, error = %e, "Failed to delete photo file");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Canonical `<root-name>/<file>` form of a legacy stored path.
    ///
    /// `None` when the path is already canonical or is an absolute path outside the root.
    pub fn canonical_path(&self, stored: &str) -> Option<String> {
        match StoredPath::classify(stored, &self.root_name) {
            StoredPath::Canonical(_) => None,
            StoredPath::LegacyBare(path) => {
                Some(format!("{}/{}", self.root_name, to_slash(path)))
            }
            StoredPath::Absolute(path) => path
                .strip_prefix(&self.root)
                .ok()
                .map(|rel| format!("{}/{}", self.root_name, to_slash(rel))),
        }
    }

    /// Removes files in the upload directory that no record references.
    ///
    /// A file is an orphan when its stem is not in `referenced_ids` and it was last modified
    /// at least `min_age` ago; younger files may belong to an upload still in flight.
    /// Dot-files and subdirectories are left alone. Returns the removed paths.
    pub async fn sweep_orphans(
        &self,
        referenced_ids: &HashSet<String>,
        min_age: Duration,
    ) -> Result<Vec<PathBuf>, StorageError> {
        let now = SystemTime::now();
        let mut removed = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !entry.file_type().await?.is_file() {
                continue;
            }
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if referenced_ids.contains(&stem) {
                continue;
            }
            let modified = entry.metadata().await?.modified()?;
            if now.duration_since(modified).unwrap_or_default() < min_age {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed.push(path),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        info!(removed = removed.len(), "Swept orphaned photo files");
        Ok(removed)
    }
}

/// Suffix of the declared filename when it is a plain extension, else `.jpg`.
fn extension_for(filename: Option<&str>) -> String {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::extension_for;

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for(Some("beach.png")), ".png");
        assert_eq!(extension_for(Some("archive.tar.gz")), ".gz");
        assert_eq!(extension_for(Some("noext")), ".jpg");
        assert_eq!(extension_for(Some("weird.p g")), ".jpg");
        assert_eq!(extension_for(None), ".jpg");
    }
}
