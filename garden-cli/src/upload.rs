//! Turns local files into [`PhotoUpload`]s.

use std::path::Path;

use anyhow::{Context, Result};
use storage::PhotoUpload;

/// MIME type from the file extension; `None` lets storage apply its default.
pub fn guess_content_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

pub async fn read_upload(path: &Path) -> Result<PhotoUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read photo {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    Ok(PhotoUpload::new(bytes, filename, guess_content_type(path)))
}
