//! Metadata of one persisted photo file.
//!
//! Embedded in StoryRecord; `path` is resolved through PhotoStorage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPhoto {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    /// Storage-relative location, e.g. `uploads/<id>.jpg`.
    pub path: String,
}
