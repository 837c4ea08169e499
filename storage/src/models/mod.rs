//! Persisted models: story records and the photos they own.

mod photo_upload;
mod stored_photo;
mod story_record;
mod timestamp;

pub use photo_upload::PhotoUpload;
pub use stored_photo::StoredPhoto;
pub use story_record::StoryRecord;

use uuid::Uuid;

/// Generates an opaque 32-char lowercase hex identifier.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}
