//! Storage crate: story record persistence and photo file lifecycle.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – StoredPhoto, StoryRecord, PhotoUpload
//! - [`repository`] – StoryRepository trait and `copy_records`
//! - [`json_repo`] – JsonFileStoryRepository (flat JSON array file)
//! - [`sqlite_repo`] – SqliteStoryRepository (document collection in SQLite)
//! - [`photo_storage`] – PhotoStorage (upload directory)
//! - [`stored_path`] – StoredPath (path resolution for persisted photo paths)

mod error;
mod json_repo;
mod models;
mod photo_storage;
mod repository;
mod sqlite_repo;
mod stored_path;

#[cfg(test)]
mod json_repo_test;

pub use error::StorageError;
pub use json_repo::JsonFileStoryRepository;
pub use models::{PhotoUpload, StoredPhoto, StoryRecord};
pub use photo_storage::PhotoStorage;
pub use repository::{copy_records, StoryRepository};
pub use sqlite_repo::SqliteStoryRepository;
pub use stored_path::StoredPath;
