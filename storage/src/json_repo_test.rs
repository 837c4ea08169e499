//! Unit tests for JsonFileStoryRepository file handling.
//!
//! Covers seeding, blank files, the temp-file swap and caller-supplied ids.

use crate::error::StorageError;
use crate::json_repo::JsonFileStoryRepository;
use crate::models::StoryRecord;
use crate::repository::StoryRepository;
use tempfile::TempDir;

fn record(location: &str) -> StoryRecord {
    StoryRecord::new("2024-05-01", "sunny", location, vec![], Some("story".to_string()))
}

#[tokio::test]
async fn test_new_seeds_empty_array_and_parent_dir() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data").join("stories.json");

    let repo = JsonFileStoryRepository::new(&path).await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    assert!(repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_file_reads_as_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("stories.json");
    std::fs::write(&path, "  \n").unwrap();

    let repo = JsonFileStoryRepository::new(&path).await.unwrap();

    assert!(repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_write_leaves_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("stories.json");
    let repo = JsonFileStoryRepository::new(&path).await.unwrap();

    repo.add(record("Park")).await.unwrap();

    assert!(!temp_dir.path().join("stories.tmp").exists());
    let raw = std::fs::read_to_string(&path).unwrap();
    let docs: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["location"], "Park");
    assert!(docs[0]["created_at"].is_string());
}

#[tokio::test]
async fn test_existing_documents_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("stories.json");
    let added = {
        let repo = JsonFileStoryRepository::new(&path).await.unwrap();
        repo.add(record("Beach")).await.unwrap()
    };

    let reopened = JsonFileStoryRepository::new(&path).await.unwrap();
    let found = reopened.get(added.id_str()).await.unwrap();

    assert_eq!(found, Some(added));
}

#[tokio::test]
async fn test_caller_supplied_id_is_kept_and_must_be_unique() {
    let temp_dir = TempDir::new().unwrap();
    let repo = JsonFileStoryRepository::new(temp_dir.path().join("stories.json"))
        .await
        .unwrap();
    let mut first = record("Park");
    first.id = Some("abc123".to_string());

    let stored = repo.add(first.clone()).await.unwrap();
    assert_eq!(stored.id.as_deref(), Some("abc123"));

    let err = repo.add(first).await.unwrap_err();
    assert!(matches!(err, StorageError::AlreadyExists(id) if id == "abc123"));
    assert_eq!(repo.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_corrupt_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("stories.json");
    std::fs::write(&path, "{not json").unwrap();
    let repo = JsonFileStoryRepository::new(&path).await.unwrap();

    let err = repo.list().await.unwrap_err();

    assert!(matches!(err, StorageError::Serialization(_)));
}

#[tokio::test]
async fn test_reads_and_updates_naive_timestamps() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("stories.json");
    std::fs::write(
        &path,
        r#"[{"id":"legacy","date":"2024-05-01","weather":"sunny","location":"Park","photos":[],"story":null,
"created_at":"2024-05-01T10:00:00.123456","updated_at":"2024-05-01T11:00:00.654321"}]"#,
    )
    .unwrap();
    let repo = JsonFileStoryRepository::new(&path).await.unwrap();

    let records = repo.list().await.unwrap();
    assert_eq!(records.len(), 1);
    let mut legacy = repo.get("legacy").await.unwrap().unwrap();
    assert_eq!(legacy.created_at.to_rfc3339(), "2024-05-01T10:00:00.123456+00:00");

    legacy.touch();
    repo.update(&legacy).await.unwrap();
    let reread = repo.get("legacy").await.unwrap().unwrap();
    assert_eq!(reread.updated_at, legacy.updated_at);
    assert_eq!(reread.created_at, records[0].created_at);
}
