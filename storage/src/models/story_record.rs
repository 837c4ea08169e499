//! Story record model for persistence.
//!
//! Stored as one JSON document per record by both repository backends.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{timestamp, StoredPhoto};

/// One user-created memory: contextual metadata, its photos and the generated narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    /// Assigned by the repository on `add` when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub date: String,
    pub weather: String,
    pub location: String,
    #[serde(default)]
    pub photos: Vec<StoredPhoto>,
    #[serde(default)]
    pub story: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

impl StoryRecord {
    /// Creates a record without id; `created_at` and `updated_at` are both now.
    pub fn new(
        date: impl Into<String>,
        weather: impl Into<String>,
        location: impl Into<String>,
        photos: Vec<StoredPhoto>,
        story: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            date: date.into(),
            weather: weather.into(),
            location: location.into(),
            photos,
            story,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`; the new value is always strictly later than the old one.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }

    pub fn photo(&self, photo_id: &str) -> Option<&StoredPhoto> {
        self.photos.iter().find(|p| p.id == photo_id)
    }

    pub fn photo_ids(&self) -> impl Iterator<Item = &str> {
        self.photos.iter().map(|p| p.id.as_str())
    }

    /// Id or empty string; used for logging.
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_equal_timestamps() {
        let record = StoryRecord::new("2024-05-01", "sunny", "Park", vec![], None);
        assert!(record.id.is_none());
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_touch_is_strictly_increasing() {
        let mut record = StoryRecord::new("d", "w", "l", vec![], None);
        // Push updated_at into the future so the wall clock cannot overtake it.
        record.updated_at = Utc::now() + Duration::hours(1);
        let before = record.updated_at;
        record.touch();
        assert!(record.updated_at > before);
        assert_eq!(record.updated_at - before, Duration::microseconds(1));
    }

    #[test]
    fn test_serializes_timestamps_as_iso8601() {
        let record = StoryRecord::new("d", "w", "l", vec![], None);
        let value = serde_json::to_value(&record).unwrap();
        let created = value["created_at"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(created).is_ok());
        assert!(value["story"].is_null());
    }

    #[test]
    fn test_deserializes_document_without_optional_fields() {
        let json = r#"{
            "date": "2024-05-01",
            "weather": "sunny",
            "location": "Park",
            "created_at": "2024-05-01T10:00:00+00:00",
            "updated_at": "2024-05-01T10:00:00.123456+00:00"
        }"#;
        let record: StoryRecord = serde_json::from_str(json).unwrap();
        assert!(record.id.is_none());
        assert!(record.photos.is_empty());
        assert!(record.story.is_none());
        assert!(record.updated_at > record.created_at);
    }

    #[test]
    fn test_deserializes_naive_timestamps_as_utc() {
        let json = r#"{
            "id": "abc",
            "date": "2024-05-01",
            "weather": "sunny",
            "location": "Park",
            "story": null,
            "created_at": "2024-05-01T10:00:00+00:00",
            "updated_at": "2024-05-01T11:00:00.654321"
        }"#;
        let record: StoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.updated_at.to_rfc3339(), "2024-05-01T11:00:00.654321+00:00");
        assert!(record.updated_at > record.created_at);
    }
}
