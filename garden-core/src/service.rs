//! Story orchestration: uploads → photo storage → narrator → repository.
//!
//! The story record is the authority for photo file lifetime. New uploads stay staged until
//! the record that references them is written; files of removed photos (and the cached
//! audio) are deleted only after the record no longer references them.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use narration::{build_story_prompt, ImagePayload, Narrator};
use storage::{PhotoStorage, PhotoUpload, StoredPhoto, StoryRecord, StoryRepository};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, instrument, warn};

use crate::audio::{AudioCache, SpeechSynthesizer};
use crate::error::{Result, StoryError};
use crate::staging::StagedPhotos;

pub const DEFAULT_MAX_PHOTOS: usize = 10;

/// Free-text context of a memory.
#[derive(Debug, Clone)]
pub struct StoryMetadata {
    pub date: String,
    pub weather: String,
    pub location: String,
}

/// Changes for [`StoryService::update_story`]. Absent or blank metadata keeps the old value;
/// an empty `keep_photo_ids` keeps every existing photo.
#[derive(Debug, Clone, Default)]
pub struct StoryUpdate {
    pub date: Option<String>,
    pub weather: Option<String>,
    pub location: Option<String>,
    pub keep_photo_ids: Vec<String>,
    pub uploads: Vec<PhotoUpload>,
}

pub struct StoryService {
    repository: Arc<dyn StoryRepository>,
    photos: PhotoStorage,
    narrator: Arc<dyn Narrator>,
    audio: AudioCache,
    speech: Option<Arc<dyn SpeechSynthesizer>>,
    max_photos: usize,
    /// Held across read → narrate → write so edits of one story never interleave.
    story_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl StoryService {
    pub fn new(
        repository: Arc<dyn StoryRepository>,
        photos: PhotoStorage,
        narrator: Arc<dyn Narrator>,
        audio: AudioCache,
    ) -> Self {
        Self {
            repository,
            photos,
            narrator,
            audio,
            speech: None,
            max_photos: DEFAULT_MAX_PHOTOS,
            story_locks: DashMap::new(),
        }
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn with_max_photos(mut self, max_photos: usize) -> Self {
        self.max_photos = max_photos;
        self
    }

    /// Persists the uploads, narrates them and stores the new record.
    #[instrument(skip(self, metadata, uploads), fields(photos = uploads.len()))]
    pub async fn create_story(
        &self,
        metadata: StoryMetadata,
        uploads: Vec<PhotoUpload>,
    ) -> Result<StoryRecord> {
        self.check_photo_count(uploads.len())?;

        let (staged, images) = self.stage(uploads).await?;
        let story = self
            .narrate(&metadata.date, &metadata.weather, &metadata.location, &images)
            .await?;

        let record = StoryRecord::new(
            metadata.date,
            metadata.weather,
            metadata.location,
            staged.photos().to_vec(),
            Some(story),
        );
        let record = self.repository.add(record).await?;
        staged.commit();

        info!(story_id = %record.id_str(), photos = record.photos.len(), "Story created");
        Ok(record)
    }

    pub async fn list_stories(&self) -> Result<Vec<StoryRecord>> {
        Ok(self.repository.list().await?)
    }

    pub async fn get_story(&self, story_id: &str) -> Result<StoryRecord> {
        self.repository
            .get(story_id)
            .await?
            .ok_or_else(|| StoryError::StoryNotFound(story_id.to_string()))
    }

    pub async fn list_photos(&self, story_id: &str) -> Result<Vec<StoredPhoto>> {
        Ok(self.get_story(story_id).await?.photos)
    }

    /// Photo metadata and its file location; fails when the photo is not part of the story
    /// or its file is gone.
    pub async fn photo_file(&self, story_id: &str, photo_id: &str) -> Result<(StoredPhoto, PathBuf)> {
        let story = self.get_story(story_id).await?;
        let not_found = || StoryError::PhotoNotFound {
            story_id: story_id.to_string(),
            photo_id: photo_id.to_string(),
        };
        let photo = story.photo(photo_id).cloned().ok_or_else(not_found)?;
        if !self.photos.exists(&photo).await {
            return Err(not_found());
        }
        let path = self.photos.path(&photo);
        Ok((photo, path))
    }

    /// Replaces metadata and photo set, then regenerates the narrative from the new set.
    #[instrument(skip(self, update), fields(new_photos = update.uploads.len()))]
    pub async fn update_story(&self, story_id: &str, update: StoryUpdate) -> Result<StoryRecord> {
        let _guard = self.lock_story(story_id).await;
        let mut story = self.get_story(story_id).await?;

        let keep: HashSet<&str> = if update.keep_photo_ids.is_empty() {
            story.photo_ids().collect()
        } else {
            let requested: HashSet<&str> = update.keep_photo_ids.iter().map(String::as_str).collect();
            let unknown: Vec<&str> = requested
                .iter()
                .copied()
                .filter(|id| story.photo(id).is_none())
                .collect();
            if !unknown.is_empty() {
                return Err(StoryError::InvalidSelection(format!(
                    "photos {} do not belong to story {}",
                    unknown.join(", "),
                    story_id
                )));
            }
            requested
        };
        let (kept, removed): (Vec<StoredPhoto>, Vec<StoredPhoto>) = story
            .photos
            .iter()
            .cloned()
            .partition(|p| keep.contains(p.id.as_str()));

        self.check_photo_count(kept.len() + update.uploads.len())?;

        let mut images = Vec::with_capacity(kept.len() + update.uploads.len());
        for photo in &kept {
            let bytes = self.photos.load_bytes(photo).await?;
            images.push(ImagePayload::new(bytes, photo.content_type.clone()));
        }
        let (staged, new_images) = self.stage(update.uploads).await?;
        images.extend(new_images);

        let date = pick(update.date, &story.date);
        let weather = pick(update.weather, &story.weather);
        let location = pick(update.location, &story.location);
        let text = self.narrate(&date, &weather, &location, &images).await?;

        story.date = date;
        story.weather = weather;
        story.location = location;
        story.photos = kept;
        story.photos.extend_from_slice(staged.photos());
        story.story = Some(text);
        story.touch();
        self.repository.update(&story).await?;
        staged.commit();

        self.discard(story_id, &removed).await;
        info!(
            story_id,
            photos = story.photos.len(),
            removed = removed.len(),
            "Story updated"
        );
        Ok(story)
    }

    /// Removes photos from a story. The narrative no longer matches and is cleared.
    #[instrument(skip(self, photo_ids), fields(requested = photo_ids.len()))]
    pub async fn delete_photos(&self, story_id: &str, photo_ids: &[String]) -> Result<StoryRecord> {
        if photo_ids.is_empty() {
            return Err(StoryError::InvalidSelection(
                "photo ids are required to delete photos".to_string(),
            ));
        }
        let _guard = self.lock_story(story_id).await;
        let mut story = self.get_story(story_id).await?;

        let ids: HashSet<&str> = photo_ids.iter().map(String::as_str).collect();
        let (removed, remaining): (Vec<StoredPhoto>, Vec<StoredPhoto>) = story
            .photos
            .iter()
            .cloned()
            .partition(|p| ids.contains(p.id.as_str()));
        if removed.is_empty() {
            return Err(StoryError::InvalidSelection(format!(
                "none of the requested photos belong to story {}",
                story_id
            )));
        }

        story.photos = remaining;
        story.story = None;
        story.touch();
        self.repository.update(&story).await?;

        self.discard(story_id, &removed).await;
        info!(story_id, removed = removed.len(), remaining = story.photos.len(), "Photos deleted");
        Ok(story)
    }

    /// Path of the Cantonese narration audio, synthesizing it on first request.
    ///
    /// The synthesizer writes to a temporary sibling that is renamed into place only on
    /// success, so a failed synthesis is retried on the next request.
    pub async fn story_audio(&self, story_id: &str) -> Result<PathBuf> {
        let _guard = self.lock_story(story_id).await;
        let story = self.get_story(story_id).await?;
        let text = story
            .story
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| StoryError::NoStoryText(story_id.to_string()))?;

        let path = self.audio.path_for(story_id);
        if self.audio.exists(story_id).await {
            return Ok(path);
        }

        let speech = self.speech.as_ref().ok_or(StoryError::SpeechUnavailable)?;
        let translated = speech.translate(text).await.map_err(StoryError::Speech)?;
        self.audio.ensure_dir().await?;
        let temp_path = self.audio.temp_path_for(story_id);
        if let Err(e) = speech.synthesize(&translated, &temp_path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(story_id, error = %cleanup, "Failed to remove partial audio");
                }
            }
            return Err(StoryError::Speech(e));
        }
        tokio::fs::rename(&temp_path, &path).await?;
        info!(story_id, path = %path.display(), "Synthesized story audio");
        Ok(path)
    }

    /// Rewrites legacy photo paths to the canonical `uploads/<file>` form.
    ///
    /// Timestamps are left untouched. Returns the number of records rewritten.
    pub async fn migrate_legacy_paths(&self) -> Result<usize> {
        let mut migrated = 0;
        for listed in self.repository.list().await? {
            let id = listed.id_str().to_string();
            let _guard = self.lock_story(&id).await;
            let Some(mut record) = self.repository.get(&id).await? else {
                continue;
            };
            let mut changed = false;
            for photo in &mut record.photos {
                if let Some(canonical) = self.photos.canonical_path(&photo.path) {
                    photo.path = canonical;
                    changed = true;
                }
            }
            if changed {
                self.repository.update(&record).await?;
                migrated += 1;
            }
        }
        info!(migrated, "Migrated legacy photo paths");
        Ok(migrated)
    }

    /// Deletes upload files no record references and that are older than `min_age`.
    pub async fn sweep_orphans(&self, min_age: Duration) -> Result<Vec<PathBuf>> {
        let referenced: HashSet<String> = self
            .repository
            .list()
            .await?
            .iter()
            .flat_map(|record| record.photos.iter())
            .flat_map(|photo| {
                let stem = self
                    .photos
                    .path(photo)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned());
                [Some(photo.id.clone()), stem]
            })
            .flatten()
            .collect();
        Ok(self.photos.sweep_orphans(&referenced, min_age).await?)
    }

    async fn lock_story(&self, story_id: &str) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(&self.story_locks.entry(story_id.to_string()).or_default());
        lock.lock_owned().await
    }

    fn check_photo_count(&self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(StoryError::NoPhotos);
        }
        if count > self.max_photos {
            return Err(StoryError::TooManyPhotos {
                max: self.max_photos,
                actual: count,
            });
        }
        Ok(())
    }

    async fn stage(&self, uploads: Vec<PhotoUpload>) -> Result<(StagedPhotos, Vec<ImagePayload>)> {
        if uploads.is_empty() {
            return Ok((StagedPhotos::empty(self.photos.clone()), Vec::new()));
        }
        let persisted = self.photos.persist(uploads).await?;
        let mut photos = Vec::with_capacity(persisted.len());
        let mut images = Vec::with_capacity(persisted.len());
        for (photo, bytes) in persisted {
            images.push(ImagePayload::new(bytes, photo.content_type.clone()));
            photos.push(photo);
        }
        Ok((StagedPhotos::new(self.photos.clone(), photos), images))
    }

    async fn narrate(
        &self,
        date: &str,
        weather: &str,
        location: &str,
        images: &[ImagePayload],
    ) -> Result<String> {
        let prompt = build_story_prompt(date, weather, location);
        Ok(self.narrator.narrate(&prompt, images).await?)
    }

    /// Best-effort cleanup after the record stopped referencing `removed`.
    async fn discard(&self, story_id: &str, removed: &[StoredPhoto]) {
        if let Err(e) = self.photos.delete_many(removed).await {
            warn!(story_id, error = %e, "Some removed photo files could not be deleted");
        }
        if let Err(e) = self.audio.delete(story_id).await {
            warn!(story_id, error = %e, "Failed to delete cached audio");
        }
    }
}

fn pick(new: Option<String>, old: &str) -> String {
    new.filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| old.to_string())
}
