//! Cached Cantonese narration audio, one file per story: `<audio-dir>/<story-id>_cantonese.mp3`.
//!
//! The cache is invalidated whenever a story's photos change, since the narrative no longer
//! matches. Translation and speech synthesis are external services behind
//! [`SpeechSynthesizer`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

/// External translate-and-speak service.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Translates story text into Cantonese.
    async fn translate(&self, text: &str) -> anyhow::Result<String>;

    /// Writes spoken audio (MP3) of `text` to `output`.
    async fn synthesize(&self, text: &str, output: &Path) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct AudioCache {
    dir: PathBuf,
}

impl AudioCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_name(story_id: &str) -> String {
        format!("{}_cantonese.mp3", story_id)
    }

    pub fn path_for(&self, story_id: &str) -> PathBuf {
        self.dir.join(Self::file_name(story_id))
    }

    /// Where synthesis writes before the file is moved to [`AudioCache::path_for`].
    pub fn temp_path_for(&self, story_id: &str) -> PathBuf {
        self.dir.join(format!("{}.tmp", Self::file_name(story_id)))
    }

    pub async fn exists(&self, story_id: &str) -> bool {
        tokio::fs::try_exists(self.path_for(story_id))
            .await
            .unwrap_or(false)
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Removes the cached audio; absent audio counts as removed.
    pub async fn delete(&self, story_id: &str) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.path_for(story_id)).await {
            Ok(()) => {
                debug!(story_id, "Deleted cached audio");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
