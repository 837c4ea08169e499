//! Component factory: builds the story service and its collaborators from [`GardenConfig`].

use std::sync::Arc;

use anyhow::{Context, Result};
use narration::{Narrator, OllamaNarrator, OpenAINarrator};
use storage::{JsonFileStoryRepository, PhotoStorage, SqliteStoryRepository, StoryRepository};
use tracing::{error, info, instrument};

use crate::audio::AudioCache;
use crate::config::{GardenConfig, NarratorKind, StoreBackend};
use crate::service::StoryService;

/// Opens the configured story repository.
pub async fn build_repository(config: &GardenConfig) -> Result<Arc<dyn StoryRepository>> {
    open_repository(config, config.store_backend).await
}

/// Opens the repository of the given backend at its configured location and ensures its
/// indexes. Used directly when copying between backends.
#[instrument(skip(config))]
pub async fn open_repository(
    config: &GardenConfig,
    backend: StoreBackend,
) -> Result<Arc<dyn StoryRepository>> {
    let repository: Arc<dyn StoryRepository> = match backend {
        StoreBackend::Json => {
            let path = config.stories_file();
            info!(path = %path.display(), "Using JSON file story store");
            Arc::new(JsonFileStoryRepository::new(path).await.map_err(|e| {
                error!(error = %e, "Failed to open JSON story store");
                anyhow::anyhow!("Failed to open JSON story store: {}", e)
            })?)
        }
        StoreBackend::Sqlite => {
            let path = &config.stories_db_path;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let path = path.to_string_lossy();
            info!(db_path = %path, "Using SQLite document story store");
            Arc::new(SqliteStoryRepository::new(&path).await.map_err(|e| {
                error!(error = %e, "Failed to open SQLite story store");
                anyhow::anyhow!("Failed to open SQLite story store: {}", e)
            })?)
        }
    };
    repository
        .ensure_indexes()
        .await
        .context("Failed to create story indexes")?;
    Ok(repository)
}

/// Creates the vision narrator selected by `NARRATOR`.
pub fn build_narrator(config: &GardenConfig) -> Result<Arc<dyn Narrator>> {
    let narrator: Arc<dyn Narrator> = match config.narrator {
        NarratorKind::Ollama => {
            info!(
                base_url = %config.ollama_base_url,
                model = %config.ollama_model,
                "Using Ollama narrator"
            );
            Arc::new(
                OllamaNarrator::new(config.ollama_base_url.clone())
                    .with_model(config.ollama_model.clone()),
            )
        }
        NarratorKind::OpenAI => {
            let api_key = config
                .openai_api_key
                .clone()
                .context("OPENAI_API_KEY is required when NARRATOR=openai")?;
            info!(
                base_url = %config.openai_base_url,
                model = %config.vision_model,
                "Using OpenAI narrator"
            );
            Arc::new(
                OpenAINarrator::new(api_key, config.openai_base_url.clone())
                    .with_model(config.vision_model.clone()),
            )
        }
    };
    Ok(narrator)
}

/// Assembles a [`StoryService`] from config. Speech synthesis is not wired here; callers
/// attach a synthesizer with [`StoryService::with_speech`].
pub async fn build_service(config: &GardenConfig) -> Result<StoryService> {
    let repository = build_repository(config).await?;
    let photos = PhotoStorage::new(config.uploads_dir())
        .with_context(|| format!("Failed to open {}", config.uploads_dir().display()))?;
    let narrator = build_narrator(config)?;
    let audio = AudioCache::new(config.audio_dir());

    Ok(StoryService::new(repository, photos, narrator, audio).with_max_photos(config.max_photos))
}
