//! Configuration loaded from environment variables (after `dotenvy::dotenv()` in the binary).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Backing store for story records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// `<root>/data/stories.json`
    Json,
    /// SQLite document collection at `STORIES_DB_PATH`.
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "file" => Ok(StoreBackend::Json),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => anyhow::bail!("Unknown STORE_BACKEND '{}': expected json or sqlite", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarratorKind {
    Ollama,
    OpenAI,
}

impl FromStr for NarratorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(NarratorKind::Ollama),
            "openai" => Ok(NarratorKind::OpenAI),
            other => anyhow::bail!("Unknown NARRATOR '{}': expected ollama or openai", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GardenConfig {
    /// GARDEN_ROOT; holds `uploads/`, `data/` and `audio/`.
    pub root: PathBuf,
    pub store_backend: StoreBackend,
    pub stories_db_path: PathBuf,
    pub narrator: NarratorKind,
    pub ollama_base_url: String,
    pub ollama_model: String,
    /// Required only when `narrator` is OpenAI.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub vision_model: String,
    pub max_photos: usize,
    pub log_file: String,
}

impl GardenConfig {
    pub fn load() -> Result<Self> {
        let root = PathBuf::from(env::var("GARDEN_ROOT").unwrap_or_else(|_| ".".to_string()));
        let store_backend = env_or("STORE_BACKEND", "json").parse()?;
        let stories_db_path = env::var("STORIES_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| root.join("data").join("stories.db"));
        let narrator = env_or("NARRATOR", "ollama").parse()?;
        let ollama_base_url = env_or("OLLAMA_BASE_URL", "http://localhost:11434");
        let ollama_model = env_or("OLLAMA_MODEL", "llava");
        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let openai_base_url = env_or("OPENAI_BASE_URL", "https://api.openai.com/v1");
        let vision_model = env_or("VISION_MODEL", "gpt-4o-mini");
        let max_photos = match env::var("MAX_PHOTOS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("MAX_PHOTOS must be a positive integer, got '{}'", raw))?,
            Err(_) => 10,
        };
        let log_file = env_or("LOG_FILE", "logs/memory-garden.log");

        let config = Self {
            root,
            store_backend,
            stories_db_path,
            narrator,
            ollama_base_url,
            ollama_model,
            openai_api_key,
            openai_base_url,
            vision_model,
            max_photos,
            log_file,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_photos == 0 {
            anyhow::bail!("MAX_PHOTOS must be at least 1");
        }
        if self.narrator == NarratorKind::OpenAI && self.openai_api_key.is_none() {
            anyhow::bail!("OPENAI_API_KEY is required when NARRATOR=openai");
        }
        Ok(())
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    pub fn stories_file(&self) -> PathBuf {
        self.root.join("data").join("stories.json")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.root.join("audio")
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
