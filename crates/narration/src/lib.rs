//! # Narration
//!
//! Defines the [`Narrator`] trait: a prompt plus an ordered list of images in, freeform
//! narrative text out. Two HTTP implementations are provided:
//!
//! - [`OllamaNarrator`] – Ollama `/api/chat` with base64 images (e.g. `llava`)
//! - [`OpenAINarrator`] – OpenAI-compatible chat completions with image parts
//!
//! [`build_story_prompt`] renders the storyteller prompt from a memory's date, weather and place.

use async_trait::async_trait;
use thiserror::Error;

mod ollama;
mod openai;
mod prompt;

pub use ollama::OllamaNarrator;
pub use openai::{mask_token, OpenAINarrator};
pub use prompt::{build_story_prompt, STORY_INSTRUCTIONS};

/// One image handed to a narrator, in upload order.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum NarrationError {
    #[error("No images supplied for narration")]
    NoImages,
    #[error("Narration request failed: {0}")]
    Transport(String),
    #[error("Narration API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Invalid narration response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for NarrationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            NarrationError::InvalidResponse(e.to_string())
        } else {
            NarrationError::Transport(e.to_string())
        }
    }
}

impl From<async_openai::error::OpenAIError> for NarrationError {
    fn from(e: async_openai::error::OpenAIError) -> Self {
        NarrationError::Transport(e.to_string())
    }
}

/// External vision-to-text service that turns photos into a story.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Returns the narrative for `images` under `prompt`. Fails with
    /// [`NarrationError::NoImages`] before any request when `images` is empty.
    async fn narrate(&self, prompt: &str, images: &[ImagePayload]) -> Result<String, NarrationError>;
}

/// Trims the model output; a blank reply is an invalid response.
pub(crate) fn non_blank(text: Option<String>) -> Result<String, NarrationError> {
    text.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| NarrationError::InvalidResponse("empty story text".to_string()))
}
