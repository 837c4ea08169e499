//! Ollama narrator: vision chat through Ollama's `/api/chat` endpoint.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{non_blank, ImagePayload, NarrationError, Narrator};

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llava";

#[derive(Debug, Clone)]
pub struct OllamaNarrator {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaNarrator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

impl Default for OllamaNarrator {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_BASE_URL)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    images: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl Narrator for OllamaNarrator {
    #[instrument(skip(self, prompt, images), fields(model = %self.model, images = images.len()))]
    async fn narrate(&self, prompt: &str, images: &[ImagePayload]) -> Result<String, NarrationError> {
        if images.is_empty() {
            return Err(NarrationError::NoImages);
        }

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
                images: images.iter().map(|i| STANDARD.encode(&i.bytes)).collect(),
            }],
            stream: false,
        };

        info!(url = %self.chat_url(), "Ollama chat request");
        let response = self.client.post(self.chat_url()).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NarrationError::Api { status, body });
        }

        let chat: ChatResponse = response.json().await?;
        let story = non_blank(chat.message.and_then(|m| m.content))?;
        info!(story_len = story.len(), "Ollama chat completed");
        Ok(story)
    }
}
