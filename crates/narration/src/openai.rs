//! OpenAI-compatible narrator: one user message with a text part and one image part per photo.
//!
//! Images travel inline as `data:<mime>;base64,...` URLs, so any vision model behind an
//! OpenAI-compatible endpoint works.

use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessageContentPartImage, ChatCompletionRequestMessageContentPartText,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
    ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
    ImageUrl,
};
use async_openai::Client;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, instrument};

use crate::{non_blank, ImagePayload, NarrationError, Narrator};

pub const DEFAULT_VISION_MODEL: &str = "gpt-4o-mini";

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_char_boundary(7) || !token.is_char_boundary(len - 4) {
        return "***".to_string();
    }
    format!("{}***{}", &token[..7], &token[len - 4..])
}

#[derive(Clone)]
pub struct OpenAINarrator {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    masked_key: String,
}

impl OpenAINarrator {
    pub fn new(api_key: String, base_url: String) -> Self {
        let masked_key = mask_token(&api_key);
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            model: DEFAULT_VISION_MODEL.to_string(),
            masked_key,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn user_content(prompt: &str, images: &[ImagePayload]) -> ChatCompletionRequestUserMessageContent {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(ChatCompletionRequestUserMessageContentPart::Text(
            ChatCompletionRequestMessageContentPartText {
                text: prompt.to_string(),
            },
        ));
        for image in images {
            let url = format!("data:{};base64,{}", image.content_type, STANDARD.encode(&image.bytes));
            parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url,
                        detail: Some(ImageDetail::Auto),
                    },
                },
            ));
        }
        ChatCompletionRequestUserMessageContent::Array(parts)
    }
}

#[async_trait]
impl Narrator for OpenAINarrator {
    #[instrument(skip(self, prompt, images), fields(model = %self.model, images = images.len()))]
    async fn narrate(&self, prompt: &str, images: &[ImagePayload]) -> Result<String, NarrationError> {
        if images.is_empty() {
            return Err(NarrationError::NoImages);
        }

        info!(api_key = %self.masked_key, "OpenAI vision chat request");

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(Self::user_content(prompt, images))
            .build()?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .build()?;

        let response = self.client.chat().create(request).await?;

        if let Some(ref u) = response.usage {
            info!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                "OpenAI vision chat usage"
            );
        }

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        non_blank(content)
    }
}
