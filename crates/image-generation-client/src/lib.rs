//! # Image generation client
//!
//! Text-to-image for the greeting card, over the OpenAI images API (DALL-E).
//! [`ImageGenerator`] is the seam used by the bot; [`ImageGenerationClient`] is the real
//! implementation.

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::{CreateImageRequestArgs, Image, ImageModel, ImageResponseFormat, ImageSize},
    Client,
};
use async_trait::async_trait;
use openai_client::mask_token;
use std::sync::Arc;

/// Default image model.
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Generates one image for a prompt and returns its URL.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}

/// OpenAI images client.
#[derive(Clone)]
pub struct ImageGenerationClient {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    size: ImageSize,
    masked_key: String,
}

impl ImageGenerationClient {
    /// Builds a client with explicit key and API base URL.
    pub fn new(api_key: String, base_url: String) -> Self {
        let masked_key = mask_token(&api_key);
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            size: ImageSize::S1024x1024,
            masked_key,
        }
    }

    /// dall-e-2 or dall-e-3.
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ImageGenerator for ImageGenerationClient {
    #[tracing::instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        tracing::info!(
            size = ?self.size,
            prompt_preview = %prompt.chars().take(100).collect::<String>(),
            api_key = %self.masked_key,
            "OpenAI image generation request"
        );

        let request = CreateImageRequestArgs::default()
            .prompt(prompt)
            .model(ImageModel::Other(self.model.clone()))
            .size(self.size)
            .response_format(ImageResponseFormat::Url)
            .n(1)
            .build()?;

        if let Ok(json) = serde_json::to_string(&request) {
            tracing::debug!(request_json = %json, "OpenAI image generation request JSON");
        }

        let response = self.client.images().create(request).await?;

        match response.data.first().and_then(|d| match d.as_ref() {
            Image::Url { url, .. } => Some(url),
            Image::B64Json { .. } => None,
        }) {
            Some(url) => {
                tracing::info!(image_url = %url, "OpenAI image generation completed");
                Ok(url.clone())
            }
            None => anyhow::bail!("No image URL in response"),
        }
    }
}
