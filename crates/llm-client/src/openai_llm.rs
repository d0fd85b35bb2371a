//! OpenAI implementation of [`LlmClient`]: wraps openai-client and prepends the system message.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs};
use prompt::{ChatMessage, DEFAULT_SYSTEM_MESSAGE};
use tracing::instrument;

use super::{chat_message_to_openai, EnvLlmConfig, LlmClient, StreamChunkCallback};

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// [`LlmClient`] backed by openai-client.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: openai_client::OpenAIClient,
    model: String,
    system_prompt: Option<String>,
}

impl OpenAILlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: openai_client::OpenAIClient::new(api_key),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
        }
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: openai_client::OpenAIClient::with_base_url(api_key, base_url),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
        }
    }

    /// Builds a client from key, base URL, model and system prompt in `config`.
    pub fn from_config(config: &EnvLlmConfig) -> Self {
        Self::with_base_url(config.openai_api_key.clone(), config.openai_base_url.clone())
            .with_model(config.llm_model.clone())
            .with_system_prompt_opt(config.llm_system_prompt.clone())
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_system_prompt_opt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn system_content(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_MESSAGE)
    }

    fn build_messages(&self, messages: &[ChatMessage]) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut openai_messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_content().to_string())
                .build()?
                .into()];
        for msg in messages {
            openai_messages.push(chat_message_to_openai(msg)?);
        }
        Ok(openai_messages)
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages, on_chunk), fields(model = %self.model))]
    async fn stream_completion(
        &self,
        messages: Vec<ChatMessage>,
        on_chunk: &mut StreamChunkCallback<'_>,
    ) -> Result<String> {
        let openai_messages = self.build_messages(&messages)?;
        self.client
            .chat_completion_stream(&self.model, openai_messages, |chunk| on_chunk(chunk))
            .await
    }
}
