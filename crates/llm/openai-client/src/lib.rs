//! # OpenAI API client
//!
//! Thin wrapper around [async-openai] for streamed chat completion.
//! Each content delta is reported as a full-text snapshot so consumers can render the reply so
//! far without keeping their own buffer. Provides token masking for safe logging.

use async_openai::{config::OpenAIConfig, types::CreateChatCompletionRequestArgs, Client};
use futures::StreamExt;
use std::sync::Arc;

pub use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_char_boundary(7) || !token.is_char_boundary(len - 4) {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}

/// One streamed update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk {
    /// Content added by this update.
    pub delta: String,
    /// Full reply text so far (includes `delta`).
    pub text: String,
    /// True once the model reported a finish reason.
    pub done: bool,
}

/// Turns content deltas into full-text snapshots.
#[derive(Debug, Default)]
pub struct SnapshotAccumulator {
    text: String,
}

impl SnapshotAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `delta`. Returns a chunk when the text grew or the stream finished; an empty,
    /// unfinished delta yields nothing.
    pub fn push(&mut self, delta: Option<&str>, done: bool) -> Option<StreamChunk> {
        let delta = delta.unwrap_or_default();
        if delta.is_empty() && !done {
            return None;
        }
        self.text.push_str(delta);
        Some(StreamChunk {
            delta: delta.to_string(),
            text: self.text.clone(),
            done,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// OpenAI chat client. Key and base URL are passed in explicitly.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Arc<Client<OpenAIConfig>>,
    masked_key: String,
}

impl OpenAIClient {
    /// Builds a client using the given API key and default API base URL.
    pub fn new(api_key: String) -> Self {
        let masked_key = mask_token(&api_key);
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Arc::new(Client::with_config(config)),
            masked_key,
        }
    }

    /// Builds a client with a custom base URL (proxies, compatible endpoints, test servers).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let masked_key = mask_token(&api_key);
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            masked_key,
        }
    }

    /// Streams a chat completion, invoking `callback` with a [`StreamChunk`] for every content
    /// delta. Returns the full reply text. Stream errors are propagated.
    pub async fn chat_completion_stream<F>(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
        mut callback: F,
    ) -> anyhow::Result<String>
    where
        F: FnMut(StreamChunk) + Send,
    {
        tracing::info!(
            model = %model,
            message_count = messages.len(),
            api_key = %self.masked_key,
            "OpenAI chat_completion_stream request"
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()?;

        if let Ok(json) = serde_json::to_string(&request) {
            tracing::debug!(request_json = %json, "OpenAI chat_completion_stream request JSON");
        }

        let mut stream = self.client.chat().create_stream(request).await?;
        let mut acc = SnapshotAccumulator::new();
        let mut updates = 0usize;

        while let Some(result) = stream.next().await {
            let chunk = match result {
                Ok(chunk) => chunk,
                Err(e) => anyhow::bail!("Stream error: {}", e),
            };
            if let Some(ref u) = chunk.usage {
                tracing::info!(
                    prompt_tokens = u.prompt_tokens,
                    completion_tokens = u.completion_tokens,
                    total_tokens = u.total_tokens,
                    "OpenAI chat_completion_stream usage"
                );
            }
            if let Some(choice) = chunk.choices.first() {
                let done = choice.finish_reason.is_some();
                if let Some(update) = acc.push(choice.delta.content.as_deref(), done) {
                    updates += 1;
                    callback(update);
                }
            }
        }

        tracing::info!(
            updates,
            reply_len = acc.text().len(),
            "OpenAI chat_completion_stream finished"
        );
        Ok(acc.into_text())
    }
}
