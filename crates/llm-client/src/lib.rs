//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait, its OpenAI implementation and the [`ChunkSource`] used by the
//! greeting flow. Transport-agnostic.
//!
//! The stream callback is a `&mut dyn FnMut` so that [`LlmClient`] is object-safe (dyn compatible).

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};
use prompt::{ChatMessage, MessageRole};

mod chunk_source;
mod config;
mod openai_llm;

pub use chunk_source::{ChunkCallback, ChunkSource, LlmChunkSource, DEFAULT_FALLBACK_TEXT};
pub use config::EnvLlmConfig;
pub use openai_client::StreamChunk;
pub use openai_llm::OpenAILlmClient;

/// Callback receiving each streamed update.
pub type StreamChunkCallback<'a> = dyn FnMut(StreamChunk) + Send + 'a;

/// LLM client interface: streamed completion from a list of messages.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invokes `on_chunk` for each update and returns the full reply text.
    /// Implementations add their system prompt.
    async fn stream_completion(
        &self,
        messages: Vec<ChatMessage>,
        on_chunk: &mut StreamChunkCallback<'_>,
    ) -> Result<String>;
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(openai_msg)
}
