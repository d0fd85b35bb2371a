//! Greeting chunk source: growing full-text snapshots, then exactly one completion string.
//!
//! [`ChunkSource::stream_greeting`] never fails. Upstream errors, timeouts and empty replies are
//! replaced by the configured fallback text, which becomes the completion.

use async_trait::async_trait;
use prompt::ChatMessage;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::{LlmClient, StreamChunk};

/// Greeting sent when generation fails.
pub const DEFAULT_FALLBACK_TEXT: &str =
    "Wishing you a wonderful day full of joy, warmth and good surprises! 🎉";

/// Receives each full-text snapshot, in order.
pub type ChunkCallback<'a> = dyn FnMut(String) + Send + 'a;

#[async_trait]
pub trait ChunkSource: Send + Sync {
    /// Streams a greeting for `messages`. Calls `on_chunk` zero or more times with growing text
    /// and returns the completion text (generated or fallback).
    async fn stream_greeting(
        &self,
        messages: Vec<ChatMessage>,
        on_chunk: &mut ChunkCallback<'_>,
    ) -> String;
}

/// [`ChunkSource`] over an [`LlmClient`] with a bounded generation time.
pub struct LlmChunkSource {
    llm: Arc<dyn LlmClient>,
    fallback_text: String,
    timeout: Option<Duration>,
}

impl LlmChunkSource {
    pub fn new(llm: Arc<dyn LlmClient>, fallback_text: impl Into<String>) -> Self {
        Self {
            llm,
            fallback_text: fallback_text.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn fallback_text(&self) -> &str {
        &self.fallback_text
    }
}

#[async_trait]
impl ChunkSource for LlmChunkSource {
    async fn stream_greeting(
        &self,
        messages: Vec<ChatMessage>,
        on_chunk: &mut ChunkCallback<'_>,
    ) -> String {
        let start = Instant::now();
        let mut chunks = 0usize;
        let mut forward = |chunk: StreamChunk| {
            if !chunk.delta.is_empty() {
                chunks += 1;
                on_chunk(chunk.text);
            }
        };

        let stream = self.llm.stream_completion(messages, &mut forward);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, stream).await {
                Ok(r) => r,
                Err(_) => Err(anyhow::anyhow!(
                    "generation timed out after {}s",
                    limit.as_secs()
                )),
            },
            None => stream.await,
        };

        match result {
            Ok(text) if !text.trim().is_empty() => {
                info!(
                    chunks,
                    reply_len = text.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Greeting generated"
                );
                text
            }
            Ok(_) => {
                warn!(chunks, "Greeting generation returned empty text; using fallback");
                self.fallback_text.clone()
            }
            Err(e) => {
                warn!(
                    error = %e,
                    chunks,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Greeting generation failed; using fallback"
                );
                self.fallback_text.clone()
            }
        }
    }
}
