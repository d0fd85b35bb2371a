//! Shared fixtures for greeting-bot integration tests: mock bot, scripted generators, messages
//! and an in-code config.

#![allow(dead_code)]

pub mod mock_bot;

use anyhow::Result;
use async_trait::async_trait;
use greet_core::{Chat, Message, User};
use greeting_bot::config::{BaseAppExtensions, BaseConfig, BotConfig, ImageCardConfig, SongConfig};
use image_generation_client::ImageGenerator;
use llm_client::{ChunkCallback, ChunkSource, EnvLlmConfig};
use prompt::ChatMessage;
use song_generation_client::{SongError, SongGenerator, SongRequest, SongResult};
use std::sync::Mutex;
use std::time::Duration;

pub const PLACEHOLDER: &str = "✍️ Writing your greeting...";

/// Chunk source that replays fixed snapshots with virtual-time gaps, then returns `completion`.
pub struct ScriptedSource {
    /// (wait before this chunk, chunk text)
    pub chunks: Vec<(Duration, String)>,
    /// Wait between the last chunk and the completion.
    pub tail: Duration,
    pub completion: String,
    pub seen_messages: Mutex<Vec<ChatMessage>>,
}

impl ScriptedSource {
    pub fn new(chunks: &[&str], completion: &str) -> Self {
        Self {
            chunks: chunks.iter().map(|c| (Duration::ZERO, c.to_string())).collect(),
            tail: Duration::ZERO,
            completion: completion.to_string(),
            seen_messages: Mutex::new(Vec::new()),
        }
    }

    /// Chunks at absolute offsets (ms from start) and the completion at `completion_at_ms`.
    pub fn timed(chunks: &[(u64, &str)], completion_at_ms: u64, completion: &str) -> Self {
        let mut last = 0;
        let mut timed = Vec::new();
        for (at, text) in chunks {
            timed.push((Duration::from_millis(at - last), text.to_string()));
            last = *at;
        }
        Self {
            chunks: timed,
            tail: Duration::from_millis(completion_at_ms - last),
            completion: completion.to_string(),
            seen_messages: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChunkSource for ScriptedSource {
    async fn stream_greeting(
        &self,
        messages: Vec<ChatMessage>,
        on_chunk: &mut ChunkCallback<'_>,
    ) -> String {
        *self.seen_messages.lock().unwrap() = messages;
        for (wait, text) in &self.chunks {
            if !wait.is_zero() {
                tokio::time::sleep(*wait).await;
            }
            on_chunk(text.clone());
        }
        if !self.tail.is_zero() {
            tokio::time::sleep(self.tail).await;
        }
        self.completion.clone()
    }
}

pub enum ImageBehavior {
    Url(&'static str),
    Fail,
    Hang,
}

pub struct StubImageGenerator {
    pub behavior: ImageBehavior,
    pub prompts: Mutex<Vec<String>>,
}

impl StubImageGenerator {
    pub fn new(behavior: ImageBehavior) -> Self {
        Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ImageGenerator for StubImageGenerator {
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.behavior {
            ImageBehavior::Url(url) => Ok(url.to_string()),
            ImageBehavior::Fail => anyhow::bail!("content policy violation"),
            ImageBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                anyhow::bail!("unreachable")
            }
        }
    }
}

pub enum SongBehavior {
    Ready(&'static str),
    Fail,
    Timeout,
}

pub struct StubSongGenerator {
    pub behavior: SongBehavior,
    pub requests: Mutex<Vec<SongRequest>>,
}

impl StubSongGenerator {
    pub fn new(behavior: SongBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SongGenerator for StubSongGenerator {
    async fn generate_song(&self, request: &SongRequest) -> std::result::Result<SongResult, SongError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.behavior {
            SongBehavior::Ready(url) => Ok(SongResult {
                id: "song-1".to_string(),
                audio_url: url.to_string(),
                title: None,
            }),
            SongBehavior::Fail => Err(SongError::Failed("lyrics rejected".to_string())),
            SongBehavior::Timeout => Err(SongError::Timeout {
                id: "song-1".to_string(),
                waited_secs: 300,
            }),
        }
    }
}

pub fn private_chat() -> Chat {
    Chat {
        id: 5,
        chat_type: "private".to_string(),
    }
}

pub fn group_chat() -> Chat {
    Chat {
        id: -10,
        chat_type: "group".to_string(),
    }
}

pub fn message_in(chat: Chat, text: &str) -> Message {
    Message {
        id: "1".to_string(),
        user: User {
            id: 5,
            username: Some("ada".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: None,
        },
        chat,
        content: text.to_string(),
        message_type: "text".to_string(),
        created_at: chrono::Utc::now(),
        reply_to_message_id: None,
    }
}

/// Config built in code, no env access.
pub fn test_config() -> BotConfig {
    BotConfig {
        base: BaseConfig {
            bot_token: "123:test".to_string(),
            telegram_api_url: None,
            log_file: "logs/test.log".to_string(),
            edit_interval: Duration::from_millis(500),
            stream_marker: " ▌".to_string(),
            placeholder_message: PLACEHOLDER.to_string(),
            webhook_listen_addr: "127.0.0.1:0".to_string(),
            webhook_path: "/webhook".to_string(),
            webhook_url: None,
            webhook_secret: None,
            allowed_user_ids: Vec::new(),
        },
        extensions: BaseAppExtensions {
            llm: EnvLlmConfig {
                openai_api_key: "sk-test".to_string(),
                openai_base_url: "https://api.openai.com/v1".to_string(),
                llm_model: "gpt-4o-mini".to_string(),
                llm_system_prompt: None,
                greeting_fallback_text: "Have a wonderful day!".to_string(),
                generation_timeout: Duration::from_secs(60),
            },
            image_card: ImageCardConfig {
                enabled: false,
                model: "dall-e-3".to_string(),
                timeout: Duration::from_secs(120),
            },
            song: SongConfig {
                enabled: false,
                api_url: None,
                api_key: None,
                poll_interval: Duration::from_secs(5),
                max_poll: Duration::from_secs(300),
            },
        },
    }
}
