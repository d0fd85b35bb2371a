//! # Song generation client
//!
//! Turns greeting lyrics into a short song through an HTTP song service.
//!
//! ## API interaction
//!
//! 1. `POST {base}/api/generate` with bearer key and `{ title, prompt, tags }` → `{ "id" }`
//! 2. `GET {base}/api/songs/{id}` every poll interval until `status` is `complete` (with
//!    `audio_url`) or `error`, or until the max poll duration is exceeded.
//!
//! [`SongGenerator`] is the seam used by the bot; [`SongGenerationClient`] is the real
//! implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default delay between two status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default upper bound on the whole poll loop.
pub const DEFAULT_MAX_POLL: Duration = Duration::from_secs(300);

/// Per-request HTTP timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum SongError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Song API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Song generation failed: {0}")]
    Failed(String),

    #[error("Song {id} not ready after {waited_secs}s")]
    Timeout { id: String, waited_secs: u64 },
}

/// What to sing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRequest {
    pub title: String,
    pub lyrics: String,
    pub tags: String,
}

/// A finished song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongResult {
    pub id: String,
    pub audio_url: String,
    pub title: Option<String>,
}

#[async_trait]
pub trait SongGenerator: Send + Sync {
    async fn generate_song(&self, request: &SongRequest) -> Result<SongResult, SongError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    title: &'a str,
    prompt: &'a str,
    tags: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SongStatus {
    status: String,
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP song service client.
#[derive(Debug, Clone)]
pub struct SongGenerationClient {
    client: Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
    max_poll: Duration,
}

impl SongGenerationClient {
    /// Builds a client for `base_url` (without trailing `/api`).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, SongError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll: DEFAULT_MAX_POLL,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_poll(mut self, max_poll: Duration) -> Self {
        self.max_poll = max_poll;
        self
    }

    async fn submit(&self, request: &SongRequest) -> Result<String, SongError> {
        let body = GenerateRequest {
            title: &request.title,
            prompt: &request.lyrics,
            tags: &request.tags,
        };
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SongError::Api { status, body });
        }
        let created: GenerateResponse = response.json().await?;
        Ok(created.id)
    }

    async fn fetch_status(&self, id: &str) -> Result<SongStatus, SongError> {
        let response = self
            .client
            .get(format!("{}/api/songs/{}", self.base_url, id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SongError::Api { status, body });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SongGenerator for SongGenerationClient {
    #[tracing::instrument(skip(self, request), fields(title = %request.title))]
    async fn generate_song(&self, request: &SongRequest) -> Result<SongResult, SongError> {
        let started = Instant::now();
        let id = self.submit(request).await?;
        info!(song_id = %id, "Song generation submitted");

        let mut polls = 0u32;
        loop {
            let status = self.fetch_status(&id).await?;
            polls += 1;
            debug!(song_id = %id, polls, status = %status.status, "Song status");

            match status.status.as_str() {
                "complete" => {
                    let audio_url = status.audio_url.filter(|u| !u.is_empty()).ok_or_else(|| {
                        SongError::Failed("completed song has no audio_url".to_string())
                    })?;
                    info!(
                        song_id = %id,
                        polls,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Song generation completed"
                    );
                    return Ok(SongResult {
                        id,
                        audio_url,
                        title: status.title,
                    });
                }
                "error" => {
                    let reason = status.error.unwrap_or_else(|| "unknown error".to_string());
                    warn!(song_id = %id, reason = %reason, "Song generation reported error");
                    return Err(SongError::Failed(reason));
                }
                _ => {}
            }

            if started.elapsed() + self.poll_interval > self.max_poll {
                return Err(SongError::Timeout {
                    id,
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
