//! App extensions trait and default implementation: LLM config (from llm-client) plus the
//! optional image card and song sub-flows.

use anyhow::{Context, Result};
use llm_client::EnvLlmConfig;
use std::env;
use std::time::Duration;

use image_generation_client::DEFAULT_IMAGE_MODEL;
use song_generation_client::{DEFAULT_MAX_POLL, DEFAULT_POLL_INTERVAL};

/// Image card sub-flow settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCardConfig {
    pub enabled: bool,
    pub model: String,
    pub timeout: Duration,
}

/// Song sub-flow settings. URL and key are required only when enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongConfig {
    pub enabled: bool,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub poll_interval: Duration,
    pub max_poll: Duration,
}

/// Application extension config. Implement this trait to inject custom config.
pub trait AppExtensions: Send + Sync {
    fn llm_config(&self) -> &EnvLlmConfig;
    fn image_card_config(&self) -> Option<&ImageCardConfig> {
        None
    }
    fn song_config(&self) -> Option<&SongConfig> {
        None
    }
}

/// Base extensions: LLM + image card + song.
#[derive(Debug, Clone)]
pub struct BaseAppExtensions {
    pub llm: EnvLlmConfig,
    pub image_card: ImageCardConfig,
    pub song: SongConfig,
}

impl AppExtensions for BaseAppExtensions {
    fn llm_config(&self) -> &EnvLlmConfig {
        &self.llm
    }
    fn image_card_config(&self) -> Option<&ImageCardConfig> {
        Some(&self.image_card).filter(|c| c.enabled)
    }
    fn song_config(&self) -> Option<&SongConfig> {
        Some(&self.song).filter(|c| c.enabled)
    }
}

impl BaseAppExtensions {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let llm = EnvLlmConfig::from_env()?;

        let image_card = ImageCardConfig {
            enabled: env_flag("IMAGE_CARD_ENABLED"),
            model: env::var("IMAGE_MODEL").unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
            timeout: Duration::from_secs(env_secs("IMAGE_TIMEOUT_SECS", 120)?),
        };

        let song = SongConfig {
            enabled: env_flag("SONG_ENABLED"),
            api_url: env::var("SONG_API_URL").ok().filter(|s| !s.is_empty()),
            api_key: env::var("SONG_API_KEY").ok().filter(|s| !s.is_empty()),
            poll_interval: Duration::from_secs(env_secs(
                "SONG_POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL.as_secs(),
            )?),
            max_poll: Duration::from_secs(env_secs(
                "SONG_MAX_POLL_SECS",
                DEFAULT_MAX_POLL.as_secs(),
            )?),
        };

        Ok(Self {
            llm,
            image_card,
            song,
        })
    }

    /// Validate: an enabled song sub-flow needs its URL and key, and the URL must parse.
    pub fn validate(&self) -> Result<()> {
        if reqwest::Url::parse(&self.llm.openai_base_url).is_err() {
            anyhow::bail!("OPENAI_BASE_URL is not a valid URL: {}", self.llm.openai_base_url);
        }
        if self.song.enabled {
            let url = self
                .song
                .api_url
                .as_deref()
                .context("SONG_ENABLED is set but SONG_API_URL is missing")?;
            if reqwest::Url::parse(url).is_err() {
                anyhow::bail!("SONG_API_URL is not a valid URL: {}", url);
            }
            if self.song.api_key.is_none() {
                anyhow::bail!("SONG_ENABLED is set but SONG_API_KEY is missing");
            }
        }
        Ok(())
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn env_secs(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(s) => s
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number of seconds, got {:?}", name, s)),
        Err(_) => Ok(default),
    }
}
