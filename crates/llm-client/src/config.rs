//! LLM configuration loaded from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::chunk_source::DEFAULT_FALLBACK_TEXT;
use crate::openai_llm::DEFAULT_MODEL;

/// Default upper bound on one greeting generation.
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

/// LLM config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvLlmConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub llm_model: String,
    /// `None` uses the built-in greeting system message.
    pub llm_system_prompt: Option<String>,
    pub greeting_fallback_text: String,
    pub generation_timeout: Duration,
}

impl EnvLlmConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let openai_api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let llm_model = env::var("MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let llm_system_prompt = env::var("LLM_SYSTEM_PROMPT")
            .or_else(|_| env::var("SYSTEM_PROMPT"))
            .ok()
            .filter(|s| !s.trim().is_empty());
        let greeting_fallback_text = env::var("GREETING_FALLBACK_TEXT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FALLBACK_TEXT.to_string());
        let generation_timeout_secs = match env::var("GREETING_TIMEOUT_SECS") {
            Ok(s) => s
                .parse::<u64>()
                .with_context(|| format!("GREETING_TIMEOUT_SECS must be a number, got {:?}", s))?,
            Err(_) => DEFAULT_GENERATION_TIMEOUT_SECS,
        };
        Ok(Self {
            openai_api_key,
            openai_base_url,
            llm_model,
            llm_system_prompt,
            greeting_fallback_text,
            generation_timeout: Duration::from_secs(generation_timeout_secs),
        })
    }
}
