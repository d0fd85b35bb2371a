//! Base config: Telegram Bot connection, logging, webhook server and stream-edit tuning. Loaded
//! from env.

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use stream_edit::{ThrottleConfig, DEFAULT_EDIT_INTERVAL, DEFAULT_MARKER};

/// Placeholder sent before the first chunk arrives.
pub const DEFAULT_PLACEHOLDER_MESSAGE: &str = "✍️ Writing your greeting...";

/// Base config: everything the Telegram side needs.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// Log file path
    pub log_file: String,
    /// Min interval between intermediate edits of the streamed message (TELEGRAM_EDIT_INTERVAL_MS)
    pub edit_interval: Duration,
    /// Suffix shown while the greeting is still being written
    pub stream_marker: String,
    pub placeholder_message: String,
    /// WEBHOOK_LISTEN_ADDR
    pub webhook_listen_addr: String,
    /// WEBHOOK_PATH
    pub webhook_path: String,
    /// Public URL registered by `set-webhook` (WEBHOOK_URL)
    pub webhook_url: Option<String>,
    /// Expected X-Telegram-Bot-Api-Secret-Token (WEBHOOK_SECRET)
    pub webhook_secret: Option<String>,
    /// ALLOWED_USER_IDS; empty means everyone
    pub allowed_user_ids: Vec<i64>,
}

impl BaseConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env::var("BOT_TOKEN").context("BOT_TOKEN not set")?,
        };
        let log_file =
            env::var("LOG_FILE").unwrap_or_else(|_| "logs/greeting-bot.log".to_string());
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let edit_interval = env::var("TELEGRAM_EDIT_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_EDIT_INTERVAL);
        let stream_marker =
            env::var("STREAM_MARKER").unwrap_or_else(|_| DEFAULT_MARKER.to_string());
        let placeholder_message = env::var("PLACEHOLDER_MESSAGE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER_MESSAGE.to_string());
        let webhook_listen_addr =
            env::var("WEBHOOK_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let webhook_path = env::var("WEBHOOK_PATH").unwrap_or_else(|_| "/webhook".to_string());
        let webhook_url = env::var("WEBHOOK_URL").ok().filter(|s| !s.is_empty());
        let webhook_secret = env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty());
        let allowed_user_ids = match env::var("ALLOWED_USER_IDS") {
            Ok(s) => parse_user_ids(&s)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file,
            edit_interval,
            stream_marker,
            placeholder_message,
            webhook_listen_addr,
            webhook_path,
            webhook_url,
            webhook_secret,
            allowed_user_ids,
        })
    }

    /// Validate config: URLs parse, the listen address is a socket address, the path is
    /// absolute, and the secret uses only characters Telegram accepts.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        if let Some(ref url_str) = self.webhook_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!("WEBHOOK_URL is set but not a valid URL: {}", url_str);
            }
        }
        if self.webhook_listen_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!(
                "WEBHOOK_LISTEN_ADDR is not a socket address: {}",
                self.webhook_listen_addr
            );
        }
        if !self.webhook_path.starts_with('/') {
            anyhow::bail!("WEBHOOK_PATH must start with '/': {}", self.webhook_path);
        }
        if let Some(ref secret) = self.webhook_secret {
            if !is_valid_secret_token(secret) {
                anyhow::bail!("WEBHOOK_SECRET must be 1-256 characters of A-Z, a-z, 0-9, _ and -");
            }
        }
        if self.edit_interval.is_zero() {
            anyhow::bail!("TELEGRAM_EDIT_INTERVAL_MS must be greater than 0");
        }
        Ok(())
    }

    pub fn throttle_config(&self) -> ThrottleConfig {
        ThrottleConfig::new(self.edit_interval, self.stream_marker.clone())
    }

    /// Full public webhook URL: WEBHOOK_URL joined with WEBHOOK_PATH.
    pub fn public_webhook_url(&self) -> Option<String> {
        self.webhook_url.as_ref().map(|base| {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                self.webhook_path.trim_start_matches('/')
            )
        })
    }
}

fn parse_user_ids(s: &str) -> Result<Vec<i64>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .with_context(|| format!("ALLOWED_USER_IDS contains a non-numeric id: {:?}", part))
        })
        .collect()
}

fn is_valid_secret_token(secret: &str) -> bool {
    !secret.is_empty()
        && secret.len() <= 256
        && secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
