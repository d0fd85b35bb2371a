//! Bot configuration: BaseConfig (Telegram + log + webhook + streaming) + AppExtensions (LLM,
//! image card, song).

mod base;
mod bot_config;
mod extensions;


pub use base::{BaseConfig, DEFAULT_PLACEHOLDER_MESSAGE};
pub use bot_config::BotConfig;
pub use extensions::{AppExtensions, BaseAppExtensions, ImageCardConfig, SongConfig};
