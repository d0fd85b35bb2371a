//! # Greeting bot
//!
//! Telegram bot that writes personal greetings. Updates arrive on an HTTP webhook; each request
//! gets a placeholder message that is edited in place while the greeting streams in, then
//! optional follow-ups (image card, song).
//!
//! Core (Bot, Handler, Message) lives in `greet-core`, the edit throttle in `stream-edit`,
//! generation in `llm-client` and the media clients.

pub mod chain;
pub mod cli;
pub mod components;
pub mod config;
pub mod handlers;
pub mod runner;
pub mod telegram;

use std::sync::Arc;

/// Bot username (without `@`), filled from getMe at start-up; empty until then.
pub type BotUsername = Arc<tokio::sync::RwLock<Option<String>>>;

pub use greet_core::{
    init_tracing, Bot, Chat, GreetError, Handler, HandlerError, HandlerResponse, Message, Result,
    ToCoreMessage, User,
};

pub use chain::HandlerChain;
pub use cli::{Cli, Commands};
pub use components::{build_bot_components, build_handler_chain, BotComponents};
pub use config::{AppExtensions, BaseConfig, BotConfig};
pub use handlers::{
    AllowlistHandler, CommandHandler, GreetingHandler, ImageCardFlow, RequestLogHandler, SongFlow,
};
pub use runner::{run_bot, serve};
pub use telegram::{TelegramBotAdapter, TelegramMessageWrapper, WebhookState};
