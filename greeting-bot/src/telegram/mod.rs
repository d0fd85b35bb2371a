//! Telegram layer: adapters, Bot implementation, commands, webhook server and registration.

mod adapters;
mod bot_adapter;
pub mod commands;
pub mod registration;
pub mod webhook;

pub use adapters::{chat_type, TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::{is_message_not_modified_error, TelegramBotAdapter};
pub use commands::{help_text, parse_command, Command};
pub use webhook::{router, WebhookState, SECRET_TOKEN_HEADER};
