//! Outbound channel abstraction.
//!
//! [`Bot`] is transport-agnostic: the Telegram implementation lives in `greeting-bot`, tests
//! substitute recording mocks. All calls are independent and may fail transiently.

use crate::error::{GreetError, Result};
use crate::types::Chat;
use async_trait::async_trait;

/// Sends, edits and delivers media into a chat. Implementations are shared across sessions and
/// must be safe to call concurrently.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;

    /// Sends a message and returns its id, used later by [`Bot::edit_message`].
    /// `message_id` is transport-specific (Telegram: numeric string).
    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String>;

    /// Replaces the text of an already-sent message. Editing to identical text must succeed.
    async fn edit_message(&self, chat: &Chat, message_id: &str, text: &str) -> Result<()>;

    /// Sends a photo by URL with an optional caption.
    async fn send_photo(&self, chat: &Chat, image_url: &str, caption: Option<&str>) -> Result<()>;

    /// Sends an audio file by URL with an optional title.
    async fn send_audio(&self, chat: &Chat, audio_url: &str, title: Option<&str>) -> Result<()>;
}

/// Parses a message id string into an i32.
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| GreetError::Bot(format!("Invalid message_id for edit: {}", s)))
}
