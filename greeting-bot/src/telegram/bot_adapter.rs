//! Wraps teloxide::Bot and implements [`greet_core::Bot`]. Production code talks to Telegram;
//! tests substitute another Bot impl.

use async_trait::async_trait;
use greet_core::{parse_message_id, Bot as CoreBot, Chat, GreetError, Result};
use reqwest::Url;
use teloxide::{
    prelude::*,
    types::{ChatId, InputFile, MessageId},
};
use tracing::debug;

/// Thin wrapper around teloxide::Bot that implements core's Bot trait.
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use (webhook registration, getMe).
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

/// Telegram rejects an edit whose text equals the current text; for the stream that is a no-op.
pub fn is_message_not_modified_error(e: &teloxide::RequestError) -> bool {
    let s = e.to_string();
    s.contains("message is not modified") || s.contains("exactly the same")
}

fn parse_media_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| GreetError::Bot(format!("Invalid media URL {}: {}", url, e)))
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(|e| GreetError::Bot(e.to_string()))?;
        Ok(())
    }

    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String> {
        let sent = self
            .bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(|e| GreetError::Bot(e.to_string()))?;
        Ok(sent.id.0.to_string())
    }

    async fn edit_message(&self, chat: &Chat, message_id: &str, text: &str) -> Result<()> {
        let id = parse_message_id(message_id)?;
        match self
            .bot
            .edit_message_text(ChatId(chat.id), MessageId(id), text.to_string())
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_message_not_modified_error(&e) => {
                debug!(chat_id = chat.id, message_id = id, "Edit skipped: message is not modified");
                Ok(())
            }
            Err(e) => Err(GreetError::Bot(e.to_string())),
        }
    }

    async fn send_photo(&self, chat: &Chat, image_url: &str, caption: Option<&str>) -> Result<()> {
        let url = parse_media_url(image_url)?;
        let mut request = self.bot.send_photo(ChatId(chat.id), InputFile::url(url));
        if let Some(caption) = caption {
            request = request.caption(caption.to_string());
        }
        request.await.map_err(|e| GreetError::Bot(e.to_string()))?;
        Ok(())
    }

    async fn send_audio(&self, chat: &Chat, audio_url: &str, title: Option<&str>) -> Result<()> {
        let url = parse_media_url(audio_url)?;
        let mut request = self.bot.send_audio(ChatId(chat.id), InputFile::url(url));
        if let Some(title) = title {
            request = request.title(title.to_string());
        }
        request.await.map_err(|e| GreetError::Bot(e.to_string()))?;
        Ok(())
    }
}
