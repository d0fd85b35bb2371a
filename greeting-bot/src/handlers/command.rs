//! `/start`, `/help` and usage hints. Everything else continues down the chain.

use async_trait::async_trait;
use greet_core::{Bot, Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::telegram::{help_text, parse_command, Command};
use crate::BotUsername;

pub const MSG_START: &str = "Hi! I write personal greetings.\n\n\
Send me who the greeting is for and the occasion, for example:\n\
Anna | birthday | funny\n\n\
In groups use /greet Anna | birthday.";

pub const MSG_GREET_USAGE: &str = "Usage: /greet <recipient> | <occasion> | <style>\n\
Example: /greet Anna | birthday | funny";

pub struct CommandHandler {
    bot: Arc<dyn Bot>,
    bot_username: BotUsername,
}

impl CommandHandler {
    pub fn new(bot: Arc<dyn Bot>, bot_username: BotUsername) -> Self {
        Self { bot, bot_username }
    }

    async fn reply(&self, message: &Message, text: String) -> Result<HandlerResponse> {
        self.bot.send_message(&message.chat, &text).await?;
        Ok(HandlerResponse::Reply(text))
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let text = message.content.trim();
        if !text.starts_with('/') {
            return Ok(HandlerResponse::Continue);
        }

        let username = self.bot_username.read().await.clone();
        match parse_command(text, username.as_deref()) {
            Some(Command::Start) => {
                info!("Command /start");
                self.reply(message, MSG_START.to_string()).await
            }
            Some(Command::Help) => {
                info!("Command /help");
                self.reply(message, format!("{}\n\n{}", help_text(), MSG_GREET_USAGE))
                    .await
            }
            Some(Command::Greet(args)) if args.trim().is_empty() => {
                self.reply(message, MSG_GREET_USAGE.to_string()).await
            }
            Some(Command::Greet(_)) => Ok(HandlerResponse::Continue),
            // Unknown commands get help in private chats; in groups they may belong to other bots.
            None if message.chat.is_private() => {
                self.reply(message, format!("{}\n\n{}", help_text(), MSG_GREET_USAGE))
                    .await
            }
            None => Ok(HandlerResponse::Ignore),
        }
    }
}
