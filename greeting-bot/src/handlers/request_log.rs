//! First handler in the chain: one structured line per inbound message saying what kind of
//! greeting trigger it is, and one per outcome.

use async_trait::async_trait;
use greet_core::{Handler, HandlerResponse, Message, Result};
use prompt::GreetingRequest;
use tracing::{debug, info};

/// How an inbound message relates to greeting generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// `/greet` or `/greet@bot`, with or without arguments.
    Greet,
    /// Any other slash command, name without the leading '/' or `@bot` suffix.
    Command(String),
    /// Plain text in a private chat; treated as a greeting request.
    PrivateText,
    /// Plain text in a group; never answered.
    GroupChatter,
    Empty,
}

impl Trigger {
    pub fn classify(message: &Message) -> Self {
        let text = message.content.trim();
        if text.is_empty() {
            return Trigger::Empty;
        }
        if let Some(rest) = text.strip_prefix('/') {
            let word = rest.split_whitespace().next().unwrap_or_default();
            let name = word.split('@').next().unwrap_or_default().to_lowercase();
            return if name == "greet" {
                Trigger::Greet
            } else {
                Trigger::Command(name)
            };
        }
        if message.chat.is_private() {
            Trigger::PrivateText
        } else {
            Trigger::GroupChatter
        }
    }

    fn label(&self) -> &str {
        match self {
            Trigger::Greet => "greet_command",
            Trigger::Command(name) => name.as_str(),
            Trigger::PrivateText => "private_text",
            Trigger::GroupChatter => "group_chatter",
            Trigger::Empty => "empty",
        }
    }
}

/// Recipient a greeting trigger names, if it names one.
fn requested_recipient(message: &Message, trigger: &Trigger) -> Option<String> {
    let text = message.content.trim();
    let args = match trigger {
        Trigger::Greet => text.split_once(char::is_whitespace).map(|(_, a)| a)?,
        Trigger::PrivateText => text,
        _ => return None,
    };
    GreetingRequest::parse(args, None).map(|r| r.recipient)
}

/// Logs the trigger in before() and the outcome in after(); never stops the chain.
pub struct RequestLogHandler;

#[async_trait]
impl Handler for RequestLogHandler {
    async fn before(&self, message: &Message) -> Result<bool> {
        let trigger = Trigger::classify(message);
        let recipient = requested_recipient(message, &trigger);
        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            chat_type = %message.chat.chat_type,
            trigger = trigger.label(),
            recipient = recipient.as_deref().unwrap_or("-"),
            text_len = message.content.len(),
            "Inbound message"
        );
        Ok(true)
    }

    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        match response {
            HandlerResponse::Reply(text) => info!(
                chat_id = message.chat.id,
                message_id = %message.id,
                reply_len = text.len(),
                "Reply delivered"
            ),
            HandlerResponse::Stop => info!(
                chat_id = message.chat.id,
                message_id = %message.id,
                "Request ended without a greeting"
            ),
            other => debug!(chat_id = message.chat.id, response = ?other, "No handler answered"),
        }
        Ok(())
    }
}
