//! Access control from `ALLOWED_USER_IDS`.
//!
//! An entry admits either a sender (positive user id) or a whole group chat (Telegram group ids
//! are negative). An empty list admits everyone.

use async_trait::async_trait;
use greet_core::{Handler, HandlerError, Message, Result};
use std::collections::HashSet;
use tracing::warn;

pub struct AllowlistHandler {
    allowed: HashSet<i64>,
}

impl AllowlistHandler {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allowed: ids.into_iter().collect(),
        }
    }

    pub fn admits(&self, message: &Message) -> bool {
        self.allowed.is_empty()
            || self.allowed.contains(&message.user.id)
            || (!message.chat.is_private() && self.allowed.contains(&message.chat.id))
    }
}

#[async_trait]
impl Handler for AllowlistHandler {
    async fn before(&self, message: &Message) -> Result<bool> {
        if self.admits(message) {
            return Ok(true);
        }
        warn!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            chat_type = %message.chat.chat_type,
            "Sender not on allowlist; no greeting"
        );
        Err(HandlerError::Unauthorized.into())
    }
}
