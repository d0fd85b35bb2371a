//! Per-request greeting session: the orchestrator's state machine.
//!
//! `Idle → SendingPlaceholder → Streaming → Finalizing → Done | Failed`, plus
//! `SendingPlaceholder → Failed` when the placeholder cannot be sent. Any other move is a bug
//! and is reported as [`HandlerError::State`].

use greet_core::{Chat, HandlerError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    SendingPlaceholder,
    Streaming,
    Finalizing,
    Done,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Done | SessionState::Failed)
    }

    fn can_move_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, SendingPlaceholder)
                | (SendingPlaceholder, Streaming)
                | (SendingPlaceholder, Failed)
                | (Streaming, Finalizing)
                | (Finalizing, Done)
                | (Finalizing, Failed)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How the greeting reached the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Final edit of the placeholder succeeded.
    EditedPlaceholder,
    /// Final edit failed; the text went out as a new message.
    SentNew,
}

/// Result of one greeting request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Done { text: String, delivery: Delivery },
    /// Nothing was delivered; one generic notice was attempted.
    Failed,
}

/// State of one greeting request. Owned by a single task; never shared.
#[derive(Debug)]
pub struct GreetingSession {
    chat: Chat,
    state: SessionState,
    placeholder_id: Option<String>,
}

impl GreetingSession {
    pub fn new(chat: Chat) -> Self {
        Self {
            chat,
            state: SessionState::Idle,
            placeholder_id: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    pub fn placeholder_id(&self) -> Option<&str> {
        self.placeholder_id.as_deref()
    }

    pub fn advance(&mut self, next: SessionState) -> Result<()> {
        if !self.state.can_move_to(next) {
            return Err(HandlerError::State(format!(
                "invalid greeting session transition {} -> {}",
                self.state, next
            ))
            .into());
        }
        tracing::debug!(chat_id = self.chat.id, from = %self.state, to = %next, "Session transition");
        self.state = next;
        Ok(())
    }

    /// Records the placeholder's message id. Set once, while sending the placeholder.
    pub fn set_placeholder(&mut self, message_id: String) -> Result<()> {
        if self.state != SessionState::SendingPlaceholder || self.placeholder_id.is_some() {
            return Err(HandlerError::State(format!(
                "placeholder id set in state {}",
                self.state
            ))
            .into());
        }
        self.placeholder_id = Some(message_id);
        Ok(())
    }
}
