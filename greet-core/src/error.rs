//! Error types for the bot core.
//!
//! [`GreetError`] is what transport and handler code returns; [`HandlerError`] covers failures
//! raised inside the handler chain.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GreetError {
    /// Telegram transport failure (send/edit/media), carries the API description.
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

#[derive(Error, Debug)]
pub enum HandlerError {
    /// Sender is not on the configured allowlist.
    #[error("Unauthorized access")]
    Unauthorized,

    /// Greeting session moved in an order the state machine forbids.
    #[error("State error: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, GreetError>;
