//! # greet-core
//!
//! Core types and traits for the greeting bot: [`Bot`] (outbound channel), [`Handler`], message
//! and user types, errors, and tracing initialization. Transport-agnostic; the Telegram adapter
//! lives in `greeting-bot`.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{parse_message_id, Bot};
pub use error::{GreetError, HandlerError, Result};
pub use logger::init_tracing;
pub use types::{Chat, Handler, HandlerResponse, Message, ToCoreMessage, ToCoreUser, User};
