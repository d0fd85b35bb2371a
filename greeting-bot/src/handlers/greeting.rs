//! Greeting handler: the request orchestrator.
//!
//! For one inbound request it sends a placeholder, streams the generated greeting into it
//! through a [`StreamEditor`], and finalizes:
//!
//! 1. Final edit succeeds → Done.
//! 2. Final edit fails → send the text as a new message → Done.
//! 3. That fails too → Failed, one generic notice, no more retries.
//!
//! On Done the configured sub-flows (image card, song) run one after another.
//!
//! **External interactions:** Bot trait (send/edit), ChunkSource (generation), sub-flows.

use async_trait::async_trait;
use greet_core::{Bot, Chat, Handler, HandlerResponse, Message, Result};
use llm_client::ChunkSource;
use prompt::{greeting_messages, GreetingRequest};
use std::sync::Arc;
use std::time::Instant;
use stream_edit::{EditTarget, StreamEditor, ThrottleConfig};
use tracing::{error, info, instrument, warn};

use super::command::MSG_GREET_USAGE;
use super::session::{Delivery, FlowOutcome, GreetingSession, SessionState};
use super::sub_flow::SubFlow;
use crate::telegram::{parse_command, Command};
use crate::BotUsername;

/// The only failure text users ever see for a greeting.
pub const MSG_GENERIC_FAILURE: &str =
    "Sorry, something went wrong while writing your greeting. Please try again later.";

#[derive(Clone)]
pub struct GreetingHandler {
    bot: Arc<dyn Bot>,
    source: Arc<dyn ChunkSource>,
    throttle: ThrottleConfig,
    placeholder: String,
    bot_username: BotUsername,
    sub_flows: Vec<Arc<dyn SubFlow>>,
}

impl GreetingHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        source: Arc<dyn ChunkSource>,
        throttle: ThrottleConfig,
        placeholder: impl Into<String>,
        bot_username: BotUsername,
    ) -> Self {
        Self {
            bot,
            source,
            throttle,
            placeholder: placeholder.into(),
            bot_username,
            sub_flows: Vec::new(),
        }
    }

    /// Appends a sub-flow run after each delivered greeting, in insertion order.
    pub fn with_sub_flow(mut self, flow: Arc<dyn SubFlow>) -> Self {
        self.sub_flows.push(flow);
        self
    }

    /// Text of the greeting request carried by `message`, if any: `/greet` arguments anywhere,
    /// any plain text in private chats.
    async fn request_text(&self, message: &Message) -> Option<String> {
        let text = message.content.trim();
        if text.is_empty() {
            return None;
        }
        if text.starts_with('/') {
            let username = self.bot_username.read().await.clone();
            return match parse_command(text, username.as_deref()) {
                Some(Command::Greet(args)) if !args.trim().is_empty() => Some(args),
                _ => None,
            };
        }
        if message.chat.is_private() {
            Some(text.to_string())
        } else {
            None
        }
    }

    async fn send_failure_notice(&self, chat: &Chat) {
        if let Err(e) = self.bot.send_message(chat, MSG_GENERIC_FAILURE).await {
            error!(error = %e, chat_id = chat.id, "Failure notice could not be sent");
        }
    }

    /// Runs one greeting request from placeholder to Done or Failed.
    #[instrument(skip(self, chat, request), fields(chat_id = chat.id, recipient = %request.recipient))]
    pub async fn run_greeting(&self, chat: &Chat, request: &GreetingRequest) -> Result<FlowOutcome> {
        let start = Instant::now();
        let mut session = GreetingSession::new(chat.clone());

        session.advance(SessionState::SendingPlaceholder)?;
        let placeholder_id = match self
            .bot
            .send_message_and_return_id(chat, &self.placeholder)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "Placeholder send failed");
                session.advance(SessionState::Failed)?;
                self.send_failure_notice(chat).await;
                return Ok(FlowOutcome::Failed);
            }
        };
        session.set_placeholder(placeholder_id.clone())?;
        info!(message_id = %placeholder_id, "step: placeholder sent");

        session.advance(SessionState::Streaming)?;
        let editor = StreamEditor::spawn(
            self.bot.clone(),
            EditTarget::new(chat.clone(), placeholder_id),
            self.throttle.clone(),
        );
        let sender = editor.chunk_sender();
        let mut on_chunk = move |text: String| sender.send(text);
        let completion = self
            .source
            .stream_greeting(greeting_messages(request), &mut on_chunk)
            .await;
        drop(on_chunk);

        session.advance(SessionState::Finalizing)?;
        let final_edit = editor.finish(completion.clone()).await;
        let delivery = match final_edit {
            Ok(()) => Delivery::EditedPlaceholder,
            Err(edit_err) => {
                warn!(error = %edit_err, "Final edit failed; sending greeting as a new message");
                match self.bot.send_message(chat, &completion).await {
                    Ok(()) => Delivery::SentNew,
                    Err(send_err) => {
                        error!(
                            edit_error = %edit_err,
                            send_error = %send_err,
                            "Greeting could not be delivered"
                        );
                        session.advance(SessionState::Failed)?;
                        self.send_failure_notice(chat).await;
                        return Ok(FlowOutcome::Failed);
                    }
                }
            }
        };

        session.advance(SessionState::Done)?;
        info!(
            delivery = ?delivery,
            reply_len = completion.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "step: greeting delivered"
        );
        Ok(FlowOutcome::Done {
            text: completion,
            delivery,
        })
    }

    async fn run_sub_flows(&self, chat: &Chat, request: &GreetingRequest, greeting: &str) {
        for flow in &self.sub_flows {
            let outcome = flow.run(chat, request, greeting).await;
            info!(sub_flow = flow.name(), outcome = ?outcome, "step: sub-flow finished");
        }
    }
}

#[async_trait]
impl Handler for GreetingHandler {
    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(text) = self.request_text(message).await else {
            return Ok(HandlerResponse::Continue);
        };
        let sender = message.user.display_name();
        let Some(request) = GreetingRequest::parse(&text, sender.as_deref()) else {
            self.bot.send_message(&message.chat, MSG_GREET_USAGE).await?;
            return Ok(HandlerResponse::Reply(MSG_GREET_USAGE.to_string()));
        };

        match self.run_greeting(&message.chat, &request).await? {
            FlowOutcome::Done { text, .. } => {
                self.run_sub_flows(&message.chat, &request, &text).await;
                Ok(HandlerResponse::Reply(text))
            }
            FlowOutcome::Failed => Ok(HandlerResponse::Stop),
        }
    }
}
