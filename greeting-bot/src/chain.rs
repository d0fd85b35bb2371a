//! # Handler chain
//!
//! Runs a sequence of handlers for one inbound message: all `before` in order (any false stops
//! the chain), then `handle` until one returns Stop or Reply, then all `after` in reverse with
//! the final response.

use greet_core::{Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Chain of handlers: before (all) → handle (until Stop/Reply) → after (reverse).
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

/// Last path segment of the handler's type name, for logs.
fn handler_name(h: &dyn Handler) -> &'static str {
    let full = std::any::type_name_of_val(h);
    full.rsplit("::").next().unwrap_or(full)
}

fn response_kind(response: &HandlerResponse) -> (&'static str, Option<usize>) {
    match response {
        HandlerResponse::Continue => ("Continue", None),
        HandlerResponse::Stop => ("Stop", None),
        HandlerResponse::Ignore => ("Ignore", None),
        HandlerResponse::Reply(s) => ("Reply", Some(s.len())),
    }
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler.
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs all before → handle until Stop/Reply → all after in reverse. An error from any
    /// phase ends the run and is returned.
    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    pub async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        info!(message_id = %message.id, handlers = self.handlers.len(), "step: handler_chain started");

        for h in &self.handlers {
            let name = handler_name(h.as_ref());
            if !h.before(message).await? {
                info!(handler = %name, "step: before returned false, chain stopped");
                return Ok(HandlerResponse::Stop);
            }
            debug!(handler = %name, "step: handler before done");
        }

        let mut final_response = HandlerResponse::Continue;
        for h in &self.handlers {
            let name = handler_name(h.as_ref());
            let response = h.handle(message).await?;
            let (response_type, reply_len) = response_kind(&response);
            info!(
                handler = %name,
                response_type = %response_type,
                reply_len = ?reply_len,
                "step: handler handle done"
            );

            if matches!(response, HandlerResponse::Stop | HandlerResponse::Reply(_)) {
                final_response = response;
                break;
            }
        }

        for h in self.handlers.iter().rev() {
            h.after(message, &final_response).await?;
            debug!(handler = %handler_name(h.as_ref()), "step: handler after done");
        }

        let (response_type, _) = response_kind(&final_response);
        info!(
            message_id = %message.id,
            response_type = %response_type,
            "step: handler_chain finished"
        );
        Ok(final_response)
    }
}
