//! Follow-up deliveries after a greeting is done (image card, song).
//!
//! Each sub-flow posts its own status message, waits for its generator, then delivers media and
//! updates the status. Failures only touch that status message; the greeting stays as delivered.

use async_trait::async_trait;
use greet_core::Chat;
use prompt::GreetingRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubFlowOutcome {
    Delivered,
    Failed,
}

#[async_trait]
pub trait SubFlow: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Runs the sub-flow for a delivered `greeting`. Never fails the request.
    async fn run(&self, chat: &Chat, request: &GreetingRequest, greeting: &str) -> SubFlowOutcome;
}
