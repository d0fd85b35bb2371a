//! Image card sub-flow: status message → image generation (bounded) → photo + status update.

use async_trait::async_trait;
use greet_core::{Bot, Chat};
use image_generation_client::ImageGenerator;
use prompt::{image_card_prompt, GreetingRequest};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

use super::sub_flow::{SubFlow, SubFlowOutcome};

pub const MSG_IMAGE_STATUS: &str = "🎨 Painting a greeting card...";
pub const MSG_IMAGE_DONE: &str = "🎨 Your greeting card is ready!";
pub const MSG_IMAGE_FAILED: &str = "🎨 Sorry, the greeting card could not be created this time.";

pub struct ImageCardFlow {
    bot: Arc<dyn Bot>,
    generator: Arc<dyn ImageGenerator>,
    timeout: Duration,
}

impl ImageCardFlow {
    pub fn new(bot: Arc<dyn Bot>, generator: Arc<dyn ImageGenerator>, timeout: Duration) -> Self {
        Self {
            bot,
            generator,
            timeout,
        }
    }

    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        match tokio::time::timeout(self.timeout, self.generator.generate_image(prompt)).await {
            Ok(result) => result,
            Err(_) => anyhow::bail!("image generation timed out after {}s", self.timeout.as_secs()),
        }
    }

    async fn update_status(&self, chat: &Chat, status_id: &str, text: &str) {
        if let Err(e) = self.bot.edit_message(chat, status_id, text).await {
            warn!(error = %e, chat_id = chat.id, "Failed to update image card status");
        }
    }
}

#[async_trait]
impl SubFlow for ImageCardFlow {
    fn name(&self) -> &'static str {
        "image_card"
    }

    #[instrument(skip(self, chat, request, greeting), fields(chat_id = chat.id))]
    async fn run(&self, chat: &Chat, request: &GreetingRequest, greeting: &str) -> SubFlowOutcome {
        let status_id = match self.bot.send_message_and_return_id(chat, MSG_IMAGE_STATUS).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Image card status message failed; skipping image card");
                return SubFlowOutcome::Failed;
            }
        };

        let start = Instant::now();
        let prompt = image_card_prompt(request, greeting);
        let url = match self.generate(&prompt).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, elapsed_ms = start.elapsed().as_millis() as u64, "Image card generation failed");
                self.update_status(chat, &status_id, MSG_IMAGE_FAILED).await;
                return SubFlowOutcome::Failed;
            }
        };

        let caption = format!("For {}", request.recipient);
        if let Err(e) = self.bot.send_photo(chat, &url, Some(&caption)).await {
            warn!(error = %e, image_url = %url, "Sending image card failed");
            self.update_status(chat, &status_id, MSG_IMAGE_FAILED).await;
            return SubFlowOutcome::Failed;
        }

        self.update_status(chat, &status_id, MSG_IMAGE_DONE).await;
        info!(elapsed_ms = start.elapsed().as_millis() as u64, "Image card delivered");
        SubFlowOutcome::Delivered
    }
}
