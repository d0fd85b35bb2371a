//! Song sub-flow: status message → song generation (polled by the client) → audio + status
//! update.

use async_trait::async_trait;
use greet_core::{Bot, Chat};
use prompt::{song_prompt, GreetingRequest};
use song_generation_client::{SongError, SongGenerator, SongRequest};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use super::sub_flow::{SubFlow, SubFlowOutcome};

pub const MSG_SONG_STATUS: &str = "🎵 Composing a greeting song, this can take a few minutes...";
pub const MSG_SONG_DONE: &str = "🎵 Your greeting song is ready!";
pub const MSG_SONG_FAILED: &str = "🎵 Sorry, the greeting song could not be created this time.";
pub const MSG_SONG_TIMEOUT: &str = "🎵 Sorry, the greeting song took too long. Please try again later.";

pub struct SongFlow {
    bot: Arc<dyn Bot>,
    generator: Arc<dyn SongGenerator>,
}

impl SongFlow {
    pub fn new(bot: Arc<dyn Bot>, generator: Arc<dyn SongGenerator>) -> Self {
        Self { bot, generator }
    }

    async fn update_status(&self, chat: &Chat, status_id: &str, text: &str) {
        if let Err(e) = self.bot.edit_message(chat, status_id, text).await {
            warn!(error = %e, chat_id = chat.id, "Failed to update song status");
        }
    }
}

#[async_trait]
impl SubFlow for SongFlow {
    fn name(&self) -> &'static str {
        "song"
    }

    #[instrument(skip(self, chat, request, greeting), fields(chat_id = chat.id))]
    async fn run(&self, chat: &Chat, request: &GreetingRequest, greeting: &str) -> SubFlowOutcome {
        let status_id = match self.bot.send_message_and_return_id(chat, MSG_SONG_STATUS).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Song status message failed; skipping song");
                return SubFlowOutcome::Failed;
            }
        };

        let start = Instant::now();
        let prompt = song_prompt(request, greeting);
        let song_request = SongRequest {
            title: prompt.title,
            lyrics: prompt.lyrics,
            tags: prompt.tags,
        };

        let song = match self.generator.generate_song(&song_request).await {
            Ok(song) => song,
            Err(e) => {
                warn!(error = %e, elapsed_ms = start.elapsed().as_millis() as u64, "Song generation failed");
                let notice = match e {
                    SongError::Timeout { .. } => MSG_SONG_TIMEOUT,
                    _ => MSG_SONG_FAILED,
                };
                self.update_status(chat, &status_id, notice).await;
                return SubFlowOutcome::Failed;
            }
        };

        let title = song.title.as_deref().unwrap_or(&song_request.title);
        if let Err(e) = self.bot.send_audio(chat, &song.audio_url, Some(title)).await {
            warn!(error = %e, audio_url = %song.audio_url, "Sending song failed");
            self.update_status(chat, &status_id, MSG_SONG_FAILED).await;
            return SubFlowOutcome::Failed;
        }

        self.update_status(chat, &status_id, MSG_SONG_DONE).await;
        info!(
            song_id = %song.id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Song delivered"
        );
        SubFlowOutcome::Delivered
    }
}
