//! Component factory: builds BotComponents from config and assembles the handler chain.

use anyhow::{Context, Result};
use greet_core::Bot;
use image_generation_client::{ImageGenerationClient, ImageGenerator};
use llm_client::{ChunkSource, LlmChunkSource, LlmClient, OpenAILlmClient};
use song_generation_client::{SongGenerationClient, SongGenerator};
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::chain::HandlerChain;
use crate::config::{AppExtensions, BotConfig};
use crate::handlers::{
    AllowlistHandler, CommandHandler, GreetingHandler, ImageCardFlow, RequestLogHandler, SongFlow,
};
use crate::telegram::TelegramBotAdapter;
use crate::BotUsername;

/// Runtime dependencies produced from config. Fields are public so tests can swap any of them.
#[derive(Clone)]
pub struct BotComponents {
    pub teloxide_bot: teloxide::Bot,
    /// Outbound channel used by handlers.
    pub bot: Arc<dyn Bot>,
    pub bot_username: BotUsername,
    pub chunk_source: Arc<dyn ChunkSource>,
    /// Set when the image card sub-flow is enabled.
    pub image_generator: Option<Arc<dyn ImageGenerator>>,
    /// Set when the song sub-flow is enabled.
    pub song_generator: Option<Arc<dyn SongGenerator>>,
}

/// teloxide Bot for `token`, pointed at `api_url` when given (local Bot API server, tests).
pub fn build_teloxide_bot(token: &str, api_url: Option<&str>) -> teloxide::Bot {
    let bot = teloxide::Bot::new(token);
    match api_url {
        Some(url_str) => match reqwest::Url::parse(url_str) {
            Ok(url) => bot.set_api_url(url),
            Err(e) => {
                error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                bot
            }
        },
        None => bot,
    }
}

#[instrument(skip(config))]
pub fn build_bot_components(config: &BotConfig) -> Result<BotComponents> {
    let teloxide_bot = build_teloxide_bot(config.bot_token(), config.telegram_api_url());
    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));

    let llm_config = config.extensions().llm_config();
    let llm_client: Arc<dyn LlmClient> = Arc::new(OpenAILlmClient::from_config(llm_config));
    let chunk_source: Arc<dyn ChunkSource> = Arc::new(
        LlmChunkSource::new(llm_client, llm_config.greeting_fallback_text.clone())
            .with_timeout(llm_config.generation_timeout),
    );
    info!(model = %llm_config.llm_model, "Greeting generator ready");

    let image_generator: Option<Arc<dyn ImageGenerator>> =
        config.extensions().image_card_config().map(|image| {
            info!(model = %image.model, "Image card enabled");
            Arc::new(
                ImageGenerationClient::new(
                    llm_config.openai_api_key.clone(),
                    llm_config.openai_base_url.clone(),
                )
                .with_model(image.model.clone()),
            ) as Arc<dyn ImageGenerator>
        });

    let song_generator: Option<Arc<dyn SongGenerator>> = match config.extensions().song_config() {
        Some(song) => {
            let url = song.api_url.clone().context("SONG_API_URL is required when SONG_ENABLED")?;
            let key = song.api_key.clone().context("SONG_API_KEY is required when SONG_ENABLED")?;
            let client = SongGenerationClient::new(url, key)
                .context("Failed to build song client")?
                .with_poll_interval(song.poll_interval)
                .with_max_poll(song.max_poll);
            info!("Song enabled");
            Some(Arc::new(client))
        }
        None => None,
    };

    Ok(BotComponents {
        teloxide_bot,
        bot,
        bot_username: Arc::new(tokio::sync::RwLock::new(None)),
        chunk_source,
        image_generator,
        song_generator,
    })
}

/// Builds the handler chain: logging → allowlist (when configured) → commands → greeting.
pub fn build_handler_chain(config: &BotConfig, components: &BotComponents) -> HandlerChain {
    let base = config.base();
    let mut greeting = GreetingHandler::new(
        components.bot.clone(),
        components.chunk_source.clone(),
        base.throttle_config(),
        base.placeholder_message.clone(),
        components.bot_username.clone(),
    );
    if let (Some(generator), Some(image)) = (
        components.image_generator.clone(),
        config.extensions().image_card_config(),
    ) {
        greeting = greeting.with_sub_flow(Arc::new(ImageCardFlow::new(
            components.bot.clone(),
            generator,
            image.timeout,
        )));
    }
    if let Some(generator) = components.song_generator.clone() {
        greeting = greeting.with_sub_flow(Arc::new(SongFlow::new(components.bot.clone(), generator)));
    }

    let mut chain = HandlerChain::new().add_handler(Arc::new(RequestLogHandler));
    if !base.allowed_user_ids.is_empty() {
        chain = chain.add_handler(Arc::new(AllowlistHandler::new(
            base.allowed_user_ids.iter().copied(),
        )));
    }
    chain
        .add_handler(Arc::new(CommandHandler::new(
            components.bot.clone(),
            components.bot_username.clone(),
        )))
        .add_handler(Arc::new(greeting))
}
