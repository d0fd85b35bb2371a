//! Process entry: validate config, init logging, build components, discover the bot username,
//! then serve the webhook until Ctrl-C.

use anyhow::{Context, Result};
use axum::Router;
use greet_core::init_tracing;
use std::future::Future;
use std::net::SocketAddr;
use teloxide::prelude::*;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::components::{build_bot_components, build_handler_chain};
use crate::config::BotConfig;
use crate::telegram::{router, WebhookState};
use crate::BotUsername;

/// Reads the bot username via getMe so `/greet@botname` parses in groups. Failure is not fatal.
pub async fn discover_bot_username(bot: &teloxide::Bot, bot_username: &BotUsername) {
    match bot.get_me().await {
        Ok(me) => {
            if let Some(username) = &me.user.username {
                *bot_username.write().await = Some(username.clone());
                info!(username = %username, "Bot username set");
            }
        }
        Err(e) => warn!(error = %e, "getMe failed; commands addressed as /cmd@bot will be ignored"),
    }
}

/// Serves `app` on `listener` until `shutdown` resolves.
pub async fn serve<S>(listener: TcpListener, app: Router, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no local address")?;
    info!(addr = %addr, "Webhook server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("webhook server failed")?;
    info!("Webhook server stopped");
    Ok(())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Main entry: validate config, init logging, build components and chain, serve the webhook.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file())?;

    let base = config.base();
    info!(
        webhook_path = %base.webhook_path,
        edit_interval_ms = base.edit_interval.as_millis() as u64,
        image_card = config.extensions.image_card.enabled,
        song = config.extensions.song.enabled,
        "Initializing bot"
    );

    let components = build_bot_components(&config)?;
    discover_bot_username(&components.teloxide_bot, &components.bot_username).await;
    let chain = build_handler_chain(&config, &components);

    let addr: SocketAddr = base
        .webhook_listen_addr
        .parse()
        .with_context(|| format!("Invalid WEBHOOK_LISTEN_ADDR: {}", base.webhook_listen_addr))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let state = WebhookState::new(chain, base.webhook_secret.clone());
    info!("Bot started successfully");
    serve(listener, router(state, &base.webhook_path), ctrl_c()).await
}
