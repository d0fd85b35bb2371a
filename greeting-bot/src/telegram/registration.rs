//! Webhook registration with Telegram: set (with secret and command menu), delete, inspect.

use anyhow::{Context, Result};
use reqwest::Url;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::info;

use super::commands::Command;

/// Registers `url` as the webhook. Publishes the command menu afterwards.
pub async fn set_webhook(
    bot: &teloxide::Bot,
    url: &str,
    secret: Option<&str>,
    drop_pending_updates: bool,
) -> Result<()> {
    let url = Url::parse(url).with_context(|| format!("Invalid webhook URL: {}", url))?;
    let mut request = bot.set_webhook(url.clone());
    if let Some(secret) = secret {
        request = request.secret_token(secret.to_string());
    }
    if drop_pending_updates {
        request = request.drop_pending_updates(true);
    }
    request.await.context("setWebhook failed")?;
    info!(url = %url, with_secret = secret.is_some(), drop_pending_updates, "Webhook set");

    bot.set_my_commands(Command::bot_commands())
        .await
        .context("setMyCommands failed")?;
    info!("Bot command menu published");
    Ok(())
}

pub async fn delete_webhook(bot: &teloxide::Bot, drop_pending_updates: bool) -> Result<()> {
    let mut request = bot.delete_webhook();
    if drop_pending_updates {
        request = request.drop_pending_updates(true);
    }
    request.await.context("deleteWebhook failed")?;
    info!(drop_pending_updates, "Webhook deleted");
    Ok(())
}

/// Human-readable summary of the current webhook registration.
pub async fn webhook_info(bot: &teloxide::Bot) -> Result<String> {
    let info = bot.get_webhook_info().await.context("getWebhookInfo failed")?;
    Ok(format!("{:#?}", info))
}
