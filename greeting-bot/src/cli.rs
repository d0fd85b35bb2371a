//! CLI: serve the webhook, manage webhook registration. Config comes from env; `--token`
//! overrides BOT_TOKEN.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use greet_core::init_tracing;

use crate::components::build_teloxide_bot;
use crate::config::{BaseConfig, BotConfig};
use crate::telegram::registration;

#[derive(Parser)]
#[command(name = "greeting-bot")]
#[command(about = "Telegram greeting bot: webhook server and webhook management", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the webhook server.
    Serve {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Register WEBHOOK_URL + WEBHOOK_PATH with Telegram and publish the command menu.
    SetWebhook {
        #[arg(short, long)]
        token: Option<String>,
        /// Overrides WEBHOOK_URL + WEBHOOK_PATH.
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        drop_pending: bool,
    },
    /// Remove the webhook registration.
    DeleteWebhook {
        #[arg(short, long)]
        token: Option<String>,
        #[arg(long)]
        drop_pending: bool,
    },
    /// Print the current webhook registration.
    WebhookInfo {
        #[arg(short, long)]
        token: Option<String>,
    },
}

/// Loads the full config (Telegram + LLM + sub-flows). `token` overrides BOT_TOKEN.
pub fn load_config(token: Option<String>) -> Result<BotConfig> {
    BotConfig::load(token)
}

fn load_base(token: Option<String>) -> Result<(BaseConfig, teloxide::Bot)> {
    let base = BaseConfig::load(token)?;
    base.validate()?;
    init_tracing(&base.log_file)?;
    let bot = build_teloxide_bot(&base.bot_token, base.telegram_api_url.as_deref());
    Ok((base, bot))
}

/// Runs one CLI command to completion.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { token } => {
            let config = load_config(token)?;
            crate::runner::run_bot(config).await
        }
        Commands::SetWebhook {
            token,
            url,
            drop_pending,
        } => {
            let (base, bot) = load_base(token)?;
            let url = match url {
                Some(url) => url,
                None => base
                    .public_webhook_url()
                    .context("WEBHOOK_URL not set and --url not given")?,
            };
            registration::set_webhook(&bot, &url, base.webhook_secret.as_deref(), drop_pending)
                .await?;
            println!("Webhook set: {}", url);
            Ok(())
        }
        Commands::DeleteWebhook {
            token,
            drop_pending,
        } => {
            let (_, bot) = load_base(token)?;
            registration::delete_webhook(&bot, drop_pending).await?;
            println!("Webhook deleted");
            Ok(())
        }
        Commands::WebhookInfo { token } => {
            let (_, bot) = load_base(token)?;
            println!("{}", registration::webhook_info(&bot).await?);
            Ok(())
        }
    }
}
