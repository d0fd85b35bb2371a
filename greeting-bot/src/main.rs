//! Binary for the greeting bot.

use anyhow::Result;
use clap::Parser;
use greeting_bot::{cli, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    cli::run(Cli::parse()).await
}
