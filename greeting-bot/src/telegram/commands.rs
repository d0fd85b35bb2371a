//! Bot commands: `/start`, `/help`, `/greet <recipient | occasion | style>`.

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Greeting bot commands:")]
pub enum Command {
    #[command(description = "Start the bot and see how it works")]
    Start,
    #[command(description = "Show usage")]
    Help,
    #[command(description = "Write a greeting: /greet Anna | birthday | funny")]
    Greet(String),
}

/// Parses `text` as a command addressed to this bot. `bot_username` (without `@`) enables
/// `/greet@botname` in groups; commands addressed to another bot return None.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<Command> {
    if !text.trim_start().starts_with('/') {
        return None;
    }
    Command::parse(text.trim(), bot_username.unwrap_or("")).ok()
}

/// Help text listing all commands, for `/help` and unknown commands.
pub fn help_text() -> String {
    Command::descriptions().to_string()
}
