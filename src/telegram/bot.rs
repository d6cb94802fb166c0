//! Bot initialization and command definitions

use teloxide::prelude::*;
use teloxide::types::{ChatKind, Message};
use teloxide::utils::command::BotCommands;

use crate::telegram::Bot;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "I can:")]
pub enum Command {
    #[command(description = "show the main menu")]
    Start,
    #[command(description = "show your balance and last transaction")]
    Balance,
    #[command(description = "start a deposit")]
    Deposit,
    #[command(description = "start a withdrawal")]
    Withdraw,
    #[command(description = "cancel the transaction in progress")]
    Cancel,
}

/// Creates a Bot instance with custom or default API URL
///
/// The token comes from TELOXIDE_TOKEN; BOT_API_URL optionally points the bot
/// at a local Bot API server.
pub fn create_bot() -> anyhow::Result<Bot> {
    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        Bot::from_env().set_api_url(url)
    } else {
        Bot::from_env()
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "show the main menu"),
        BotCommand::new("balance", "show your balance and last transaction"),
        BotCommand::new("deposit", "start a deposit"),
        BotCommand::new("withdraw", "start a withdrawal"),
        BotCommand::new("cancel", "cancel the transaction in progress"),
    ])
    .await?;

    Ok(())
}

/// Checks whether a message is plain private-chat text eligible for amount
/// capture (commands are consumed by the command branch before this runs).
pub fn is_private_text_message(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
        && msg.text().map(|text| !text.starts_with('/')).unwrap_or(false)
}
