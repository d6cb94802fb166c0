//! Command endpoints

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::HandlerDeps;
use crate::core::error::AppResult;
use crate::storage::db;
use crate::telegram::{menu, Bot};
use crate::workflow;

/// Handles /start: resets the session, ensures the account row exists, and
/// shows the main menu.
pub async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> AppResult<()> {
    let chat_id = msg.chat.id;
    workflow::reset(&deps.sessions, chat_id);

    // Account creation is lazy elsewhere too; a failure here only delays it
    if let Err(e) = db::get_connection(&deps.db_pool).and_then(|conn| db::get_or_create_account(&conn, chat_id.0)) {
        log::error!("Failed to ensure account for chat {}: {}", chat_id, e);
    }

    bot.send_message(chat_id, "Welcome! I keep a balance for you. Choose an option:")
        .reply_markup(menu::main_menu_keyboard())
        .await?;
    Ok(())
}
