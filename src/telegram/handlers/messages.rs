//! Free-text endpoint: amount capture for an active deposit/withdraw flow

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::HandlerDeps;
use crate::core::error::AppResult;
use crate::telegram::{menu, Bot};
use crate::workflow;

/// Routes a text message into the amount-capture step of the workflow.
///
/// Storage failures reset the session to idle and surface a generic failure
/// message so the user can retry cleanly.
pub async fn handle_amount_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> AppResult<()> {
    let chat_id = msg.chat.id;
    let Some(text) = msg.text() else {
        return Ok(());
    };

    match workflow::submit_amount(&deps.sessions, &deps.db_pool, chat_id, text) {
        Ok(reply) => {
            menu::send_workflow_reply(bot, chat_id, &reply).await?;
        }
        Err(e) => {
            log::error!("chat {}: storage error during amount capture: {}", chat_id, e);
            workflow::reset(&deps.sessions, chat_id);
            bot.send_message(chat_id, menu::GENERIC_FAILURE)
                .reply_markup(menu::main_menu_keyboard())
                .await?;
        }
    }
    Ok(())
}
