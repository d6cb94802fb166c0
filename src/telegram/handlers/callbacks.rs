//! Callback-query endpoint: routes inline button presses into the workflow

use teloxide::prelude::*;

use super::types::HandlerDeps;
use crate::core::types::TxKind;
use crate::telegram::{menu, Bot};
use crate::workflow;

/// Handles callback queries from the menu and confirmation keyboards.
pub async fn handle_menu_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> ResponseResult<()> {
    // Always answer so the client stops its spinner, even for stale buttons
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(data) = q.data else {
        return Ok(());
    };
    let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
        log::warn!("Callback {:?} without an originating message", data);
        return Ok(());
    };

    match data.as_str() {
        "menu:balance" => {
            menu::show_balance(&bot, chat_id, &deps.db_pool).await?;
        }
        "menu:deposit" => {
            let reply = workflow::start(&deps.sessions, chat_id, TxKind::Deposit);
            menu::send_workflow_reply(&bot, chat_id, &reply).await?;
        }
        "menu:withdraw" => {
            let reply = workflow::start(&deps.sessions, chat_id, TxKind::Withdraw);
            menu::send_workflow_reply(&bot, chat_id, &reply).await?;
        }
        "menu:main" => {
            workflow::reset(&deps.sessions, chat_id);
            menu::show_main_menu(&bot, chat_id).await?;
        }
        "tx:confirm" => match workflow::confirm(&deps.sessions, &deps.db_pool, chat_id) {
            Ok(reply) => {
                menu::send_workflow_reply(&bot, chat_id, &reply).await?;
            }
            Err(e) => {
                log::error!("chat {}: storage error during commit: {}", chat_id, e);
                workflow::reset(&deps.sessions, chat_id);
                bot.send_message(chat_id, menu::GENERIC_FAILURE)
                    .reply_markup(menu::main_menu_keyboard())
                    .await?;
            }
        },
        "tx:cancel" => {
            let reply = workflow::cancel(&deps.sessions, chat_id);
            menu::send_workflow_reply(&bot, chat_id, &reply).await?;
        }
        other => {
            log::warn!("Unknown callback action: {}", other);
        }
    }

    Ok(())
}
