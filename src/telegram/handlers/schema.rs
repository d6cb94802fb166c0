//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::callbacks::handle_menu_callback;
use super::commands::handle_start_command;
use super::messages::handle_amount_message;
use super::types::{HandlerDeps, HandlerError};
use crate::core::types::TxKind;
use crate::telegram::bot::{is_private_text_message, Command};
use crate::telegram::{menu, Bot};
use crate::workflow;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// This function returns a handler tree that can be used with teloxide's
/// Dispatcher. The same schema is used in production and in integration
/// tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callbacks = deps;

    dptree::entry()
        // Command handler must come first so free text never shadows commands
        .branch(command_handler(deps_commands))
        // Amount capture for plain text in private chats
        .branch(message_handler(deps_messages))
        // Callback query handler for menu and confirmation buttons
        .branch(callback_handler(deps_callbacks))
}

/// Handler for bot commands (/start, /balance, /deposit, /withdraw, /cancel)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);
                let chat_id = msg.chat.id;

                match cmd {
                    Command::Start => {
                        handle_start_command(&bot, &msg, &deps).await?;
                    }
                    Command::Balance => {
                        menu::show_balance(&bot, chat_id, &deps.db_pool).await?;
                    }
                    Command::Deposit => {
                        let reply = workflow::start(&deps.sessions, chat_id, TxKind::Deposit);
                        menu::send_workflow_reply(&bot, chat_id, &reply).await?;
                    }
                    Command::Withdraw => {
                        let reply = workflow::start(&deps.sessions, chat_id, TxKind::Withdraw);
                        menu::send_workflow_reply(&bot, chat_id, &reply).await?;
                    }
                    Command::Cancel => {
                        let reply = workflow::cancel(&deps.sessions, chat_id);
                        menu::send_workflow_reply(&bot, chat_id, &reply).await?;
                    }
                }
                Ok(())
            }
        },
    ))
}

/// Handler for plain text messages (amount capture)
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| is_private_text_message(&msg))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                handle_amount_message(&bot, &msg, &deps).await?;
                Ok(())
            }
        })
}

/// Handler for callback queries (inline keyboard buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let result: teloxide::RequestError = match handle_menu_callback(bot, q, deps).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };
            Err(Box::new(result) as HandlerError)
        }
    })
}
