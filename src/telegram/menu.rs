//! Menu and reply rendering: keyboards, texts, and the balance view

use teloxide::prelude::*;
use teloxide::types::InlineKeyboardMarkup;

use crate::core::types::TxKind;
use crate::storage::db::{self, DbPool};
use crate::storage::Account;
use crate::telegram::{cb, Bot};
use crate::workflow::WorkflowReply;

/// Generic failure message for storage errors; details stay in the logs.
pub const GENERIC_FAILURE: &str = "Something went wrong on our side. Please try again.";

/// Main menu keyboard: balance plus the two transaction entry points.
pub fn main_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![cb("💰 Check balance", "menu:balance")],
        vec![cb("➕ Deposit", "menu:deposit"), cb("➖ Withdraw", "menu:withdraw")],
    ])
}

/// Confirm/cancel keyboard shown with a captured amount.
pub fn confirm_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![cb("✅ Confirm", "tx:confirm"), cb("❌ Cancel", "tx:cancel")],
        vec![cb("🏠 Main menu", "menu:main")],
    ])
}

/// Sends the main menu as a new message.
pub async fn show_main_menu(bot: &Bot, chat_id: ChatId) -> ResponseResult<Message> {
    bot.send_message(chat_id, "What would you like to do?")
        .reply_markup(main_menu_keyboard())
        .await
}

/// Fetches the account (creating it on first access) and sends the balance
/// view with the main menu attached.
pub async fn show_balance(bot: &Bot, chat_id: ChatId, db_pool: &DbPool) -> ResponseResult<Message> {
    let account = db::get_connection(db_pool).and_then(|conn| db::get_or_create_account(&conn, chat_id.0));
    match account {
        Ok(account) => {
            bot.send_message(chat_id, balance_text(&account))
                .reply_markup(main_menu_keyboard())
                .await
        }
        Err(e) => {
            log::error!("Failed to load account for chat {}: {}", chat_id, e);
            bot.send_message(chat_id, GENERIC_FAILURE).await
        }
    }
}

/// Balance view with the last transaction line when present.
pub fn balance_text(account: &Account) -> String {
    let mut text = format!("Your balance: {}", account.balance);
    if let Some(last) = &account.last_transaction {
        let verb = match last.kind {
            TxKind::Deposit => "deposited",
            TxKind::Withdraw => "withdrew",
        };
        text.push_str(&format!("\nLast transaction: {} {} on {}", verb, last.amount, last.at));
    } else {
        text.push_str("\nNo transactions yet.");
    }
    text
}

/// Text shown to the user for a workflow outcome.
pub fn reply_text(reply: &WorkflowReply) -> String {
    match reply {
        WorkflowReply::AmountPrompt(TxKind::Deposit) => {
            "How much would you like to deposit? Enter a whole number.".to_string()
        }
        WorkflowReply::AmountPrompt(TxKind::Withdraw) => {
            "How much would you like to withdraw? Enter a whole number.".to_string()
        }
        WorkflowReply::ConfirmationPrompt { kind, amount } => {
            format!("You are about to {} {}. Confirm?", kind, amount)
        }
        WorkflowReply::InvalidAmount => "Invalid amount. Please enter a positive whole number.".to_string(),
        WorkflowReply::InsufficientBalance { balance } => {
            format!("Insufficient balance: you have {} available.", balance)
        }
        WorkflowReply::Committed {
            kind: TxKind::Deposit,
            amount,
            balance,
        } => format!("Deposited {}. Your new balance is {}.", amount, balance),
        WorkflowReply::Committed {
            kind: TxKind::Withdraw,
            amount,
            balance,
        } => format!("Withdrew {}. Your new balance is {}.", amount, balance),
        WorkflowReply::Cancelled => "Transaction cancelled.".to_string(),
        WorkflowReply::NoPendingTransaction => {
            "No pending amount, please restart the flow from the menu.".to_string()
        }
        WorkflowReply::NoActiveFlow => "Use the menu to start a deposit or withdrawal.".to_string(),
    }
}

/// Keyboard attached to a workflow outcome, if any.
///
/// Prompts keep the flow going; terminal outcomes return the user to the
/// main menu. Amount prompts and validation errors carry no keyboard since
/// the next step is free-text input.
pub fn reply_keyboard(reply: &WorkflowReply) -> Option<InlineKeyboardMarkup> {
    match reply {
        WorkflowReply::ConfirmationPrompt { .. } => Some(confirm_keyboard()),
        WorkflowReply::Committed { .. }
        | WorkflowReply::Cancelled
        | WorkflowReply::NoPendingTransaction
        | WorkflowReply::NoActiveFlow => Some(main_menu_keyboard()),
        WorkflowReply::AmountPrompt(_) | WorkflowReply::InvalidAmount | WorkflowReply::InsufficientBalance { .. } => {
            None
        }
    }
}

/// Sends the rendered reply for a workflow outcome.
pub async fn send_workflow_reply(bot: &Bot, chat_id: ChatId, reply: &WorkflowReply) -> ResponseResult<Message> {
    let request = bot.send_message(chat_id, reply_text(reply));
    match reply_keyboard(reply) {
        Some(keyboard) => request.reply_markup(keyboard).await,
        None => request.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LastTransaction;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_main_menu_has_three_actions() {
        let keyboard = main_menu_keyboard();
        let buttons: Vec<_> = keyboard.inline_keyboard.iter().flatten().collect();
        assert_eq!(buttons.len(), 3);
    }

    #[test]
    fn test_balance_text_without_transactions() {
        let account = Account {
            telegram_id: 1,
            balance: 0,
            last_transaction: None,
        };
        let text = balance_text(&account);
        assert!(text.contains("Your balance: 0"));
        assert!(text.contains("No transactions yet"));
    }

    #[test]
    fn test_balance_text_with_last_transaction() {
        let account = Account {
            telegram_id: 1,
            balance: 150,
            last_transaction: Some(LastTransaction {
                amount: 50,
                kind: TxKind::Deposit,
                at: "2026-01-01T00:00:00+00:00".to_string(),
            }),
        };
        let text = balance_text(&account);
        assert!(text.contains("Your balance: 150"));
        assert!(text.contains("deposited 50"));
    }

    #[test]
    fn test_confirmation_prompt_carries_confirm_keyboard() {
        let reply = WorkflowReply::ConfirmationPrompt {
            kind: TxKind::Withdraw,
            amount: 80,
        };
        assert!(reply_text(&reply).contains("withdraw 80"));
        let keyboard = reply_keyboard(&reply).unwrap();
        let data: Vec<_> = keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                teloxide::types::InlineKeyboardButtonKind::CallbackData(d) => Some(d.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(data, vec!["tx:confirm", "tx:cancel", "menu:main"]);
    }

    #[test]
    fn test_amount_prompt_has_no_keyboard() {
        assert!(reply_keyboard(&WorkflowReply::AmountPrompt(TxKind::Deposit)).is_none());
        assert!(reply_keyboard(&WorkflowReply::InvalidAmount).is_none());
    }
}
