//! The deposit/withdraw workflow
//!
//! Transitions per session: `Idle → AwaitingAmount → AwaitingConfirmation →
//! Idle`. Every operation returns a [`WorkflowReply`] the Telegram layer
//! renders; storage failures propagate as [`StorageError`] and are reported
//! to the user as a generic failure by the caller.

use teloxide::types::ChatId;

use crate::core::types::TxKind;
use crate::storage::db::{self, DbPool};
use crate::storage::StorageError;

use super::session::{SessionState, SessionStore};

/// User-visible outcome of a workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowReply {
    /// Ask the user to enter an amount
    AmountPrompt(TxKind),
    /// Amount captured, ask for confirm/cancel
    ConfirmationPrompt { kind: TxKind, amount: i64 },
    /// Input did not parse as a positive integer
    InvalidAmount,
    /// The requested withdrawal exceeds the current balance
    InsufficientBalance { balance: i64 },
    /// The transaction was committed
    Committed { kind: TxKind, amount: i64, balance: i64 },
    /// The pending transaction was discarded without touching the store
    Cancelled,
    /// Confirm/cancel arrived with nothing pending (duplicate or replay)
    NoPendingTransaction,
    /// Free text arrived while no capture flow was active
    NoActiveFlow,
}

/// Enters amount capture for `kind`, replacing any in-flight flow of either
/// kind.
pub fn start(sessions: &SessionStore, chat_id: ChatId, kind: TxKind) -> WorkflowReply {
    sessions.set(chat_id, SessionState::AwaitingAmount(kind));
    log::debug!("chat {}: awaiting {} amount", chat_id, kind);
    WorkflowReply::AmountPrompt(kind)
}

/// Handles a text message while a capture flow may be active.
///
/// The amount must parse as a strictly positive integer, and a withdrawal
/// must not exceed the balance read fresh at this moment. On validation
/// failure the session stays in `AwaitingAmount` so the user can retry.
pub fn submit_amount(
    sessions: &SessionStore,
    pool: &DbPool,
    chat_id: ChatId,
    text: &str,
) -> Result<WorkflowReply, StorageError> {
    let kind = match sessions.state(chat_id) {
        SessionState::AwaitingAmount(kind) => kind,
        _ => return Ok(WorkflowReply::NoActiveFlow),
    };

    let amount = match text.trim().parse::<i64>() {
        Ok(amount) if amount > 0 => amount,
        _ => return Ok(WorkflowReply::InvalidAmount),
    };

    if kind == TxKind::Withdraw {
        let conn = db::get_connection(pool)?;
        let account = db::get_or_create_account(&conn, chat_id.0)?;
        if amount > account.balance {
            return Ok(WorkflowReply::InsufficientBalance {
                balance: account.balance,
            });
        }
    }

    sessions.set(chat_id, SessionState::AwaitingConfirmation { kind, amount });
    Ok(WorkflowReply::ConfirmationPrompt { kind, amount })
}

/// Commits the pending transaction, if any.
///
/// The pending amount is taken out of the session before the store call, so
/// a duplicated confirm finds nothing and reports `NoPendingTransaction`
/// instead of re-applying a stale amount. The store's conditional update
/// re-validates the withdrawal against the now-current balance.
pub fn confirm(sessions: &SessionStore, pool: &DbPool, chat_id: ChatId) -> Result<WorkflowReply, StorageError> {
    let Some((kind, amount)) = sessions.take_pending(chat_id) else {
        return Ok(WorkflowReply::NoPendingTransaction);
    };

    let conn = db::get_connection(pool)?;
    // First-touch users confirm against a row that may not exist yet
    db::get_or_create_account(&conn, chat_id.0)?;

    match db::apply_transaction(&conn, chat_id.0, amount, kind)? {
        Some(account) => {
            log::info!(
                "chat {}: committed {} of {}, balance {}",
                chat_id,
                kind,
                amount,
                account.balance
            );
            Ok(WorkflowReply::Committed {
                kind,
                amount,
                balance: account.balance,
            })
        }
        None => {
            // Balance moved between capture and confirm; nothing committed
            let account = db::get_or_create_account(&conn, chat_id.0)?;
            log::warn!(
                "chat {}: {} of {} rejected at confirm, balance {}",
                chat_id,
                kind,
                amount,
                account.balance
            );
            Ok(WorkflowReply::InsufficientBalance {
                balance: account.balance,
            })
        }
    }
}

/// Discards any in-flight capture without touching the store.
pub fn cancel(sessions: &SessionStore, chat_id: ChatId) -> WorkflowReply {
    if sessions.take_pending(chat_id).is_some() {
        return WorkflowReply::Cancelled;
    }
    match sessions.state(chat_id) {
        SessionState::Idle => WorkflowReply::NoPendingTransaction,
        _ => {
            sessions.reset(chat_id);
            WorkflowReply::Cancelled
        }
    }
}

/// Returns the session to `Idle`, discarding any pending transaction
/// (main-menu button, any state).
pub fn reset(sessions: &SessionStore, chat_id: ChatId) {
    sessions.reset(chat_id);
}
