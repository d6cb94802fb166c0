use dashmap::DashMap;
use teloxide::types::ChatId;

use crate::core::types::TxKind;

/// Per-user state of the deposit/withdraw capture flow.
///
/// A session holds at most one pending transaction; starting a new flow of
/// either kind replaces whatever was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No capture in progress
    #[default]
    Idle,
    /// The user was asked to enter an amount
    AwaitingAmount(TxKind),
    /// A validated amount waits for the user's confirm/cancel
    AwaitingConfirmation { kind: TxKind, amount: i64 },
}

/// In-process store of capture sessions, keyed by chat id.
///
/// Each user's events only touch their own entry, but confirm events can be
/// duplicated or replayed by Telegram, so the pending transaction is handed
/// out through [`SessionStore::take_pending`], which swaps the state to
/// `Idle` under the shard lock. Of two racing confirms exactly one obtains
/// the pending amount.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<ChatId, SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for the chat, `Idle` when no session exists yet.
    pub fn state(&self, chat_id: ChatId) -> SessionState {
        self.sessions.get(&chat_id).map(|s| *s).unwrap_or_default()
    }

    pub fn set(&self, chat_id: ChatId, state: SessionState) {
        self.sessions.insert(chat_id, state);
    }

    /// Drops the session, returning the chat to `Idle`.
    pub fn reset(&self, chat_id: ChatId) {
        self.sessions.remove(&chat_id);
    }

    /// Atomically takes the pending transaction, leaving the session `Idle`.
    ///
    /// Returns `None` when nothing is awaiting confirmation, including the
    /// case where another event already took it.
    pub fn take_pending(&self, chat_id: ChatId) -> Option<(TxKind, i64)> {
        let mut entry = self.sessions.get_mut(&chat_id)?;
        if let SessionState::AwaitingConfirmation { kind, amount } = *entry {
            *entry = SessionState::Idle;
            Some((kind, amount))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_state_defaults_to_idle() {
        let store = SessionStore::new();
        assert_eq!(store.state(ChatId(1)), SessionState::Idle);
    }

    #[test]
    fn test_set_replaces_previous_state() {
        let store = SessionStore::new();
        store.set(ChatId(1), SessionState::AwaitingAmount(TxKind::Deposit));
        store.set(ChatId(1), SessionState::AwaitingAmount(TxKind::Withdraw));
        assert_eq!(store.state(ChatId(1)), SessionState::AwaitingAmount(TxKind::Withdraw));
    }

    #[test]
    fn test_take_pending_only_from_awaiting_confirmation() {
        let store = SessionStore::new();
        assert_eq!(store.take_pending(ChatId(1)), None);

        store.set(ChatId(1), SessionState::AwaitingAmount(TxKind::Deposit));
        assert_eq!(store.take_pending(ChatId(1)), None);

        store.set(
            ChatId(1),
            SessionState::AwaitingConfirmation {
                kind: TxKind::Withdraw,
                amount: 80,
            },
        );
        assert_eq!(store.take_pending(ChatId(1)), Some((TxKind::Withdraw, 80)));
        // Taken exactly once
        assert_eq!(store.take_pending(ChatId(1)), None);
        assert_eq!(store.state(ChatId(1)), SessionState::Idle);
    }

    #[test]
    fn test_take_pending_races_hand_out_once() {
        let store = Arc::new(SessionStore::new());
        store.set(
            ChatId(9),
            SessionState::AwaitingConfirmation {
                kind: TxKind::Withdraw,
                amount: 80,
            },
        );

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.take_pending(ChatId(9)))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Option::is_some)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_sessions_are_independent_per_chat() {
        let store = SessionStore::new();
        store.set(ChatId(1), SessionState::AwaitingAmount(TxKind::Deposit));
        store.set(
            ChatId(2),
            SessionState::AwaitingConfirmation {
                kind: TxKind::Withdraw,
                amount: 10,
            },
        );

        store.reset(ChatId(1));
        assert_eq!(store.state(ChatId(1)), SessionState::Idle);
        assert_eq!(
            store.state(ChatId(2)),
            SessionState::AwaitingConfirmation {
                kind: TxKind::Withdraw,
                amount: 10
            }
        );
    }
}
