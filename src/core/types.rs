use std::fmt;

/// Kind of a balance-mutating transaction.
///
/// Stored in `accounts.last_tx_kind` as its lowercase string form and carried
/// through the per-session workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Deposit,
    Withdraw,
}

impl TxKind {
    /// String form used in the database and in callback payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Deposit => "deposit",
            TxKind::Withdraw => "withdraw",
        }
    }

    /// Parses the database string form back into a kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(TxKind::Deposit),
            "withdraw" => Some(TxKind::Withdraw),
            _ => None,
        }
    }

    /// Signed balance delta this kind applies for a positive `amount`.
    pub fn delta(&self, amount: i64) -> i64 {
        match self {
            TxKind::Deposit => amount,
            TxKind::Withdraw => -amount,
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
