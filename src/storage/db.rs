use chrono::Utc;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use thiserror::Error;

use crate::core::config;
use crate::core::types::TxKind;

/// Errors surfaced by the account store.
///
/// Both variants mean the same thing to the user (storage unavailable); the
/// split only matters for logging.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

/// The last committed transaction on an account, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastTransaction {
    pub amount: i64,
    pub kind: TxKind,
    /// RFC 3339 UTC timestamp of the commit
    pub at: String,
}

/// One row per Telegram user.
#[derive(Debug, Clone)]
pub struct Account {
    /// Telegram ID of the owner
    pub telegram_id: i64,
    /// Current balance; the store never lets this go negative
    pub balance: i64,
    /// Last committed deposit or withdrawal, None until the first commit
    pub last_transaction: Option<LastTransaction>,
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes the pool and runs the schema migration on the first connection.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
pub fn create_pool(database_path: &str) -> Result<DbPool, StorageError> {
    // Writers back off instead of failing with SQLITE_BUSY when another
    // pooled connection holds the write lock.
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(|conn| conn.busy_timeout(std::time::Duration::from_secs(5)));
    let pool = Pool::builder()
        .max_size(config::storage::MAX_CONNECTIONS)
        .build(manager)?;

    // Ensure schema is up to date on first connection
    let conn = pool.get()?;
    migrate_schema(&conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, StorageError> {
    Ok(pool.get()?)
}

/// Create the accounts table if it does not exist yet. Idempotent.
fn migrate_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS accounts (
            telegram_id INTEGER PRIMARY KEY,
            balance INTEGER NOT NULL DEFAULT 0,
            last_tx_amount INTEGER,
            last_tx_kind TEXT,
            last_tx_at TEXT,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP
        )",
    )
}

/// Fetches an account by Telegram ID, `Ok(None)` when it does not exist.
pub fn get_account(conn: &DbConnection, telegram_id: i64) -> Result<Option<Account>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT telegram_id, balance, last_tx_amount, last_tx_kind, last_tx_at
         FROM accounts WHERE telegram_id = ?1",
    )?;
    let mut rows = stmt.query(params![telegram_id])?;

    if let Some(row) = rows.next()? {
        let telegram_id: i64 = row.get(0)?;
        let balance: i64 = row.get(1)?;
        let last_tx_amount: Option<i64> = row.get(2)?;
        let last_tx_kind: Option<String> = row.get(3)?;
        let last_tx_at: Option<String> = row.get(4)?;

        // All three columns are written together by apply_transaction; a
        // partially populated record is treated as absent.
        let last_transaction = match (last_tx_amount, last_tx_kind, last_tx_at) {
            (Some(amount), Some(kind), Some(at)) => {
                TxKind::parse(&kind).map(|kind| LastTransaction { amount, kind, at })
            }
            _ => None,
        };

        Ok(Some(Account {
            telegram_id,
            balance,
            last_transaction,
        }))
    } else {
        Ok(None)
    }
}

/// Fetches the account for `telegram_id`, creating a zero-balance one on
/// first access.
pub fn get_or_create_account(conn: &DbConnection, telegram_id: i64) -> Result<Account, StorageError> {
    conn.execute(
        "INSERT OR IGNORE INTO accounts (telegram_id, balance) VALUES (?1, 0)",
        params![telegram_id],
    )?;
    match get_account(conn, telegram_id)? {
        Some(account) => Ok(account),
        // Row inserted or already present, so this cannot happen short of a
        // concurrent external delete.
        None => Err(StorageError::Database(rusqlite::Error::QueryReturnedNoRows)),
    }
}

/// Applies a deposit or withdrawal as a single atomic conditional update.
///
/// The balance moves by `kind.delta(amount)` only when the resulting balance
/// stays non-negative, so concurrent withdrawals can never overdraw the
/// account and no read-then-write race exists at this boundary.
///
/// # Returns
///
/// * `Ok(Some(account))` - the update was applied; the returned account holds
///   the new balance and the recorded last transaction
/// * `Ok(None)` - the condition rejected the update (insufficient balance)
pub fn apply_transaction(
    conn: &DbConnection,
    telegram_id: i64,
    amount: i64,
    kind: TxKind,
) -> Result<Option<Account>, StorageError> {
    debug_assert!(amount > 0, "amount is validated positive by the workflow");

    let delta = kind.delta(amount);
    let now = Utc::now().to_rfc3339();
    let changed = conn.execute(
        "UPDATE accounts
         SET balance = balance + ?1,
             last_tx_amount = ?2,
             last_tx_kind = ?3,
             last_tx_at = ?4
         WHERE telegram_id = ?5 AND balance + ?1 >= 0",
        params![delta, amount, kind.as_str(), now, telegram_id],
    )?;

    if changed == 0 {
        return Ok(None);
    }

    match get_account(conn, telegram_id)? {
        Some(account) => Ok(Some(account)),
        None => Err(StorageError::Database(rusqlite::Error::QueryReturnedNoRows)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn test_pool() -> (NamedTempFile, DbPool) {
        let file = NamedTempFile::new().unwrap();
        let pool = create_pool(file.path().to_str().unwrap()).unwrap();
        (file, pool)
    }

    #[test]
    fn test_get_or_create_initializes_zero_balance() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        let account = get_or_create_account(&conn, 42).unwrap();
        assert_eq!(account.telegram_id, 42);
        assert_eq!(account.balance, 0);
        assert_eq!(account.last_transaction, None);

        // Second access returns the same row, not a reset one
        apply_transaction(&conn, 42, 10, TxKind::Deposit).unwrap();
        let again = get_or_create_account(&conn, 42).unwrap();
        assert_eq!(again.balance, 10);
    }

    #[test]
    fn test_deposit_adds_and_records_last_transaction() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();
        get_or_create_account(&conn, 1).unwrap();

        let account = apply_transaction(&conn, 1, 50, TxKind::Deposit).unwrap().unwrap();
        assert_eq!(account.balance, 50);
        let last = account.last_transaction.unwrap();
        assert_eq!(last.amount, 50);
        assert_eq!(last.kind, TxKind::Deposit);
        assert!(!last.at.is_empty());
    }

    #[test]
    fn test_withdraw_is_rejected_when_it_would_overdraw() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();
        get_or_create_account(&conn, 1).unwrap();
        apply_transaction(&conn, 1, 100, TxKind::Deposit).unwrap();

        let rejected = apply_transaction(&conn, 1, 150, TxKind::Withdraw).unwrap();
        assert!(rejected.is_none());

        // Balance and last transaction untouched by the rejected update
        let account = get_account(&conn, 1).unwrap().unwrap();
        assert_eq!(account.balance, 100);
        assert_eq!(account.last_transaction.unwrap().kind, TxKind::Deposit);
    }

    #[test]
    fn test_withdraw_down_to_zero_is_allowed() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();
        get_or_create_account(&conn, 1).unwrap();
        apply_transaction(&conn, 1, 100, TxKind::Deposit).unwrap();

        let account = apply_transaction(&conn, 1, 100, TxKind::Withdraw).unwrap().unwrap();
        assert_eq!(account.balance, 0);
        assert_eq!(account.last_transaction.unwrap().kind, TxKind::Withdraw);
    }

    #[test]
    fn test_concurrent_withdrawals_never_overdraw() {
        let (_file, pool) = test_pool();
        {
            let conn = get_connection(&pool).unwrap();
            get_or_create_account(&conn, 7).unwrap();
            apply_transaction(&conn, 7, 100, TxKind::Deposit).unwrap();
        }

        let mut handles = Vec::new();
        for _ in 0..2 {
            let pool = pool.clone();
            handles.push(std::thread::spawn(move || {
                let conn = get_connection(&pool).unwrap();
                apply_transaction(&conn, 7, 80, TxKind::Withdraw).unwrap()
            }));
        }
        let applied = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Option::is_some)
            .count();

        // At most one of the two 80-withdrawals against 100 can commit
        assert!(applied <= 1, "both conditional withdrawals committed");

        let conn = get_connection(&pool).unwrap();
        let balance = get_account(&conn, 7).unwrap().unwrap().balance;
        assert!(balance >= 0, "balance went negative: {}", balance);
        assert_eq!(balance, 100 - applied as i64 * 80);
    }
}
