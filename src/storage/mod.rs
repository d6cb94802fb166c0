//! SQLite-backed account store

pub mod db;

// Re-exports for convenience
pub use db::{create_pool, get_connection, Account, DbConnection, DbPool, LastTransaction, StorageError};
