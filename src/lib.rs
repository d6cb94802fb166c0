//! Vaultbot - Telegram bot for balance checks and deposit/withdraw flows
//!
//! Each user has an account row in SQLite; deposits and withdrawals go
//! through a per-session capture/confirm workflow and are committed with a
//! single atomic conditional update, so the balance can never go negative
//! even under concurrent events.
//!
//! # Module Structure
//!
//! - `core`: configuration, shared types, and error handling
//! - `storage`: SQLite-backed account store
//! - `workflow`: per-user transaction state machine
//! - `telegram`: bot wiring, menus, and update handlers

pub mod cli;
pub mod core;
pub mod storage;
pub mod telegram;
pub mod workflow;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, TxKind};
pub use crate::storage::{create_pool, get_connection, DbConnection, DbPool};
pub use crate::telegram::{schema, HandlerDeps};
pub use crate::workflow::{SessionStore, WorkflowReply};
