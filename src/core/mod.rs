//! Core utilities, configuration, and common types

pub mod config;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use error::{AppError, AppResult};
pub use types::TxKind;
