//! Per-user transaction workflow: session state machine and operations

pub mod session;
pub mod transaction;

// Re-exports for convenience
pub use session::{SessionState, SessionStore};
pub use transaction::{cancel, confirm, reset, start, submit_amount, WorkflowReply};
