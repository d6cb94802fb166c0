//! Handler types and dependencies

use std::sync::Arc;

use crate::storage::db::DbPool;
use crate::workflow::SessionStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
///
/// Constructed once at startup and cloned into each dptree branch; owning
/// the store handle here (instead of a process-wide global) keeps the
/// lifecycle with the entry point.
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub sessions: Arc<SessionStore>,
}

impl HandlerDeps {
    pub fn new(db_pool: Arc<DbPool>, sessions: Arc<SessionStore>) -> Self {
        Self { db_pool, sessions }
    }
}
