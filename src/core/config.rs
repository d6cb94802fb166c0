use once_cell::sync::Lazy;
use std::env;

/// Configuration constants for the bot

/// Path to the SQLite database file.
/// Read once at startup from the VAULTBOT_DB environment variable,
/// defaults to "vaultbot.sqlite" in the working directory.
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("VAULTBOT_DB").unwrap_or_else(|_| "vaultbot.sqlite".to_string()));

/// Storage configuration
pub mod storage {
    /// Maximum number of connections held by the pool
    pub const MAX_CONNECTIONS: u32 = 10;
}
