//! Telegram bot integration and handlers

use teloxide::types::InlineKeyboardButton;

pub mod bot;
pub mod handlers;
pub mod menu;

/// The bot type used across handlers
pub type Bot = teloxide::Bot;

/// Shorthand for an inline keyboard button carrying callback data
pub fn cb(text: impl Into<String>, data: impl Into<String>) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, data)
}

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use menu::{show_balance, show_main_menu};
