use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use vaultbot::cli::{Cli, Commands};
use vaultbot::core::config;
use vaultbot::storage::create_pool;
use vaultbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
use vaultbot::workflow::SessionStore;

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    pretty_env_logger::init();

    let cli = Cli::parse_args();
    match cli.command {
        Some(Commands::InitDb { database }) => {
            let path = database.unwrap_or_else(|| config::DATABASE_PATH.clone());
            create_pool(&path)?;
            log::info!("Database schema ready at {}", path);
            Ok(())
        }
        Some(Commands::Run) | None => run_bot().await,
    }
}

/// Constructs the store, session state, and bot, then drives the dispatcher
/// until shutdown.
async fn run_bot() -> Result<()> {
    let db_pool = Arc::new(create_pool(&config::DATABASE_PATH)?);
    log::info!("Database ready at {}", *config::DATABASE_PATH);

    let sessions = Arc::new(SessionStore::new());
    let bot = create_bot()?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let deps = HandlerDeps::new(db_pool, sessions);

    log::info!("Starting vaultbot");
    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shut down");
    Ok(())
}
