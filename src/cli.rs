use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vaultbot")]
#[command(author, version, about = "Telegram bot for balance checks and deposit/withdraw flows", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (default when no subcommand is given)
    Run,

    /// Create the SQLite database schema and exit
    InitDb {
        /// Database path, overrides VAULTBOT_DB
        #[arg(long)]
        database: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
