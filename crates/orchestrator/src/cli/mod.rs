pub mod chat;
pub mod run;

use clap::{Parser, Subcommand};

/// drivethru — an AI drive-thru conversation pipeline.
#[derive(Debug, Parser)]
#[command(name = "drivethru", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open an interactive chat REPL against the pipeline (default when no
    /// subcommand is given).
    Chat {
        /// Session key (defaults to "cli:chat").
        #[arg(long, default_value = "cli:chat")]
        session: String,
        /// Restaurant this session orders from.
        #[arg(long, default_value_t = 1)]
        restaurant_id: i64,
    },
    /// Send a single turn and print the response.
    Run {
        /// The utterance to send.
        message: String,
        /// Session key (defaults to "cli:run").
        #[arg(long, default_value = "cli:run")]
        session: String,
        /// Restaurant this session orders from.
        #[arg(long, default_value_t = 1)]
        restaurant_id: i64,
        /// Output the full turn result as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Parse the config file and report any errors.
    ConfigValidate,
    /// Print version information.
    Version,
}
