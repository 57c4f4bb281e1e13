//! CLI parser.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dbot")]
#[command(about = "Chat command bot: run on the console, list channel commands", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read `#channel user message...` lines from stdin and print replies to stdout.
    Run {
        /// Overrides DATABASE_URL.
        #[arg(short, long)]
        database_url: Option<String>,
        /// Keep commands in memory only; nothing is persisted.
        #[arg(long)]
        memory: bool,
    },
    /// Print the commands of one channel.
    List {
        #[arg(short, long)]
        channel: String,
        /// Overrides DATABASE_URL.
        #[arg(short, long)]
        database_url: Option<String>,
    },
}
