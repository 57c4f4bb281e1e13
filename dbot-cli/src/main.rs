//! dbot CLI: run the command bot on the console, list a channel's commands. Config from env and optional CLI args.

use anyhow::Result;
use clap::Parser;
use dbot_cli::{list_commands, run_console, BotConfig, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            database_url,
            memory,
        } => {
            let config = BotConfig::from_env(database_url)?;
            run_console(config, memory).await
        }
        Commands::List {
            channel,
            database_url,
        } => {
            let config = BotConfig::from_env(database_url)?;
            list_commands(config, &channel).await
        }
    }
}
