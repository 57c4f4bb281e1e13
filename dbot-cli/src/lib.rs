//! # dbot-cli
//!
//! Argument parsing, config loading and the console runner.

pub mod cli;
pub mod config;
pub mod runner;

pub use cli::{Cli, Commands};
pub use config::BotConfig;
pub use runner::{build_handler_chain, build_store, list_commands, parse_console_line, process_lines, run_console};
