use anyhow::{Context, Result};
use command_engine::EngineConfig;
use std::env;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./dbot.db";
pub const DEFAULT_LOG_FILE: &str = "logs/dbot.log";
pub const DEFAULT_BOT_USERNAME: &str = "dogebot";
pub const DEFAULT_RATE_LIMIT_IDLE_SECS: u64 = 3600;

/// Bot configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub database_url: String,
    pub log_file: String,
    /// The bot's own login; its messages are never dispatched.
    pub bot_username: String,
    pub engine: EngineConfig,
    /// Rate-limit entries idle this long are evicted.
    pub rate_limit_idle_secs: u64,
    pub moderators: Vec<String>,
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", name, raw)),
        _ => Ok(default),
    }
}

impl BotConfig {
    /// Loads config from the environment. `database_url` overrides `DATABASE_URL` when given.
    pub fn from_env(database_url: Option<String>) -> Result<Self> {
        let defaults = EngineConfig::default();

        let database_url = database_url
            .or_else(|| env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        let bot_username =
            env::var("BOT_USERNAME").unwrap_or_else(|_| DEFAULT_BOT_USERNAME.to_string());
        let engine = EngineConfig {
            cooldown_secs: parse_var("COMMAND_COOLDOWN_SECS", defaults.cooldown_secs)?,
            max_alias_hops: parse_var("MAX_ALIAS_HOPS", defaults.max_alias_hops)?,
            commands_url: env::var("COMMANDS_URL").unwrap_or(defaults.commands_url),
        };
        let rate_limit_idle_secs = parse_var("RATE_LIMIT_IDLE_SECS", DEFAULT_RATE_LIMIT_IDLE_SECS)?;
        let moderators = env::var("MODERATORS")
            .map(|raw| {
                raw.split(',')
                    .map(|m| m.trim().to_lowercase())
                    .filter(|m| !m.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            log_file,
            bot_username,
            engine,
            rate_limit_idle_secs,
            moderators,
        })
    }
}
