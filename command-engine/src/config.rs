//! Engine tunables. Loaded by the binary from env (see dbot-cli `BotConfig`).

pub const DEFAULT_COOLDOWN_SECS: u64 = 5;
pub const DEFAULT_MAX_ALIAS_HOPS: usize = 10;
pub const DEFAULT_COMMANDS_URL: &str = "https://thedogebot.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Minimum seconds between two invocations of the same command in one channel.
    pub cooldown_secs: u64,
    /// Alias hops allowed before resolution fails.
    pub max_alias_hops: usize,
    /// Base URL of the public command list page.
    pub commands_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            max_alias_hops: DEFAULT_MAX_ALIAS_HOPS,
            commands_url: DEFAULT_COMMANDS_URL.to_string(),
        }
    }
}
