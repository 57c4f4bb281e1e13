//! Console runner: wires store, engine and handler chain, then feeds stdin lines through them.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use command_engine::{
    CapabilityId, CapabilityRegistry, CommandHandler, CommandsCapability, DefaultCommandTable,
    Dispatcher, RateLimiter, StaticPermissionProvider,
};
use dbot_core::{init_tracing, Bot, ConsoleBot, Message, User};
use handler_chain::HandlerChain;
use middleware::{LoggingHandler, TriggerFilterHandler};
use storage::{CommandStore, InMemoryCommandStore, SqliteCommandStore};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::config::BotConfig;

/// Opens the configured command store, or an in-memory one when `memory` is set.
pub async fn build_store(config: &BotConfig, memory: bool) -> Result<Arc<dyn CommandStore>> {
    if memory {
        info!("Using in-memory command store");
        return Ok(Arc::new(InMemoryCommandStore::new()));
    }
    let store = SqliteCommandStore::new(&config.database_url)
        .await
        .with_context(|| format!("Open command store at {}", config.database_url))?;
    Ok(Arc::new(store))
}

/// Builds the chain LoggingHandler → TriggerFilterHandler → CommandHandler.
pub fn build_handler_chain(
    config: &BotConfig,
    store: Arc<dyn CommandStore>,
    rate_limiter: Arc<RateLimiter>,
    bot: Arc<dyn Bot>,
) -> HandlerChain {
    let permissions = Arc::new(StaticPermissionProvider::new(&config.moderators));
    let capabilities = CapabilityRegistry::new().register(
        CapabilityId::Commands,
        Arc::new(CommandsCapability::new(
            store.clone(),
            permissions,
            config.engine.commands_url.clone(),
        )),
    );
    let dispatcher = Arc::new(Dispatcher::new(
        store,
        rate_limiter,
        DefaultCommandTable::builtin(),
        capabilities,
        bot,
        &config.engine,
    ));

    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(TriggerFilterHandler::new(config.bot_username.clone())))
        .add_handler(Arc::new(CommandHandler::new(dispatcher)))
}

/// Parses `#channel user message...`. Returns `None` for blank or malformed lines.
pub fn parse_console_line(line: &str) -> Option<Message> {
    let (channel, rest) = line.trim().split_once(char::is_whitespace)?;
    let (username, content) = rest.trim_start().split_once(char::is_whitespace)?;
    if !channel.starts_with('#') || channel.len() < 2 {
        return None;
    }
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    Some(Message::incoming(
        channel.to_lowercase(),
        User::new(username.to_lowercase(), username.to_lowercase()).with_display_name(username),
        content,
    ))
}

/// Runs every line of `input` through the chain and waits for all of them. Messages of one
/// channel are handled in input order; different channels run concurrently.
/// Returns the number of messages handled.
pub async fn process_lines<R>(chain: HandlerChain, input: R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let chain = Arc::new(chain);
    let mut lines = input.lines();
    let mut channels: HashMap<String, mpsc::UnboundedSender<Message>> = HashMap::new();
    let mut tasks = JoinSet::new();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        let Some(message) = parse_console_line(&line) else {
            if !line.trim().is_empty() {
                warn!(line = %line, "Expected `#channel user message`");
            }
            continue;
        };
        handled += 1;
        let sender = channels.entry(message.channel.clone()).or_insert_with(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            tasks.spawn(channel_worker(chain.clone(), rx));
            tx
        });
        if sender.send(message).is_err() {
            error!("Channel worker stopped early");
        }
    }

    // closing the senders lets each worker drain its queue and exit
    drop(channels);
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "Channel worker panicked");
        }
    }
    Ok(handled)
}

async fn channel_worker(chain: Arc<HandlerChain>, mut rx: mpsc::UnboundedReceiver<Message>) {
    while let Some(message) = rx.recv().await {
        if let Err(e) = chain.handle(&message).await {
            debug!(error = %e, channel = %message.channel, "Handler chain failed");
        }
    }
}

/// Periodically drops idle rate-limit entries.
fn spawn_rate_limit_eviction(rate_limiter: Arc<RateLimiter>, idle_secs: u64) {
    let max_idle = ChronoDuration::seconds(i64::try_from(idle_secs).unwrap_or(i64::MAX / 1000));
    let period = std::time::Duration::from_secs(idle_secs.clamp(1, 3600));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            let evicted = rate_limiter.evict_idle(Utc::now(), max_idle);
            if evicted > 0 {
                debug!(evicted, remaining = rate_limiter.len(), "Evicted idle rate-limit entries");
            }
        }
    });
}

/// Main entry for `dbot run`: init logging, build components, then process stdin until EOF.
#[instrument(skip(config))]
pub async fn run_console(config: BotConfig, memory: bool) -> Result<()> {
    init_tracing(&config.log_file)?;
    info!(
        database_url = %config.database_url,
        memory,
        bot_username = %config.bot_username,
        "Initializing bot"
    );

    let store = build_store(&config, memory).await?;
    let rate_limiter = Arc::new(RateLimiter::new());
    spawn_rate_limit_eviction(rate_limiter.clone(), config.rate_limit_idle_secs);

    let chain = build_handler_chain(&config, store, rate_limiter, Arc::new(ConsoleBot::stdout()));
    info!(handlers = chain.len(), "Bot started, reading stdin");

    let handled = process_lines(chain, BufReader::new(tokio::io::stdin())).await?;
    info!(handled, "Input closed, shutting down");
    Ok(())
}

/// Main entry for `dbot list`: prints the channel's commands.
pub async fn list_commands(config: BotConfig, channel: &str) -> Result<()> {
    let store = build_store(&config, false).await?;
    let commands = store
        .find_commands(channel, None)
        .await
        .with_context(|| format!("Query commands of {}", channel))?;

    if commands.is_empty() {
        println!("No commands in {}.", channel);
        return Ok(());
    }

    println!("{} command(s) in {}:\n", commands.len(), channel);
    println!("{:<20} {:<6} {:<8} {:<6} {}", "trigger", "perm", "count", "items", "response");
    println!("{}", "-".repeat(80));
    for c in &commands {
        let response = if c.is_alias {
            format!("-> {}", c.alias_for)
        } else {
            c.template.replace("&apos;", "'")
        };
        println!(
            "{:<20} {:<6} {:<8} {:<6} {}",
            c.trigger,
            c.permission_level,
            c.usage_counter,
            c.items.len(),
            response
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    fn test_config() -> BotConfig {
        BotConfig {
            database_url: "sqlite::memory:".to_string(),
            log_file: "logs/test.log".to_string(),
            bot_username: "dogebot".to_string(),
            engine: command_engine::EngineConfig {
                cooldown_secs: 0,
                ..Default::default()
            },
            rate_limit_idle_secs: 60,
            moderators: vec!["moddy".to_string()],
        }
    }

    #[test]
    fn test_parse_console_line() {
        let message = parse_console_line("  #SkeDog   Alice   !hello  Bob ").unwrap();
        assert_eq!(message.channel, "#skedog");
        assert_eq!(message.user.username, "alice");
        assert_eq!(message.user.display_name(), "Alice");
        assert_eq!(message.content, "!hello  Bob");
    }

    #[test]
    fn test_parse_console_line_rejects_malformed() {
        for line in ["", "#foo", "#foo alice", "foo alice !hi", "# alice !hi", "#foo alice   "] {
            assert!(parse_console_line(line).is_none(), "{:?}", line);
        }
    }

    #[tokio::test]
    async fn test_process_lines_end_to_end() {
        let out = SharedBuf::default();
        let config = test_config();
        let store = build_store(&config, false).await.unwrap();
        let chain = build_handler_chain(
            &config,
            store.clone(),
            Arc::new(RateLimiter::new()),
            Arc::new(ConsoleBot::with_writer(Box::new(out.clone()))),
        );

        let input = "\
#skedog skedog !commands add !hi Hello $(user)!
#skedog alice !hi
#skedog dogebot !hi
#skedog alice just chatting
not a valid line
";
        assert_eq!(process_lines(chain, input.as_bytes()).await.unwrap(), 4);

        assert_eq!(
            out.lines(),
            vec![
                "[#skedog] skedog -> The command !hi has been added!",
                "[#skedog] Hello alice!",
            ]
        );
        let stored = store.find_command("#skedog", "!hi").await.unwrap().unwrap();
        assert_eq!(stored.usage_counter, 1);
    }

    #[tokio::test]
    async fn test_process_lines_keeps_order_per_channel() {
        let out = SharedBuf::default();
        let config = test_config();
        let store = build_store(&config, true).await.unwrap();
        let chain = build_handler_chain(
            &config,
            store.clone(),
            Arc::new(RateLimiter::new()),
            Arc::new(ConsoleBot::with_writer(Box::new(out.clone()))),
        );

        let input = "\
#foo foo !commands add !quote $(list)
#bar bar !commands add !hi hi from bar
#foo foo !quote add one
#bar bar !hi
#foo foo !quote add two
#foo alice !quote 2
";
        assert_eq!(process_lines(chain, input.as_bytes()).await.unwrap(), 6);

        let lines = out.lines();
        let foo: Vec<&str> = lines
            .iter()
            .map(String::as_str)
            .filter(|l| l.starts_with("[#foo]"))
            .collect();
        assert_eq!(
            foo,
            vec![
                "[#foo] foo -> The command !quote has been added!",
                "[#foo] foo -> \"one\" has been added as #1!",
                "[#foo] foo -> \"two\" has been added as #2!",
                "[#foo] two -> #2/2",
            ]
        );
        assert!(lines.contains(&"[#bar] hi from bar".to_string()));
    }
}
