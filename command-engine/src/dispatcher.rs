//! Message dispatch: resolve, gate, execute, count, deliver.
//!
//! Channel commands go through the rate limiter and then either the list engine or the template
//! engine; the usage counter is bumped once per executed invocation, after a list mutation has
//! succeeded. Default triggers
//! skip all of that and are forwarded to the registered capability handler.

use std::sync::Arc;

use dbot_core::{Bot, User};
use storage::{CommandRecord, CommandStore};
use tracing::{debug, error, info, instrument, warn};

use crate::capability::{CapabilityId, CapabilityInvocation, CapabilityRegistry};
use crate::config::EngineConfig;
use crate::counter::CounterStore;
use crate::defaults::DefaultCommandTable;
use crate::error::{CommandError, Result};
use crate::list::{is_mutation, ListEngine};
use crate::rate_limiter::{RateLimiter, Reservation};
use crate::resolver::{Resolution, ResolvedCommand, Resolver};
use crate::template::{has_list_marker, render};

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Text was produced and handed to the transport.
    Replied(String),
    /// A default trigger was handed to its capability handler.
    Forwarded {
        capability: CapabilityId,
        reply: Option<String>,
    },
    /// The command is cooling down in this channel; nothing was sent.
    RateLimited { retry_after_secs: u64 },
    /// Not a known trigger; nothing was sent.
    NotFound,
}

impl DispatchOutcome {
    /// Text delivered to the channel, if any.
    pub fn reply(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Replied(text) => Some(text),
            DispatchOutcome::Forwarded { reply, .. } => reply.as_deref(),
            DispatchOutcome::RateLimited { .. } | DispatchOutcome::NotFound => None,
        }
    }
}

pub struct Dispatcher {
    resolver: Resolver,
    rate_limiter: Arc<RateLimiter>,
    lists: ListEngine,
    counters: CounterStore,
    capabilities: CapabilityRegistry,
    bot: Arc<dyn Bot>,
    cooldown_secs: u64,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn CommandStore>,
        rate_limiter: Arc<RateLimiter>,
        defaults: DefaultCommandTable,
        capabilities: CapabilityRegistry,
        bot: Arc<dyn Bot>,
        config: &EngineConfig,
    ) -> Self {
        debug!(default_triggers = defaults.len(), "Default command table loaded");
        let unhandled = capabilities.unhandled();
        if !unhandled.is_empty() {
            warn!(
                unhandled = ?unhandled,
                "Default capabilities without a handler"
            );
        }
        Self {
            resolver: Resolver::new(store.clone(), defaults, config.max_alias_hops),
            rate_limiter,
            lists: ListEngine::new(store.clone()),
            counters: CounterStore::new(store),
            capabilities,
            bot,
            cooldown_secs: config.cooldown_secs,
        }
    }

    /// Handles one raw chat message from `invoker` in `channel`.
    ///
    /// Domain failures (bad index, duplicate trigger, alias loop, ...) are delivered as replies
    /// and reported as [`DispatchOutcome::Replied`]. Store failures and capability failures are
    /// returned as errors and nothing is sent.
    #[instrument(skip_all, fields(channel = %channel, user = %invoker.username))]
    pub async fn dispatch(&self, channel: &str, invoker: &User, raw: &str) -> Result<DispatchOutcome> {
        let Resolution { command, args } = match self.resolver.resolve_message(channel, raw).await {
            Ok(resolution) => resolution,
            Err(CommandError::NotFound(trigger)) => {
                debug!(channel = %channel, trigger = %trigger, "No such command");
                return Ok(DispatchOutcome::NotFound);
            }
            Err(e) => return self.reply_or_raise(channel, invoker, e).await,
        };

        match command {
            ResolvedCommand::Custom(record) => {
                match self.run_custom(channel, invoker, &record, &args).await {
                    Err(e) => self.reply_or_raise(channel, invoker, e).await,
                    other => other,
                }
            }
            ResolvedCommand::Default { capability, trigger } => {
                let invocation = CapabilityInvocation {
                    capability,
                    channel: channel.to_string(),
                    invoker: invoker.clone(),
                    trigger,
                    args,
                };
                match self.capabilities.invoke(&invocation).await {
                    Ok(reply) => {
                        info!(channel = %channel, capability = %capability, "Forwarded to capability");
                        if let Some(text) = &reply {
                            self.deliver(channel, text).await;
                        }
                        Ok(DispatchOutcome::Forwarded { capability, reply })
                    }
                    Err(e) => self.reply_or_raise(channel, invoker, e).await,
                }
            }
        }
    }

    async fn run_custom(
        &self,
        channel: &str,
        invoker: &User,
        record: &CommandRecord,
        args: &[String],
    ) -> Result<DispatchOutcome> {
        self.rate_limiter.ensure_bucket(channel);
        if let Reservation::RateLimited { retry_after_secs } =
            self.rate_limiter
                .check_and_reserve(channel, &record.trigger, self.cooldown_secs)
        {
            return Ok(DispatchOutcome::RateLimited { retry_after_secs });
        }

        let invoker_name = invoker.display_name();
        let text = if has_list_marker(&record.template) && is_mutation(args) {
            let text = self.lists.handle(record, invoker_name, args, None).await?;
            self.counters
                .increment_and_get(&record.scope, &record.trigger)
                .await?;
            text
        } else if has_list_marker(&record.template) {
            // lookups cannot fail, so the count is taken first and rendered in the same pass
            let counter = self
                .counters
                .increment_and_get(&record.scope, &record.trigger)
                .await?;
            self.lists
                .handle(record, invoker_name, args, Some(counter))
                .await?
        } else {
            let counter = self
                .counters
                .increment_and_get(&record.scope, &record.trigger)
                .await?;
            render(
                &record.template,
                args.first().map(String::as_str),
                invoker_name,
                Some(counter),
            )
        };

        info!(channel = %channel, trigger = %record.trigger, "Command executed");
        self.deliver(channel, &text).await;
        Ok(DispatchOutcome::Replied(text))
    }

    /// Delivers the reply for a domain error, or hands the error back to the caller.
    async fn reply_or_raise(
        &self,
        channel: &str,
        invoker: &User,
        err: CommandError,
    ) -> Result<DispatchOutcome> {
        match err.user_reply() {
            Some(reply) => {
                debug!(channel = %channel, error = %err, "Command rejected");
                let text = format!("{} -> {}", invoker.display_name(), reply);
                self.deliver(channel, &text).await;
                Ok(DispatchOutcome::Replied(text))
            }
            None => {
                if let CommandError::UnhandledCapability(capability) = &err {
                    error!(channel = %channel, capability = %capability, "No handler wired for capability");
                }
                Err(err)
            }
        }
    }

    async fn deliver(&self, channel: &str, text: &str) {
        if let Err(e) = self.bot.send_message(channel, text).await {
            warn!(channel = %channel, error = %e, "Failed to deliver reply");
        }
    }
}
