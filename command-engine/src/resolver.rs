//! Trigger resolution: channel commands, aliases and global defaults.
//!
//! Resolution is an explicit loop. Every alias traversal counts as a hop; a chain longer than the
//! configured bound, or one that revisits a trigger, fails with
//! [`CommandError::AliasCycleOrDepthExceeded`].

use std::collections::HashSet;
use std::sync::Arc;

use storage::{CommandRecord, CommandStore};
use tracing::{debug, instrument, warn};

use crate::capability::CapabilityId;
use crate::defaults::{DefaultCommandTable, DefaultTarget};
use crate::error::{CommandError, Result};

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCommand {
    /// A concrete channel command (never an alias).
    Custom(CommandRecord),
    /// A global default trigger; the capability is executed elsewhere.
    Default {
        capability: CapabilityId,
        /// The trigger the capability was reached through, after alias resolution.
        trigger: String,
    },
}

/// A resolved command together with the message tokens after the trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub command: ResolvedCommand,
    pub args: Vec<String>,
}

pub struct Resolver {
    store: Arc<dyn CommandStore>,
    defaults: DefaultCommandTable,
    max_hops: usize,
}

impl Resolver {
    pub fn new(store: Arc<dyn CommandStore>, defaults: DefaultCommandTable, max_hops: usize) -> Self {
        Self {
            store,
            defaults,
            max_hops,
        }
    }

    /// Resolves `trigger` in `scope`. Unknown triggers yield [`CommandError::NotFound`].
    #[instrument(skip(self))]
    pub async fn resolve(&self, scope: &str, trigger: &str) -> Result<ResolvedCommand> {
        let requested = trigger.to_lowercase();
        let mut current = requested.clone();
        let mut hops = 0usize;

        let mut seen = HashSet::new();
        loop {
            if !seen.insert(current.clone()) {
                return Err(self.cycle(&requested, hops));
            }
            let Some(record) = self.store.find_command(scope, &current).await? else {
                break;
            };
            if !record.is_alias {
                debug!(scope = %scope, trigger = %requested, resolved = %record.trigger, hops, "Resolved channel command");
                return Ok(ResolvedCommand::Custom(record));
            }
            if record.alias_for.is_empty() {
                warn!(scope = %scope, trigger = %record.trigger, "Alias without target");
                return Err(CommandError::NotFound(requested));
            }
            hops += 1;
            if hops > self.max_hops {
                return Err(self.cycle(&requested, hops));
            }
            current = record.alias_for.to_lowercase();
        }

        // Not a channel command: continue in the default table with the same hop budget.
        let mut seen = HashSet::new();
        loop {
            if !seen.insert(current.clone()) {
                return Err(self.cycle(&requested, hops));
            }
            match self.defaults.get(&current) {
                Some(DefaultTarget::Capability(capability)) => {
                    debug!(trigger = %requested, capability = %capability, hops, "Resolved default command");
                    return Ok(ResolvedCommand::Default {
                        capability: *capability,
                        trigger: current,
                    });
                }
                Some(DefaultTarget::Alias(next)) => {
                    hops += 1;
                    if hops > self.max_hops {
                        return Err(self.cycle(&requested, hops));
                    }
                    current = next.clone();
                }
                None => return Err(CommandError::NotFound(requested)),
            }
        }
    }

    /// Splits `message` into trigger and arguments and resolves the trigger.
    pub async fn resolve_message(&self, scope: &str, message: &str) -> Result<Resolution> {
        let mut tokens = message.split_whitespace();
        let trigger = tokens
            .next()
            .filter(|t| t.starts_with('!'))
            .ok_or_else(|| CommandError::NotFound(message.trim().to_string()))?;
        let command = self.resolve(scope, trigger).await?;
        Ok(Resolution {
            command,
            args: tokens.map(str::to_string).collect(),
        })
    }

    fn cycle(&self, trigger: &str, hops: usize) -> CommandError {
        warn!(trigger = %trigger, hops, max_hops = self.max_hops, "Alias chain rejected");
        CommandError::AliasCycleOrDepthExceeded {
            trigger: trigger.to_string(),
            hops,
        }
    }
}
