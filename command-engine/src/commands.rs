//! The `!commands` capability: command-list URL and channel command management.
//!
//! ```text
//! !commands add <!trigger> <template...>
//! !commands edit <!trigger> <template...>
//! !commands delete|remove <!trigger>
//! !commands alias <!trigger> <!target>
//! !commands permission|permissions|perms <!trigger> <level>
//! !commands [user]
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use storage::{CommandRecord, CommandStore, CommandUpdate, StorageError};
use tracing::{info, instrument};

use crate::capability::{CapabilityHandler, CapabilityInvocation};
use crate::error::{CommandError, Result};
use crate::permission::PermissionProvider;
use crate::template::escape_apostrophes;

pub struct CommandsCapability {
    store: Arc<dyn CommandStore>,
    permissions: Arc<dyn PermissionProvider>,
    commands_url: String,
}

fn trigger_arg<'a>(args: &'a [String], index: usize, usage: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .filter(|t| t.len() > 1 && t.starts_with('!'))
        .ok_or_else(|| CommandError::InvalidArgument(format!("Usage: {}", usage)))
}

impl CommandsCapability {
    pub fn new(
        store: Arc<dyn CommandStore>,
        permissions: Arc<dyn PermissionProvider>,
        commands_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            permissions,
            commands_url: commands_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Public page listing the channel's commands.
    pub fn list_url(&self, channel: &str) -> String {
        format!(
            "{}/commands?channel={}",
            self.commands_url,
            channel.trim_start_matches('#')
        )
    }

    async fn add(&self, channel: &str, args: &[String]) -> Result<String> {
        const USAGE: &str = "!commands add !trigger message";
        let trigger = trigger_arg(args, 1, USAGE)?;
        let template = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
        if template.is_empty() {
            return Err(CommandError::InvalidArgument(format!("Usage: {}", USAGE)));
        }

        let record = CommandRecord::new(channel, trigger, escape_apostrophes(&template));
        self.insert(record).await?;
        info!(channel = %channel, trigger = %trigger, "Command added");
        Ok(format!("The command {} has been added!", trigger))
    }

    async fn edit(&self, channel: &str, args: &[String]) -> Result<String> {
        const USAGE: &str = "!commands edit !trigger message";
        let trigger = trigger_arg(args, 1, USAGE)?;
        let template = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
        if template.is_empty() {
            return Err(CommandError::InvalidArgument(format!("Usage: {}", USAGE)));
        }

        let record = self
            .store
            .find_command(channel, &trigger.to_lowercase())
            .await?
            .ok_or_else(|| CommandError::CommandNotFound(trigger.to_string()))?;
        if record.is_alias {
            return Err(CommandError::InvalidArgument(format!(
                "{} is an alias, edit {} instead!",
                trigger, record.alias_for
            )));
        }

        let updated = self
            .store
            .update_command(
                channel,
                &record.trigger,
                &CommandUpdate::template(escape_apostrophes(&template)),
            )
            .await?;
        if !updated {
            return Err(CommandError::CommandNotFound(trigger.to_string()));
        }
        info!(channel = %channel, trigger = %trigger, "Command edited");
        Ok(format!("The command {} has been updated!", trigger))
    }

    async fn remove(&self, channel: &str, args: &[String]) -> Result<String> {
        let trigger = trigger_arg(args, 1, "!commands delete !trigger")?;
        if !self
            .store
            .delete_command(channel, &trigger.to_lowercase())
            .await?
        {
            return Err(CommandError::CommandNotFound(trigger.to_string()));
        }
        info!(channel = %channel, trigger = %trigger, "Command deleted");
        Ok(format!("The command {} has been deleted!", trigger))
    }

    async fn alias(&self, channel: &str, args: &[String]) -> Result<String> {
        const USAGE: &str = "!commands alias !trigger !target";
        let trigger = trigger_arg(args, 1, USAGE)?;
        let target = trigger_arg(args, 2, USAGE)?;
        if trigger.eq_ignore_ascii_case(target) {
            return Err(CommandError::InvalidArgument(format!(
                "{} can't be an alias for itself!",
                trigger
            )));
        }

        // an existing alias is replaced, a concrete command is not
        if let Some(existing) = self
            .store
            .find_command(channel, &trigger.to_lowercase())
            .await?
        {
            if !existing.is_alias {
                return Err(CommandError::DuplicateTrigger(existing.trigger));
            }
            self.store.delete_command(channel, &existing.trigger).await?;
        }
        self.insert(CommandRecord::alias(channel, trigger, target))
            .await?;
        info!(channel = %channel, trigger = %trigger, target = %target, "Alias added");
        Ok(format!("The command {} is now an alias for {}!", trigger, target))
    }

    async fn set_permission(
        &self,
        invocation: &CapabilityInvocation,
        args: &[String],
    ) -> Result<String> {
        const USAGE: &str = "!commands permission !trigger level";
        let channel = invocation.channel.as_str();
        let trigger = trigger_arg(args, 1, USAGE)?;
        let level = args
            .get(2)
            .and_then(|l| l.parse::<i64>().ok())
            .filter(|l| *l >= 0)
            .ok_or_else(|| CommandError::InvalidArgument(format!("Usage: {}", USAGE)))?;

        let record = self
            .store
            .find_command(channel, &trigger.to_lowercase())
            .await?
            .ok_or_else(|| CommandError::CommandNotFound(trigger.to_string()))?;

        let user_level = self
            .permissions
            .user_permission_level(channel, &invocation.invoker)
            .await?;
        if level > user_level || user_level < record.permission_level {
            info!(
                channel = %channel,
                trigger = %trigger,
                user = %invocation.invoker.username,
                user_level,
                requested = level,
                "Permission change denied"
            );
            return Err(CommandError::PermissionDenied);
        }

        self.store
            .update_command(channel, &record.trigger, &CommandUpdate::permission_level(level))
            .await?;
        info!(channel = %channel, trigger = %trigger, level, "Command permission updated");
        Ok(format!("The command {} permissions have been updated!", trigger))
    }

    async fn insert(&self, record: CommandRecord) -> Result<()> {
        match self.store.insert_command(&record).await {
            Err(StorageError::AlreadyExists(_)) => Err(CommandError::DuplicateTrigger(record.trigger)),
            other => Ok(other?),
        }
    }
}

#[async_trait]
impl CapabilityHandler for CommandsCapability {
    #[instrument(skip(self, invocation), fields(channel = %invocation.channel))]
    async fn handle(&self, invocation: &CapabilityInvocation) -> Result<Option<String>> {
        let channel = invocation.channel.as_str();
        let args = invocation.args.as_slice();
        let invoker = invocation.invoker.display_name();

        let reply = match args.first().map(String::as_str) {
            Some("add") => self.add(channel, args).await?,
            Some("edit") => self.edit(channel, args).await?,
            Some("delete") | Some("remove") => self.remove(channel, args).await?,
            Some("alias") => self.alias(channel, args).await?,
            Some("permission") | Some("permissions") | Some("perms") => {
                self.set_permission(invocation, args).await?
            }
            other => {
                let to_user = other.unwrap_or(invoker);
                return Ok(Some(format!(
                    "{} -> The commands for this channel are available here: {}",
                    to_user,
                    self.list_url(channel)
                )));
            }
        };
        Ok(Some(format!("{} -> {}", invoker, reply)))
    }
}
