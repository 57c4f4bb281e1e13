//! List-backed commands: add / edit / delete / lookup on a command's ordered items.
//!
//! Mutations on one command are serialized by a per-command async lock: the items are re-read
//! from the store, changed and written back while the lock is held, so concurrent appends are
//! never lost and deletes never act on a stale index.

use std::sync::Arc;

use dashmap::DashMap;
use storage::{CommandRecord, CommandStore, CommandUpdate};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::error::{CommandError, Result};
use crate::template::{escape_apostrophes, render, render_list_item, strip_list_marker};

/// Parses a 1-based item index valid for a list of `len` items.
pub fn parse_index(token: &str, len: usize) -> Option<usize> {
    token
        .parse::<usize>()
        .ok()
        .filter(|index| (1..=len).contains(index))
}

/// True when `sub_tokens` start with a list mutation keyword.
pub fn is_mutation(sub_tokens: &[String]) -> bool {
    matches!(
        sub_tokens.first().map(String::as_str),
        Some("add" | "edit" | "delete" | "remove")
    )
}

pub struct ListEngine {
    store: Arc<dyn CommandStore>,
    locks: DashMap<(String, String), Arc<Mutex<()>>>,
}

impl ListEngine {
    pub fn new(store: Arc<dyn CommandStore>) -> Self {
        Self {
            store,
            locks: DashMap::new(),
        }
    }

    /// Handles one invocation of a list-backed command. `sub_tokens` are the message tokens
    /// after the trigger. Keywords are matched case-sensitively. `counter` fills `$(counter)` in
    /// lookup replies; mutation replies echo the item text as given.
    #[instrument(skip(self, command, sub_tokens), fields(scope = %command.scope, trigger = %command.trigger))]
    pub async fn handle(
        &self,
        command: &CommandRecord,
        invoker: &str,
        sub_tokens: &[String],
        counter: Option<i64>,
    ) -> Result<String> {
        match sub_tokens.first().map(String::as_str) {
            Some("add") => self.add(command, invoker, &sub_tokens[1..]).await,
            Some("edit") => self.edit(command, invoker, &sub_tokens[1..]).await,
            Some("delete") | Some("remove") => self.remove(command, invoker, &sub_tokens[1..]).await,
            token => Ok(lookup(command, invoker, token, counter)),
        }
    }

    async fn add(&self, command: &CommandRecord, invoker: &str, args: &[String]) -> Result<String> {
        let text = args.join(" ");
        if text.is_empty() {
            return Err(CommandError::InvalidArgument(format!(
                "Usage: {} add <text>",
                command.trigger
            )));
        }
        let stored = escape_apostrophes(&text);
        let index = self
            .mutate(command, |items| {
                items.push(stored);
                Ok(items.len())
            })
            .await?;
        info!(scope = %command.scope, trigger = %command.trigger, index, "List item added");
        Ok(format!("{} -> \"{}\" has been added as #{}!", invoker, text, index))
    }

    async fn edit(&self, command: &CommandRecord, invoker: &str, args: &[String]) -> Result<String> {
        let token = args.first().cloned().unwrap_or_default();
        let text = args.get(1..).map(|rest| rest.join(" ")).unwrap_or_default();
        let stored = escape_apostrophes(&text);
        let index = self
            .mutate(command, |items| {
                let index = parse_index(&token, items.len())
                    .ok_or_else(|| CommandError::InvalidIndex(token.clone()))?;
                if stored.is_empty() {
                    return Err(CommandError::InvalidArgument(format!(
                        "Usage: {} edit <number> <text>",
                        command.trigger
                    )));
                }
                items[index - 1] = stored;
                Ok(index)
            })
            .await?;
        info!(scope = %command.scope, trigger = %command.trigger, index, "List item edited");
        Ok(format!("{} -> #{} has been updated to \"{}\"!", invoker, index, text))
    }

    async fn remove(&self, command: &CommandRecord, invoker: &str, args: &[String]) -> Result<String> {
        let token = args.first().cloned().unwrap_or_default();
        let (index, remaining) = self
            .mutate(command, |items| {
                let index = parse_index(&token, items.len())
                    .ok_or_else(|| CommandError::InvalidIndex(token.clone()))?;
                items.remove(index - 1);
                Ok((index, items.len()))
            })
            .await?;
        info!(scope = %command.scope, trigger = %command.trigger, index, remaining, "List item deleted");
        Ok(format!(
            "{} -> #{} has been deleted, {} left!",
            invoker, index, remaining
        ))
    }

    /// Read-modify-write of the command's items under its lock. Nothing is written when `f` fails.
    async fn mutate<T, F>(&self, command: &CommandRecord, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<String>) -> Result<T>,
    {
        let key = (command.scope.clone(), command.trigger.clone());
        let lock = self.locks.entry(key.clone()).or_default().clone();
        let out = {
            let _guard = lock.lock().await;
            self.write_items(command, f).await
        };
        drop(lock);
        // the map holds the last reference once no other mutation waits on this command
        self.locks.remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        out
    }

    async fn write_items<T, F>(&self, command: &CommandRecord, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<String>) -> Result<T>,
    {
        let mut items = self
            .store
            .find_command(&command.scope, &command.trigger)
            .await?
            .ok_or_else(|| CommandError::CommandNotFound(command.trigger.clone()))?
            .items;
        let out = f(&mut items)?;
        let updated = self
            .store
            .update_command(&command.scope, &command.trigger, &CommandUpdate::items(items))
            .await?;
        if !updated {
            return Err(CommandError::CommandNotFound(command.trigger.clone()));
        }
        debug!(scope = %command.scope, trigger = %command.trigger, "List items written");
        Ok(out)
    }
}

/// Lookup on `command.items`; never fails and never returns an empty reply.
fn lookup(command: &CommandRecord, invoker: &str, token: Option<&str>, counter: Option<i64>) -> String {
    let items = &command.items;
    let total = items.len();
    if total == 0 {
        return format!(
            "{} -> There are no items for {} yet, add one with {} add <text>",
            invoker, command.trigger, command.trigger
        );
    }

    let index = match token {
        None => total,
        Some(token) => match parse_index(token, total) {
            Some(index) => index,
            None => {
                // not an index: the token addresses another user
                let text = render(&strip_list_marker(&command.template), Some(token), invoker, counter);
                if text.trim().is_empty() {
                    return format!(
                        "{} -> Usage: {} [number] | add <text> | edit <number> <text> | delete <number>",
                        invoker, command.trigger
                    );
                }
                return text;
            }
        },
    };

    let body = render_list_item(&command.template, &items[index - 1], invoker, counter);
    format!("{} -> #{}/{}", body, index, total)
}
