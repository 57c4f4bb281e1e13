//! # In-memory command store
//!
//! [`InMemoryCommandStore`] keeps commands in a map behind `Arc<RwLock<>>`. Data is lost on restart;
//! used by tests and by `dbot run --memory`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StorageError;
use crate::models::{CommandRecord, CommandUpdate};
use crate::repository::CommandStore;

type Key = (String, String);

fn key(scope: &str, trigger: &str) -> Key {
    (scope.to_string(), trigger.to_lowercase())
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCommandStore {
    commands: Arc<RwLock<HashMap<Key, CommandRecord>>>,
}

impl InMemoryCommandStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored commands across all scopes.
    pub async fn len(&self) -> usize {
        self.commands.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CommandStore for InMemoryCommandStore {
    async fn find_command(
        &self,
        scope: &str,
        trigger: &str,
    ) -> Result<Option<CommandRecord>, StorageError> {
        let commands = self.commands.read().await;
        Ok(commands.get(&key(scope, trigger)).cloned())
    }

    async fn find_commands(
        &self,
        scope: &str,
        limit: Option<i64>,
    ) -> Result<Vec<CommandRecord>, StorageError> {
        let commands = self.commands.read().await;
        let mut found: Vec<CommandRecord> = commands
            .values()
            .filter(|c| c.scope == scope)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.trigger.cmp(&b.trigger));
        if let Some(limit) = limit {
            found.truncate(limit.max(0) as usize);
        }
        Ok(found)
    }

    async fn insert_command(&self, record: &CommandRecord) -> Result<(), StorageError> {
        let mut commands = self.commands.write().await;
        let k = key(&record.scope, &record.trigger);
        if commands.contains_key(&k) {
            return Err(StorageError::AlreadyExists(format!(
                "{} {}",
                record.scope, record.trigger
            )));
        }
        commands.insert(k, record.clone());
        debug!(scope = %record.scope, trigger = %record.trigger, "Saved command");
        Ok(())
    }

    async fn update_command(
        &self,
        scope: &str,
        trigger: &str,
        update: &CommandUpdate,
    ) -> Result<bool, StorageError> {
        let mut commands = self.commands.write().await;
        let Some(record) = commands.get_mut(&key(scope, trigger)) else {
            return Ok(false);
        };
        if let Some(template) = &update.template {
            record.template = template.clone();
        }
        if let Some(level) = update.permission_level {
            record.permission_level = level;
        }
        if let Some(items) = &update.items {
            record.items = items.clone();
        }
        record.updated_at = Utc::now();
        Ok(true)
    }

    async fn increment_counter(
        &self,
        scope: &str,
        trigger: &str,
        delta: i64,
    ) -> Result<Option<i64>, StorageError> {
        let mut commands = self.commands.write().await;
        Ok(commands.get_mut(&key(scope, trigger)).map(|record| {
            record.usage_counter += delta;
            record.updated_at = Utc::now();
            record.usage_counter
        }))
    }

    async fn delete_command(&self, scope: &str, trigger: &str) -> Result<bool, StorageError> {
        let mut commands = self.commands.write().await;
        Ok(commands.remove(&key(scope, trigger)).is_some())
    }
}
