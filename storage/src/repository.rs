use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::{CommandRecord, CommandUpdate};

/// Persistence boundary for channel-scoped commands.
///
/// Keys are `(scope, trigger)`; triggers are matched case-insensitively. Every method is a single
/// atomic operation at the store, so concurrent callers never observe a half-written record.
#[async_trait]
pub trait CommandStore: Send + Sync {
    /// Returns the command stored under `(scope, trigger)`, if any.
    async fn find_command(
        &self,
        scope: &str,
        trigger: &str,
    ) -> Result<Option<CommandRecord>, StorageError>;

    /// Returns the commands of a scope ordered by trigger, at most `limit` when given.
    async fn find_commands(
        &self,
        scope: &str,
        limit: Option<i64>,
    ) -> Result<Vec<CommandRecord>, StorageError>;

    /// Inserts a new command. Fails with [`StorageError::AlreadyExists`] when the key is taken.
    async fn insert_command(&self, record: &CommandRecord) -> Result<(), StorageError>;

    /// Sets the fields present in `update`. Returns false when no such command exists.
    async fn update_command(
        &self,
        scope: &str,
        trigger: &str,
        update: &CommandUpdate,
    ) -> Result<bool, StorageError>;

    /// Adds `delta` to the usage counter in place and returns the new value.
    /// Returns `None` when no such command exists.
    async fn increment_counter(
        &self,
        scope: &str,
        trigger: &str,
        delta: i64,
    ) -> Result<Option<i64>, StorageError>;

    /// Deletes the command. Returns false when nothing was deleted.
    async fn delete_command(&self, scope: &str, trigger: &str) -> Result<bool, StorageError>;
}
