//! Usage counters for channel commands.

use std::sync::Arc;

use storage::{CommandStore, StorageError};
use tracing::debug;

use crate::error::{CommandError, Result};

/// Atomic usage-counter increments, delegated to the store's in-place increment.
#[derive(Clone)]
pub struct CounterStore {
    store: Arc<dyn CommandStore>,
}

impl CounterStore {
    pub fn new(store: Arc<dyn CommandStore>) -> Self {
        Self { store }
    }

    /// Increments the command's counter by one and returns the new value.
    pub async fn increment_and_get(&self, scope: &str, trigger: &str) -> Result<i64> {
        let value = self
            .store
            .increment_counter(scope, trigger, 1)
            .await?
            .ok_or_else(|| {
                CommandError::PersistenceFailure(StorageError::NotFound(format!(
                    "{} {}",
                    scope, trigger
                )))
            })?;
        debug!(scope = %scope, trigger = %trigger, counter = value, "Counter incremented");
        Ok(value)
    }
}
