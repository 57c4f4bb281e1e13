//! Command record model for persistence.
//!
//! Maps to the `commands` table and is used by every CommandStore implementation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// A channel-scoped command: plain template, list-backed template, or alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub scope: String,
    /// Always lower-case, starts with `!`.
    pub trigger: String,
    pub is_alias: bool,
    pub alias_for: String,
    pub template: String,
    pub permission_level: i64,
    pub usage_counter: i64,
    pub items: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommandRecord {
    /// Creates a plain command with a zero counter and permission level.
    pub fn new(
        scope: impl Into<String>,
        trigger: impl AsRef<str>,
        template: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            scope: scope.into(),
            trigger: trigger.as_ref().to_lowercase(),
            is_alias: false,
            alias_for: String::new(),
            template: template.into(),
            permission_level: 0,
            usage_counter: 0,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an alias entry that resolves as if `alias_for` was invoked.
    pub fn alias(
        scope: impl Into<String>,
        trigger: impl AsRef<str>,
        alias_for: impl AsRef<str>,
    ) -> Self {
        let mut record = Self::new(scope, trigger, String::new());
        record.is_alias = true;
        record.alias_for = alias_for.as_ref().to_lowercase();
        record
    }

    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_permission_level(mut self, level: i64) -> Self {
        self.permission_level = level;
        self
    }
}

/// Row shape of the `commands` table; `items` is a JSON array.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CommandRow {
    pub scope: String,
    pub command: String,
    pub is_alias: bool,
    pub alias_for: String,
    pub template: String,
    pub permission_level: i64,
    pub usage_counter: i64,
    pub items: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CommandRow> for CommandRecord {
    type Error = StorageError;

    fn try_from(row: CommandRow) -> Result<Self, Self::Error> {
        let items: Vec<String> = serde_json::from_str(&row.items)?;
        Ok(Self {
            scope: row.scope,
            trigger: row.command,
            is_alias: row.is_alias,
            alias_for: row.alias_for,
            template: row.template,
            permission_level: row.permission_level,
            usage_counter: row.usage_counter,
            items,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_lowercases_trigger() {
        let record = CommandRecord::new("#foo", "!HeLLo", "hi");
        assert_eq!(record.trigger, "!hello");
        assert!(!record.is_alias);
        assert_eq!(record.usage_counter, 0);
        assert!(record.items.is_empty());
    }

    #[test]
    fn test_alias_record() {
        let record = CommandRecord::alias("#foo", "!Hi", "!HELLO");
        assert!(record.is_alias);
        assert_eq!(record.alias_for, "!hello");
        assert!(record.template.is_empty());
    }

    #[test]
    fn test_row_with_bad_items_json_is_rejected() {
        let now = Utc::now();
        let row = CommandRow {
            scope: "#foo".into(),
            command: "!q".into(),
            is_alias: false,
            alias_for: String::new(),
            template: "$(list)".into(),
            permission_level: 0,
            usage_counter: 0,
            items: "not json".into(),
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(
            CommandRecord::try_from(row),
            Err(StorageError::Serialization(_))
        ));
    }
}
