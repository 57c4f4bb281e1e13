//! Command repository: persistence and queries for channel commands.
//!
//! Uses SqlitePoolManager and the models (CommandRecord, CommandUpdate).
//! External: SQLite via sqlx; callers go through the CommandStore trait.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::command_record::CommandRow;
use crate::models::{CommandRecord, CommandUpdate};
use crate::repository::CommandStore;
use crate::sqlite_pool::SqlitePoolManager;

const SELECT_COLUMNS: &str = "scope, command, is_alias, alias_for, template, permission_level, \
     usage_counter, items, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteCommandStore {
    pool_manager: SqlitePoolManager,
}

impl SqliteCommandStore {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), sqlx::Error> {
        info!("Creating database tables if not exist");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS commands (
                scope TEXT NOT NULL,
                command TEXT NOT NULL COLLATE NOCASE,
                is_alias INTEGER NOT NULL DEFAULT 0,
                alias_for TEXT NOT NULL DEFAULT '',
                template TEXT NOT NULL DEFAULT '',
                permission_level INTEGER NOT NULL DEFAULT 0,
                usage_counter INTEGER NOT NULL DEFAULT 0,
                items TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (scope, command)
            )
            "#,
        )
        .execute(pool)
        .await?;

        info!("Database tables created successfully");
        Ok(())
    }
}

#[async_trait]
impl CommandStore for SqliteCommandStore {
    async fn find_command(
        &self,
        scope: &str,
        trigger: &str,
    ) -> Result<Option<CommandRecord>, StorageError> {
        let pool = self.pool_manager.pool();
        let sql = format!(
            "SELECT {} FROM commands WHERE scope = ? AND command = ?",
            SELECT_COLUMNS
        );

        let row: Option<CommandRow> = sqlx::query_as(&sql)
            .bind(scope)
            .bind(trigger)
            .fetch_optional(pool)
            .await?;

        row.map(CommandRecord::try_from).transpose()
    }

    async fn find_commands(
        &self,
        scope: &str,
        limit: Option<i64>,
    ) -> Result<Vec<CommandRecord>, StorageError> {
        let pool = self.pool_manager.pool();
        let mut sql = format!(
            "SELECT {} FROM commands WHERE scope = ? ORDER BY command ASC",
            SELECT_COLUMNS
        );

        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let rows: Vec<CommandRow> = sqlx::query_as(&sql).bind(scope).fetch_all(pool).await?;
        debug!(scope = %scope, count = rows.len(), "Retrieved commands");

        rows.into_iter().map(CommandRecord::try_from).collect()
    }

    async fn insert_command(&self, record: &CommandRecord) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();
        let items = serde_json::to_string(&record.items)?;

        let result = sqlx::query(
            r#"
            INSERT INTO commands (scope, command, is_alias, alias_for, template, permission_level, usage_counter, items, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.scope)
        .bind(&record.trigger)
        .bind(record.is_alias)
        .bind(&record.alias_for)
        .bind(&record.template)
        .bind(record.permission_level)
        .bind(record.usage_counter)
        .bind(&items)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(pool)
        .await;

        match result {
            Ok(_) => {
                info!(scope = %record.scope, trigger = %record.trigger, "Saved command");
                Ok(())
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                StorageError::AlreadyExists(format!("{} {}", record.scope, record.trigger)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_command(
        &self,
        scope: &str,
        trigger: &str,
        update: &CommandUpdate,
    ) -> Result<bool, StorageError> {
        let pool = self.pool_manager.pool();
        let items = update.items.as_ref().map(serde_json::to_string).transpose()?;

        let mut sql = String::from("UPDATE commands SET updated_at = ?");
        if update.template.is_some() {
            sql.push_str(", template = ?");
        }
        if update.permission_level.is_some() {
            sql.push_str(", permission_level = ?");
        }
        if items.is_some() {
            sql.push_str(", items = ?");
        }
        sql.push_str(" WHERE scope = ? AND command = ?");

        let mut query = sqlx::query(&sql).bind(Utc::now());
        if let Some(template) = &update.template {
            query = query.bind(template);
        }
        if let Some(level) = update.permission_level {
            query = query.bind(level);
        }
        if let Some(items) = &items {
            query = query.bind(items);
        }

        let result = query.bind(scope).bind(trigger).execute(pool).await?;
        debug!(scope = %scope, trigger = %trigger, rows = result.rows_affected(), "Updated command");

        Ok(result.rows_affected() > 0)
    }

    async fn increment_counter(
        &self,
        scope: &str,
        trigger: &str,
        delta: i64,
    ) -> Result<Option<i64>, StorageError> {
        let pool = self.pool_manager.pool();

        let value: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE commands SET usage_counter = usage_counter + ?, updated_at = ?
            WHERE scope = ? AND command = ?
            RETURNING usage_counter
            "#,
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(scope)
        .bind(trigger)
        .fetch_optional(pool)
        .await?;

        Ok(value.map(|v| v.0))
    }

    async fn delete_command(&self, scope: &str, trigger: &str) -> Result<bool, StorageError> {
        let pool = self.pool_manager.pool();

        let result = sqlx::query("DELETE FROM commands WHERE scope = ? AND command = ?")
            .bind(scope)
            .bind(trigger)
            .execute(pool)
            .await?;

        info!(scope = %scope, trigger = %trigger, deleted = result.rows_affected(), "Deleted command");
        Ok(result.rows_affected() > 0)
    }
}
