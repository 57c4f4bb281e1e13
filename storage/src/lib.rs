//! Storage crate: command persistence and repository abstractions.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – CommandRecord, CommandUpdate
//! - [`repository`] – CommandStore trait
//! - [`command_repo`] – SqliteCommandStore (SQLite)
//! - [`memory_store`] – InMemoryCommandStore
//! - [`sqlite_pool`] – SqlitePoolManager

mod command_repo;
mod error;
mod memory_store;
mod models;
mod repository;
mod sqlite_pool;

pub use command_repo::SqliteCommandStore;
pub use error::StorageError;
pub use memory_store::InMemoryCommandStore;
pub use models::{CommandRecord, CommandUpdate};
pub use repository::CommandStore;
pub use sqlite_pool::SqlitePoolManager;
