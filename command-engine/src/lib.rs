//! # Command engine
//!
//! Chat-trigger command execution for a channel bot: resolution of triggers and aliases, per
//! channel cooldowns, template rendering, list-backed commands, usage counters and the
//! `!commands` management capability.
//!
//! ## Modules
//!
//! - [`resolver`] – trigger and alias resolution
//! - [`rate_limiter`] – per (channel, command) cooldowns
//! - [`template`] – placeholder substitution
//! - [`list`] – list-backed commands
//! - [`counter`] – usage counters
//! - [`dispatcher`] – ties the above together for one message
//! - [`capability`], [`defaults`], [`commands`] – default triggers and their handlers

pub mod capability;
pub mod commands;
pub mod config;
pub mod counter;
pub mod defaults;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod list;
pub mod permission;
pub mod rate_limiter;
pub mod resolver;
pub mod template;

pub use capability::{CapabilityHandler, CapabilityId, CapabilityInvocation, CapabilityRegistry};
pub use commands::CommandsCapability;
pub use config::EngineConfig;
pub use counter::CounterStore;
pub use defaults::{DefaultCommandTable, DefaultTarget};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{CommandError, Result};
pub use handler::CommandHandler;
pub use list::ListEngine;
pub use permission::{PermissionProvider, StaticPermissionProvider};
pub use rate_limiter::{RateLimiter, Reservation};
pub use resolver::{Resolution, ResolvedCommand, Resolver};
