//! # dbot-core
//!
//! Core types and traits for the chat bot: [`Bot`], [`Handler`], message and user types,
//! and tracing initialization. Transport-agnostic; used by handler-chain, middleware and command-engine.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{Bot, ConsoleBot};
pub use error::{DbotError, HandlerError, Result};
pub use logger::init_tracing;
pub use types::{Handler, HandlerResponse, Message, MessageDirection, User};
