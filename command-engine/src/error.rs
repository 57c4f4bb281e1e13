//! Command engine error types and their user-facing rendering.

use dbot_core::{DbotError, HandlerError};
use storage::StorageError;
use thiserror::Error;

use crate::capability::CapabilityId;

#[derive(Error, Debug)]
pub enum CommandError {
    /// Unknown trigger. Never produces output.
    #[error("Unknown trigger: {0}")]
    NotFound(String),

    #[error("Alias chain starting at {trigger} loops or exceeds {hops} hops")]
    AliasCycleOrDepthExceeded { trigger: String, hops: usize },

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Invalid index: {0}")]
    InvalidIndex(String),

    #[error("Command already exists: {0}")]
    DuplicateTrigger(String),

    #[error("Command does not exist: {0}")]
    CommandNotFound(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] StorageError),

    #[error("No handler wired for capability {0}")]
    UnhandledCapability(CapabilityId),

    #[error("Capability failed: {0}")]
    Capability(String),
}

impl CommandError {
    /// Reply text for domain-validation failures; `None` for errors that stay silent in channel.
    pub fn user_reply(&self) -> Option<String> {
        match self {
            CommandError::AliasCycleOrDepthExceeded { trigger, .. } => Some(format!(
                "The command {} points to an alias loop or too many aliases!",
                trigger
            )),
            CommandError::InvalidIndex(token) => {
                Some(format!("{} is not a valid item number!", token))
            }
            CommandError::DuplicateTrigger(trigger) => {
                Some(format!("The command {} already exists!", trigger))
            }
            CommandError::CommandNotFound(trigger) => {
                Some(format!("The command {} doesn't exist!", trigger))
            }
            CommandError::PermissionDenied => {
                Some("You don't have permission to do that!".to_string())
            }
            CommandError::InvalidArgument(message) => Some(message.clone()),
            CommandError::NotFound(_)
            | CommandError::RateLimited { .. }
            | CommandError::PersistenceFailure(_)
            | CommandError::UnhandledCapability(_)
            | CommandError::Capability(_) => None,
        }
    }
}

impl From<CommandError> for DbotError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::PersistenceFailure(e) => DbotError::Database(e.to_string()),
            other => DbotError::Handler(HandlerError::Command(other.to_string())),
        }
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_have_replies() {
        assert_eq!(
            CommandError::DuplicateTrigger("!hello".into()).user_reply(),
            Some("The command !hello already exists!".to_string())
        );
        assert!(CommandError::InvalidIndex("x".into()).user_reply().is_some());
        assert!(CommandError::PermissionDenied.user_reply().is_some());
    }

    #[test]
    fn test_internal_errors_stay_silent() {
        assert!(CommandError::NotFound("!x".into()).user_reply().is_none());
        assert!(CommandError::UnhandledCapability(CapabilityId::Uptime)
            .user_reply()
            .is_none());
        assert!(
            CommandError::PersistenceFailure(StorageError::Database("down".into()))
                .user_reply()
                .is_none()
        );
    }

    #[test]
    fn test_into_dbot_error() {
        let err: DbotError = CommandError::PersistenceFailure(StorageError::Database("x".into())).into();
        assert!(matches!(err, DbotError::Database(_)));

        let err: DbotError = CommandError::UnhandledCapability(CapabilityId::Game).into();
        assert!(matches!(err, DbotError::Handler(HandlerError::Command(_))));
    }
}
