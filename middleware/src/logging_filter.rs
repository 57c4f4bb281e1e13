//! Handlers for logging and for dropping messages that cannot be commands.

use async_trait::async_trait;
use dbot_core::{Handler, HandlerResponse, Message, Result};
use tracing::{debug, info, instrument};

/// Every trigger starts with this character.
pub const TRIGGER_PREFIX: char = '!';

/// Logs each message in before() and the response in after(); always continues.
pub struct LoggingHandler;

#[async_trait]
impl Handler for LoggingHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        info!(
            channel = %message.channel,
            username = %message.user.username,
            message_content = %message.content,
            "Received message"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        debug!(
            message_id = %message.id,
            channel = %message.channel,
            response = ?response,
            "Processed message"
        );
        Ok(())
    }
}

/// Stops the chain for the bot's own messages and for messages whose first token is not a trigger.
pub struct TriggerFilterHandler {
    bot_username: String,
}

impl TriggerFilterHandler {
    pub fn new(bot_username: impl Into<String>) -> Self {
        Self {
            bot_username: bot_username.into().to_lowercase(),
        }
    }
}

#[async_trait]
impl Handler for TriggerFilterHandler {
    async fn before(&self, message: &Message) -> Result<bool> {
        if message.user.username.eq_ignore_ascii_case(&self.bot_username) {
            debug!(channel = %message.channel, "Ignoring own message");
            return Ok(false);
        }
        let is_trigger = message
            .first_token()
            .is_some_and(|token| token.len() > 1 && token.starts_with(TRIGGER_PREFIX));
        Ok(is_trigger)
    }
}
