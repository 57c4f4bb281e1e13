//! Handler-chain adapter for the dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use dbot_core::{Handler, HandlerResponse, Message, Result};
use tracing::{error, instrument};

use crate::dispatcher::{DispatchOutcome, Dispatcher};

/// Runs every message through the [`Dispatcher`]. Replies are already delivered by the time
/// this returns; the chain only sees the outcome.
pub struct CommandHandler {
    dispatcher: Arc<Dispatcher>,
}

impl CommandHandler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message), fields(channel = %message.channel, message_id = %message.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        match self
            .dispatcher
            .dispatch(&message.channel, &message.user, &message.content)
            .await
        {
            Ok(DispatchOutcome::NotFound) => Ok(HandlerResponse::Continue),
            Ok(DispatchOutcome::RateLimited { .. }) => Ok(HandlerResponse::Stop),
            Ok(outcome) => Ok(match outcome.reply() {
                Some(text) => HandlerResponse::Reply(text.to_string()),
                None => HandlerResponse::Stop,
            }),
            Err(e) => {
                error!(
                    channel = %message.channel,
                    user = %message.user.username,
                    error = %e,
                    "Command dispatch failed"
                );
                Err(e.into())
            }
        }
    }
}
