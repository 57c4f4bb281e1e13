//! # Handler chain
//!
//! Runs every handler's `before` in order, then `handle` until one returns Stop or Reply, then every
//! `after` in reverse order. A `before` returning false stops the chain with Stop and skips the
//! handle and after phases.

use dbot_core::{Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler.
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the three phases for one message. Returns the first Stop or Reply, else Continue.
    /// Errors from any handler end the chain immediately.
    #[instrument(skip_all, fields(channel = %message.channel, message_id = %message.id))]
    pub async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        debug!(
            channel = %message.channel,
            user = %message.user.username,
            "step: handler_chain started"
        );

        for handler in &self.handlers {
            if !handler.before(message).await? {
                let handler_name = std::any::type_name_of_val(handler.as_ref());
                info!(
                    channel = %message.channel,
                    handler = %handler_name,
                    "step: before returned false, chain stopped"
                );
                return Ok(HandlerResponse::Stop);
            }
        }

        let mut final_response = HandlerResponse::Continue;
        for handler in &self.handlers {
            let handler_name = std::any::type_name_of_val(handler.as_ref());
            let response = handler.handle(message).await?;
            debug!(handler = %handler_name, response = ?response, "step: handler done");

            match response {
                HandlerResponse::Stop | HandlerResponse::Reply(_) => {
                    final_response = response;
                    break;
                }
                HandlerResponse::Continue | HandlerResponse::Ignore => continue,
            }
        }

        for handler in self.handlers.iter().rev() {
            handler.after(message, &final_response).await?;
        }

        debug!(
            channel = %message.channel,
            response = ?final_response,
            "step: handler_chain finished"
        );
        Ok(final_response)
    }
}

// Tests live in tests/handler_chain_test.rs
