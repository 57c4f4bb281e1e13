//! Cross-cutting chain handlers: message logging and trigger filtering.

mod logging_filter;

pub use logging_filter::{LoggingHandler, TriggerFilterHandler, TRIGGER_PREFIX};

#[cfg(test)]
mod test;
