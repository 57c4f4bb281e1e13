//! Bot abstraction for delivering text to a channel.
//!
//! [`Bot`] trait is transport-agnostic; [`ConsoleBot`] implements it by writing lines to a writer (stdout by default).

use crate::error::{DbotError, Result};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

/// Delivers text to a channel. Fire-and-forget: callers log failures and move on.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given channel.
    async fn send_message(&self, channel: &str, text: &str) -> Result<()>;
}

/// Line-oriented transport: each delivery is written as `[<channel>] <text>`.
pub struct ConsoleBot {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleBot {
    /// Writes deliveries to stdout.
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

/// Formats one delivered line. Used by ConsoleBot.
pub fn format_delivery(channel: &str, text: &str) -> String {
    format!("[{}] {}", channel, text)
}

#[async_trait]
impl Bot for ConsoleBot {
    async fn send_message(&self, channel: &str, text: &str) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| DbotError::Bot(format!("console writer poisoned: {}", e)))?;
        writeln!(writer, "{}", format_delivery(channel, text))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_format_delivery() {
        assert_eq!(format_delivery("#foo", "hi"), "[#foo] hi");
    }

    #[tokio::test]
    async fn test_console_bot_writes_lines() {
        let buf = SharedBuf::default();
        let bot = ConsoleBot::with_writer(Box::new(buf.clone()));

        bot.send_message("#foo", "hello").await.unwrap();
        bot.send_message("#bar", "world").await.unwrap();

        let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(out, "[#foo] hello\n[#bar] world\n");
    }
}
