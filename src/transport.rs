//! Outbound dispatch boundary
//!
//! The core only needs one capability from whatever chat client hosts it:
//! send a text to a channel and learn the message id it got. Everything else
//! (sessions, retries, rate limits) lives behind this trait.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::info;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `text` to the channel, returning the new message id.
    async fn send(&self, channel_id: i64, text: &str) -> Result<i64>;
}

/// Prints outbound commands instead of delivering them. Used by the CLI
/// driver and anywhere a real chat client is not wired in.
#[derive(Debug, Default)]
pub struct StdoutTransport {
    next_id: AtomicI64,
}

#[async_trait]
impl Transport for StdoutTransport {
    async fn send(&self, channel_id: i64, text: &str) -> Result<i64> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        info!("[Send] channel {} msg {}: {}", channel_id, id, text);
        println!(">> [{}] {}", channel_id, text);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stdout_transport_ids_increase() {
        let transport = StdoutTransport::default();
        let a = transport.send(1, "大10").await.unwrap();
        let b = transport.send(1, "小10").await.unwrap();
        assert!(b > a);
    }
}
