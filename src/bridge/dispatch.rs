//! Chat dispatch sink — the hand-off point into the hosting chat framework.
//!
//! The poll engine emits formatted notification texts here. In the binary
//! the sink is an mpsc channel drained by the CLI adapter; the hosting
//! framework's event queue would take its place in an embedded deployment.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

/// An outbound chat event carrying one formatted notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutbound {
    /// Message text, already formatted for the chat surface.
    pub text: String,
}

/// One-way, fire-and-forget sink for chat events.
///
/// Ordering is preserved per invocation sequence; delivery failures are the
/// sink's problem to log, never the caller's to handle.
#[async_trait]
pub trait DispatchSink: Send + Sync {
    /// Emit one formatted notification text.
    async fn emit(&self, text: String);
}

/// [`DispatchSink`] backed by an mpsc channel.
pub struct ChannelSink {
    tx: mpsc::Sender<ChatOutbound>,
}

impl ChannelSink {
    /// Wrap an mpsc sender as a dispatch sink.
    pub fn new(tx: mpsc::Sender<ChatOutbound>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl DispatchSink for ChannelSink {
    async fn emit(&self, text: String) {
        if let Err(e) = self.tx.send(ChatOutbound { text }).await {
            warn!(error = %e, "chat event queue closed, dropping notification");
        }
    }
}
