//! Bridge core: inbound polling, outbound gating, shared connection state.
//!
//! The poll engine runs as a background Tokio task, ticking at a
//! configurable interval. Each tick drains the ntfy topic past the
//! watermark and forwards accepted messages into the chat dispatch sink.
//! The outbound gate handles the reverse direction for allow-listed chat
//! senders. Both paths share one lazily-established connection.

pub mod connection;
pub mod dispatch;
pub mod outbound;
pub mod poller;

pub use connection::ConnectionGuard;
pub use dispatch::{ChannelSink, ChatOutbound, DispatchSink};
pub use outbound::{OutboundGate, Publisher};
pub use poller::{NotificationSource, PollEngine};
