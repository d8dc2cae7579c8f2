//! ntfy-bridge — a chat ↔ ntfy pub/sub bridge.
//!
//! Single Rust binary. Polls a ntfy topic into a chat event stream and
//! publishes allow-listed chat commands back out to a ntfy topic.
//!
//! See `DESIGN.md` for architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod logging;
pub mod ntfy;

pub mod bridge;
pub mod chat;

pub mod adapters;
