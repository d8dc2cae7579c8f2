//! Lazy, mutually-exclusive connection establishment.
//!
//! Both the polling path and the outbound path call
//! [`ConnectionGuard::ensure_connection`] before touching the ntfy host.
//! The check-then-act runs entirely under one `tokio::sync::Mutex`, so
//! concurrent callers serialize and exactly one performs the setup.
//!
//! There is no separate "connecting" state and no reconnect: the flag flips
//! unconnected→connected at most once per process lifetime.

use tokio::sync::Mutex;
use tracing::info;

/// Guards the one-shot connection setup shared by both bridge directions.
pub struct ConnectionGuard {
    connected: Mutex<bool>,
}

impl ConnectionGuard {
    /// Create a guard in the unconnected state.
    pub fn new() -> Self {
        Self {
            connected: Mutex::new(false),
        }
    }

    /// Establish the connection if it has not been established yet.
    ///
    /// Returns `true` if this call performed the setup, `false` if the
    /// connection was already up. Callers racing here block on the lock
    /// until the winner finishes, then observe the set flag.
    pub async fn ensure_connection(&self) -> bool {
        let mut connected = self.connected.lock().await;
        if *connected {
            return false;
        }
        *connected = true;
        info!("ntfy connection established");
        true
    }

    /// Whether the connection has been established.
    pub async fn is_connected(&self) -> bool {
        *self.connected.lock().await
    }
}

impl Default for ConnectionGuard {
    fn default() -> Self {
        Self::new()
    }
}
