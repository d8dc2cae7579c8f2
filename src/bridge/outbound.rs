//! Outbound gate: sender authorization and ntfy publishing.
//!
//! Chat commands land here. The gate checks the invoking sender against
//! the allow-list, strips the trigger word from the body, resolves the
//! publish topic, and performs exactly one publish attempt per authorized
//! invocation. Denials are silent: a warning is logged, nothing is sent,
//! and the sender gets no reply.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::bridge::connection::ConnectionGuard;
use crate::chat::ChatCommandEvent;
use crate::config::NtfyConfig;
use crate::ntfy::{NtfyClient, NtfyError};

/// Trigger word stripped (first occurrence only) from outbound bodies.
pub const TRIGGER_WORD: &str = "ntfy";

/// Publishes one message body to one topic.
///
/// Implemented by [`NtfyClient`]; tests substitute counting stubs.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `body` to `topic`, returning the server's response body.
    ///
    /// # Errors
    ///
    /// Returns [`NtfyError`] on transport failure or server rejection.
    async fn publish(&self, topic: &str, body: &str) -> Result<String, NtfyError>;
}

#[async_trait]
impl Publisher for NtfyClient {
    async fn publish(&self, topic: &str, body: &str) -> Result<String, NtfyError> {
        NtfyClient::publish(self, topic, body).await
    }
}

/// Outcome of pushing a chat command through the gate.
#[derive(Debug)]
pub enum GateOutcome {
    /// Sender not on the allow-list; nothing was sent, no reply owed.
    Denied,
    /// Publish topic resolved to empty; nothing was sent, no reply owed.
    NoTopic,
    /// One publish attempt was made.
    Attempted(Result<String, NtfyError>),
}

/// Authorizes and publishes outbound messages.
pub struct OutboundGate {
    publisher: Arc<dyn Publisher>,
    connection: Arc<ConnectionGuard>,
    allowed_senders: HashSet<String>,
    publish_topic: Option<String>,
}

impl OutboundGate {
    /// Build a gate from validated config.
    pub fn new(
        publisher: Arc<dyn Publisher>,
        connection: Arc<ConnectionGuard>,
        config: &NtfyConfig,
    ) -> Self {
        Self {
            publisher,
            connection,
            allowed_senders: config.authorized_senders(),
            publish_topic: config.resolved_publish_topic(),
        }
    }

    /// The resolved publish topic, if any.
    pub fn topic(&self) -> Option<&str> {
        self.publish_topic.as_deref()
    }

    /// Push one chat command body through the gate.
    ///
    /// Order of checks: allow-list membership (exact, on the sender
    /// identifier), trigger-word stripping, topic resolution, shared
    /// connection setup, then the single publish attempt.
    pub async fn try_publish(&self, event: &ChatCommandEvent, body: &str) -> GateOutcome {
        info!(
            sender = %event.sender_name,
            id = %event.session_id,
            "outbound publish requested"
        );

        if !self.allowed_senders.contains(event.session_id.as_str()) {
            warn!(
                sender = %event.sender_name,
                id = %event.session_id,
                "sender not allow-listed, denying publish"
            );
            return GateOutcome::Denied;
        }

        let message = strip_trigger(body);

        let Some(topic) = self.publish_topic.as_deref() else {
            warn!("publish topic resolves to empty, dropping message");
            return GateOutcome::NoTopic;
        };

        self.connection.ensure_connection().await;

        let result = self.publisher.publish(topic, &message).await;
        match &result {
            Ok(response) => info!(topic, response = %response, "ntfy publish succeeded"),
            Err(NtfyError::Rejected { status, body }) => {
                error!(topic, status, body = %body, "ntfy publish rejected");
            }
            Err(e) => error!(topic, error = %e, "ntfy publish failed"),
        }
        GateOutcome::Attempted(result)
    }
}

/// Remove the first occurrence of the trigger word and trim whitespace.
pub fn strip_trigger(body: &str) -> String {
    body.replacen(TRIGGER_WORD, "", 1).trim().to_owned()
}
