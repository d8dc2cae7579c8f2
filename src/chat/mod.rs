//! Chat command surface.
//!
//! The hosting chat framework is an external collaborator; what crosses
//! the boundary is a [`ChatCommandEvent`] per registered command plus an
//! ordered list of reply strings coming back. Handlers collect their
//! replies eagerly so the host can drain them as a finite sequence.

pub mod commands;

/// One inbound chat command delivered by the host framework.
#[derive(Debug, Clone)]
pub struct ChatCommandEvent {
    /// Invoking sender's identifier, compared against the allow-list.
    pub session_id: String,
    /// Sender's display name, used in logs and the diagnostic message.
    pub sender_name: String,
    /// The raw text of the command message.
    pub message_str: String,
}

impl ChatCommandEvent {
    /// Build an event from its three parts.
    pub fn new(session_id: &str, sender_name: &str, message_str: &str) -> Self {
        Self {
            session_id: session_id.to_owned(),
            sender_name: sender_name.to_owned(),
            message_str: message_str.to_owned(),
        }
    }
}
