//! ntfy HTTP client: topic polling and message publishing.
//!
//! Wraps a `reqwest::Client` for the two calls the bridge makes:
//! - `GET {host}/{topic}/json?poll=1&since={ts}` — drain cached messages
//! - `GET {host}/{topic}/publish?token={token}&message={body}` — publish
//!
//! The poll response is line-delimited JSON; only records with
//! `event == "message"` are notifications, the rest (`open`, `keepalive`)
//! are stream chatter and dropped here.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Maximum characters of a rejection body kept for user-visible errors.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// ntfy transport and protocol errors.
#[derive(Debug, Error)]
pub enum NtfyError {
    /// Network-level failure talking to the ntfy host.
    #[error("ntfy request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The ntfy host answered with a non-success status.
    #[error("ntfy rejected the request ({status}): {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },
}

/// One notification record from a topic poll.
///
/// Field presence in ntfy's JSON varies by event type, so everything except
/// `time` and `event` is optional with accessors providing the defaults the
/// dispatch format expects.
#[derive(Debug, Clone, Deserialize)]
pub struct NtfyMessage {
    /// Unix timestamp (seconds) the message was published.
    pub time: f64,
    /// Record type: "message", "open", "keepalive".
    #[serde(default)]
    pub event: String,
    /// Sender identifier, when the publisher supplied one.
    #[serde(default)]
    pub sender: Option<String>,
    /// Message title, used as the sender's display name.
    #[serde(default)]
    pub title: Option<String>,
    /// Message body.
    #[serde(default)]
    pub message: Option<String>,
}

impl NtfyMessage {
    /// Sender identifier, defaulting to `"unknown"`.
    pub fn sender_id(&self) -> &str {
        self.sender.as_deref().unwrap_or("unknown")
    }

    /// Sender display name, defaulting to `"未知发送者"`.
    pub fn sender_name(&self) -> &str {
        self.title.as_deref().unwrap_or("未知发送者")
    }

    /// Message body, defaulting to the empty string.
    pub fn body(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/// HTTP client for one ntfy host.
pub struct NtfyClient {
    inner: reqwest::Client,
    host: String,
    token: String,
    subscribe_topic: String,
}

impl NtfyClient {
    /// Create a client for the given host, token, and inbound topic.
    ///
    /// The host is used as-is (trailing slashes trimmed); it must already
    /// have passed config validation.
    pub fn new(host: &str, token: &str, subscribe_topic: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
            subscribe_topic: subscribe_topic.to_owned(),
        }
    }

    /// Poll the subscribe topic for messages published strictly after
    /// `since` (unix seconds).
    ///
    /// Scheduled (not-yet-delivered) messages are excluded unless
    /// `include_scheduled` is set. Returns only `message` records, in the
    /// order the server sent them.
    ///
    /// # Errors
    ///
    /// Returns [`NtfyError::Transport`] on network failure and
    /// [`NtfyError::Rejected`] on a non-success status.
    pub async fn fetch_messages(
        &self,
        since: f64,
        include_scheduled: bool,
    ) -> Result<Vec<NtfyMessage>, NtfyError> {
        let url = format!("{}/{}/json", self.host, self.subscribe_topic);
        let mut query: Vec<(&str, String)> =
            vec![("poll", "1".to_owned()), ("since", format!("{since}"))];
        if include_scheduled {
            query.push(("sched", "1".to_owned()));
        }

        let response = self
            .inner
            .get(&url)
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(NtfyError::Rejected {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let messages: Vec<NtfyMessage> = body
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<NtfyMessage>(line) {
                Ok(msg) => Some(msg),
                Err(e) => {
                    debug!(error = %e, "skipping unparseable poll record");
                    None
                }
            })
            .filter(|msg| msg.event == "message")
            .collect();

        Ok(messages)
    }

    /// Publish `body` to `topic` on this client's host.
    ///
    /// Auth and payload travel as query parameters, matching ntfy's
    /// GET-publish form.
    ///
    /// # Errors
    ///
    /// Returns [`NtfyError::Transport`] on network failure and
    /// [`NtfyError::Rejected`] (with the truncated response body) on a
    /// non-success status.
    pub async fn publish(&self, topic: &str, body: &str) -> Result<String, NtfyError> {
        let url = format!("{}/{}/publish", self.host, topic);
        let response = self
            .inner
            .get(&url)
            .query(&[("token", self.token.as_str()), ("message", body)])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(NtfyError::Rejected {
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }
        Ok(text)
    }
}

/// Truncate a response body for inclusion in error messages.
fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        let kept: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{kept}...[truncated]")
    } else {
        body.to_owned()
    }
}
