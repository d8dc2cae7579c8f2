//! Tests for `src/bridge/outbound.rs` — the authorization gate and the
//! publish attempt bookkeeping.

use std::sync::Arc;

use ntfy_bridge::bridge::outbound::GateOutcome;
use ntfy_bridge::bridge::{ConnectionGuard, OutboundGate};
use ntfy_bridge::chat::ChatCommandEvent;
use ntfy_bridge::config::NtfyConfig;
use ntfy_bridge::ntfy::NtfyError;

use crate::support::CountingPublisher;

fn config() -> NtfyConfig {
    NtfyConfig {
        host: "https://ntfy.example".to_owned(),
        token: "tk_secret".to_owned(),
        subscribe_topic: "inbox".to_owned(),
        publish_topic: "outbox".to_owned(),
        sender: "u1,u2".to_owned(),
        receiver: "chat".to_owned(),
    }
}

fn gate_with(publisher: Arc<CountingPublisher>, config: &NtfyConfig) -> OutboundGate {
    OutboundGate::new(publisher, Arc::new(ConnectionGuard::new()), config)
}

#[tokio::test]
async fn unlisted_sender_is_denied_without_a_publish() {
    let publisher = Arc::new(CountingPublisher::succeeding());
    let gate = gate_with(Arc::clone(&publisher), &config());
    let event = ChatCommandEvent::new("u3", "Mallory", "ntfy pwned");

    let outcome = gate.try_publish(&event, &event.message_str).await;

    assert!(matches!(outcome, GateOutcome::Denied));
    assert_eq!(publisher.attempts(), 0);
}

#[tokio::test]
async fn listed_sender_publishes_exactly_once() {
    let publisher = Arc::new(CountingPublisher::succeeding());
    let gate = gate_with(Arc::clone(&publisher), &config());
    let event = ChatCommandEvent::new("u1", "Alice", "ntfy deploy done");

    let outcome = gate.try_publish(&event, &event.message_str).await;

    assert!(matches!(outcome, GateOutcome::Attempted(Ok(_))));
    assert_eq!(publisher.attempts(), 1);
}

#[tokio::test]
async fn trigger_word_is_stripped_before_publish() {
    let publisher = Arc::new(CountingPublisher::succeeding());
    let gate = gate_with(Arc::clone(&publisher), &config());
    let event = ChatCommandEvent::new("u1", "Alice", "ntfy deploy done");

    gate.try_publish(&event, &event.message_str).await;

    let (topic, body) = publisher.last().expect("one publish recorded");
    assert_eq!(topic, "outbox");
    assert_eq!(body, "deploy done");
}

#[tokio::test]
async fn empty_topic_aborts_without_a_publish() {
    let mut config = config();
    config.publish_topic = "  ,backup".to_owned();
    let publisher = Arc::new(CountingPublisher::succeeding());
    let gate = gate_with(Arc::clone(&publisher), &config);
    let event = ChatCommandEvent::new("u1", "Alice", "ntfy hello");

    let outcome = gate.try_publish(&event, &event.message_str).await;

    assert!(matches!(outcome, GateOutcome::NoTopic));
    assert_eq!(publisher.attempts(), 0);
}

#[tokio::test]
async fn first_topic_segment_is_used() {
    let mut config = config();
    config.publish_topic = "primary, backup".to_owned();
    let publisher = Arc::new(CountingPublisher::succeeding());
    let gate = gate_with(Arc::clone(&publisher), &config);
    assert_eq!(gate.topic(), Some("primary"));

    let event = ChatCommandEvent::new("u2", "Bob", "ntfy ping");
    gate.try_publish(&event, &event.message_str).await;

    let (topic, _) = publisher.last().expect("one publish recorded");
    assert_eq!(topic, "primary");
}

#[tokio::test]
async fn server_rejection_surfaces_status_and_body() {
    let publisher = Arc::new(CountingPublisher::rejecting(403));
    let gate = gate_with(Arc::clone(&publisher), &config());
    let event = ChatCommandEvent::new("u1", "Alice", "ntfy hello");

    let outcome = gate.try_publish(&event, &event.message_str).await;

    match outcome {
        GateOutcome::Attempted(Err(NtfyError::Rejected { status, body })) => {
            assert_eq!(status, 403);
            assert_eq!(body, "denied by server");
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
    assert_eq!(publisher.attempts(), 1);
}

#[tokio::test]
async fn authorized_publish_establishes_the_shared_connection() {
    let publisher = Arc::new(CountingPublisher::succeeding());
    let connection = Arc::new(ConnectionGuard::new());
    let gate = OutboundGate::new(publisher, Arc::clone(&connection), &config());
    let event = ChatCommandEvent::new("u1", "Alice", "ntfy hello");

    assert!(!connection.is_connected().await);
    gate.try_publish(&event, &event.message_str).await;
    assert!(connection.is_connected().await);
}
