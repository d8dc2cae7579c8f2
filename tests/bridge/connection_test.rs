//! Tests for `src/bridge/connection.rs` — one-shot guarded setup.

use std::sync::Arc;

use ntfy_bridge::bridge::ConnectionGuard;

#[tokio::test]
async fn first_call_performs_setup_later_calls_observe_it() {
    let guard = ConnectionGuard::new();
    assert!(!guard.is_connected().await);

    assert!(guard.ensure_connection().await, "first call sets up");
    assert!(!guard.ensure_connection().await, "second call is a no-op");
    assert!(guard.is_connected().await);
}

#[tokio::test]
async fn concurrent_callers_produce_exactly_one_setup() {
    let guard = Arc::new(ConnectionGuard::new());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let guard = Arc::clone(&guard);
        handles.push(tokio::spawn(
            async move { guard.ensure_connection().await },
        ));
    }

    let mut setups: i32 = 0;
    for handle in handles {
        if handle.await.expect("task completes") {
            setups = setups.saturating_add(1);
        }
    }

    assert_eq!(setups, 1, "exactly one caller performs the setup");
    assert!(guard.is_connected().await);
}
