use switchboard_core::ConnectionId;
use switchboard_server::AuditKind;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{SIGNAL_TIMEOUT_MS, answer, join_room, offer};

#[tokio::test]
async fn test_offer_to_unknown_connection_is_dropped() {
    init_tracing();

    let t = create_test_relay();
    let a = t.connect("alice").await;
    t.relay.signal(a, join_room("demo")).await.unwrap();
    t.settle().await;
    t.signaling.clear().await;

    t.relay.signal(a, offer(ConnectionId::new(), "X")).await.unwrap();
    t.settle().await;

    assert!(t.signaling.all().await.is_empty());

    // The sender keeps working afterwards.
    let session = t.relay.get_session(a).await.unwrap().expect("sender still registered");
    assert!(session.is_in_room());

    assert!(t.audit.wait_for(AuditKind::SignalingServer, SIGNAL_TIMEOUT_MS).await);
    let misses = t.audit.of_kind(AuditKind::SignalingServer).await;
    assert!(misses.iter().any(|e| e.message.starts_with("Addressing miss")));
}

#[tokio::test]
async fn test_offer_across_rooms_is_dropped() {
    init_tracing();

    let t = create_test_relay();
    let a = t.connect("alice").await;
    let b = t.connect("bob").await;
    t.relay.signal(a, join_room("red")).await.unwrap();
    t.relay.signal(b, join_room("blue")).await.unwrap();
    t.settle().await;

    t.relay.signal(a, offer(b, "X")).await.unwrap();
    t.settle().await;

    assert!(t.signaling.of_kind("offer").await.is_empty());
}

#[tokio::test]
async fn test_signals_outside_a_room_are_dropped() {
    init_tracing();

    let t = create_test_relay();
    let a = t.connect("alice").await;
    let b = t.connect("bob").await;
    t.relay.signal(b, join_room("demo")).await.unwrap();
    t.settle().await;

    t.relay.signal(a, offer(b, "X")).await.unwrap();
    t.relay.signal(a, answer(b, "Y")).await.unwrap();
    t.settle().await;

    assert!(t.signaling.of_kind("offer").await.is_empty());
    assert!(t.signaling.of_kind("answer").await.is_empty());
}

#[tokio::test]
async fn test_offer_to_self_is_dropped() {
    init_tracing();

    let t = create_test_relay();
    let a = t.connect("alice").await;
    t.relay.signal(a, join_room("demo")).await.unwrap();
    t.relay.signal(a, offer(a, "X")).await.unwrap();
    t.settle().await;

    assert!(t.signaling.of_kind("offer").await.is_empty());
}

#[tokio::test]
async fn test_offer_to_departed_peer_is_dropped() {
    init_tracing();

    let t = create_test_relay();
    let a = t.connect("alice").await;
    let b = t.connect("bob").await;
    t.relay.signal(a, join_room("demo")).await.unwrap();
    t.relay.signal(b, join_room("demo")).await.unwrap();
    t.relay.disconnected(b).await.unwrap();

    t.relay.signal(a, offer(b, "X")).await.unwrap();
    t.settle().await;

    assert!(t.signaling.of_kind("offer").await.is_empty());
}
