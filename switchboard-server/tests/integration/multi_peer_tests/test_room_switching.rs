use switchboard_core::SessionStatus;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{join_room, leave_room, offer};

#[tokio::test]
async fn test_switching_rooms_leaves_the_old_one() {
    init_tracing();

    let t = create_test_relay();
    let a = t.connect("alice").await;
    let b = t.connect("bob").await;
    let c = t.connect("carol").await;

    t.relay.signal(a, join_room("red")).await.unwrap();
    t.relay.signal(b, join_room("red")).await.unwrap();
    t.relay.signal(c, join_room("blue")).await.unwrap();
    t.settle().await;

    t.relay.signal(a, join_room("blue")).await.unwrap();
    t.settle().await;

    let left = t.signaling.sent_to_of_kind(&b, "user-left").await;
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].payload()["connectionId"], a.to_string());

    let joined = t.signaling.sent_to_of_kind(&c, "user-joined").await;
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].payload()["connectionId"], a.to_string());

    let session = t.relay.get_session(a).await.unwrap().unwrap();
    assert_eq!(session.room_id.as_ref().map(|r| r.as_str()), Some("blue"));

    // Old room peers are no longer reachable.
    t.relay.signal(a, offer(b, "X")).await.unwrap();
    t.settle().await;
    assert!(t.signaling.sent_to_of_kind(&b, "offer").await.is_empty());
}

#[tokio::test]
async fn test_rejoining_same_room_resends_roster_only() {
    init_tracing();

    let t = create_test_relay();
    let a = t.connect("alice").await;
    let b = t.connect("bob").await;

    t.relay.signal(a, join_room("demo")).await.unwrap();
    t.relay.signal(b, join_room("demo")).await.unwrap();
    t.relay.signal(b, join_room("demo")).await.unwrap();
    t.settle().await;

    assert_eq!(t.signaling.sent_to_of_kind(&a, "user-joined").await.len(), 1);
    assert_eq!(t.signaling.sent_to_of_kind(&b, "existing-members").await.len(), 2);
}

#[tokio::test]
async fn test_leave_room_keeps_session() {
    init_tracing();

    let t = create_test_relay();
    let a = t.connect("alice").await;
    let b = t.connect("bob").await;

    t.relay.signal(a, join_room("demo")).await.unwrap();
    t.relay.signal(b, join_room("demo")).await.unwrap();
    t.relay.signal(b, leave_room()).await.unwrap();
    t.settle().await;

    assert_eq!(t.signaling.sent_to_of_kind(&a, "user-left").await.len(), 1);

    let session = t.relay.get_session(b).await.unwrap().expect("session survives");
    assert_eq!(session.status, SessionStatus::Left);
    assert!(session.room_id.is_none());

    // Leaving twice changes nothing.
    t.relay.signal(b, leave_room()).await.unwrap();
    t.settle().await;
    assert_eq!(t.signaling.sent_to_of_kind(&a, "user-left").await.len(), 1);
}
