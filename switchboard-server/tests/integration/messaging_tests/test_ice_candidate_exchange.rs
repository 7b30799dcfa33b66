use serde_json::Value;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{ice_candidate, join_room};

#[tokio::test]
async fn test_ice_candidates_forwarded_both_ways() {
    init_tracing();

    let t = create_test_relay();
    let a = t.connect("alice").await;
    let b = t.connect("bob").await;
    t.relay.signal(a, join_room("demo")).await.unwrap();
    t.relay.signal(b, join_room("demo")).await.unwrap();

    t.relay
        .signal(a, ice_candidate(b, Some("candidate:1 1 UDP 2122260223 10.0.0.1 5000 typ host")))
        .await
        .unwrap();
    t.relay
        .signal(b, ice_candidate(a, Some("candidate:2 1 UDP 2122260223 10.0.0.2 5001 typ host")))
        .await
        .unwrap();
    t.settle().await;

    let to_b = t.signaling.sent_to_of_kind(&b, "ice-candidate").await;
    assert_eq!(to_b.len(), 1);
    assert_eq!(to_b[0].payload()["fromConnectionId"], a.to_string());
    assert!(
        to_b[0].payload()["candidate"]["candidate"]
            .as_str()
            .unwrap()
            .contains("10.0.0.1")
    );

    let to_a = t.signaling.sent_to_of_kind(&a, "ice-candidate").await;
    assert_eq!(to_a.len(), 1);
    assert_eq!(to_a[0].payload()["fromConnectionId"], b.to_string());
}

#[tokio::test]
async fn test_end_of_candidates_marker_is_forwarded_as_null() {
    init_tracing();

    let t = create_test_relay();
    let a = t.connect("alice").await;
    let b = t.connect("bob").await;
    t.relay.signal(a, join_room("demo")).await.unwrap();
    t.relay.signal(b, join_room("demo")).await.unwrap();

    t.relay.signal(a, ice_candidate(b, None)).await.unwrap();
    t.settle().await;

    let to_b = t.signaling.sent_to_of_kind(&b, "ice-candidate").await;
    assert_eq!(to_b.len(), 1);
    assert_eq!(to_b[0].payload()["candidate"], Value::Null);
}
