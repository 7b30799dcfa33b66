use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{chat, file_meta_raw, join_room};

#[tokio::test]
async fn test_chat_reaches_room_except_sender() {
    init_tracing();

    let t = create_test_relay();
    let a = t.connect("alice").await;
    let b = t.connect("bob").await;
    let c = t.connect("carol").await;
    let outsider = t.connect("mallory").await;
    for id in [a, b, c] {
        t.relay.signal(id, join_room("demo")).await.unwrap();
    }
    t.relay.signal(outsider, join_room("other")).await.unwrap();
    t.settle().await;

    t.relay.signal(a, chat("hello", 1_700_000_000_000)).await.unwrap();
    t.settle().await;

    for id in [b, c] {
        let got = t.signaling.sent_to_of_kind(&id, "chat-message").await;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].payload()["userId"], "alice");
        assert_eq!(got[0].payload()["message"], "hello");
        assert_eq!(got[0].payload()["timestamp"], 1_700_000_000_000_i64);
    }
    assert!(t.signaling.sent_to_of_kind(&a, "chat-message").await.is_empty());
    assert!(t.signaling.sent_to_of_kind(&outsider, "chat-message").await.is_empty());
}

#[tokio::test]
async fn test_file_meta_is_forwarded_unmodified() {
    init_tracing();

    let t = create_test_relay();
    let a = t.connect("alice").await;
    let b = t.connect("bob").await;
    t.relay.signal(a, join_room("demo")).await.unwrap();
    t.relay.signal(b, join_room("demo")).await.unwrap();

    let meta = r#"{"name":"report.pdf","size":10240,"mime":"application/pdf","chunks":[0,1]}"#;
    t.relay.signal(a, file_meta_raw(meta)).await.unwrap();
    t.settle().await;

    let got = t.signaling.sent_to_of_kind(&b, "file-meta").await;
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].text, format!(r#"{{"type":"file-meta","payload":{meta}}}"#));
    assert!(t.signaling.sent_to_of_kind(&a, "file-meta").await.is_empty());
}

#[tokio::test]
async fn test_chat_outside_room_goes_nowhere() {
    init_tracing();

    let t = create_test_relay();
    let a = t.connect("alice").await;
    let _b = t.connect("bob").await;
    t.settle().await;
    t.signaling.clear().await;

    t.relay.signal(a, chat("anyone?", 1)).await.unwrap();
    t.settle().await;

    assert!(t.signaling.all().await.is_empty());
}
