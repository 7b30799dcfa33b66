pub mod multi_peer_tests;

use std::sync::Arc;
use tracing::Level;

use switchboard_core::ConnectionId;
use switchboard_server::{AuditEmitter, RelayHandle};

use crate::utils::{MockAuditSink, MockSignalingOutput, identity};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A relay task wired to capturing mocks.
pub struct TestRelay {
    pub relay: RelayHandle,
    pub signaling: MockSignalingOutput,
    pub audit: MockAuditSink,
}

impl TestRelay {
    /// Registers a new authenticated connection for `user`.
    pub async fn connect(&self, user: &str) -> ConnectionId {
        let id = ConnectionId::new();
        self.relay
            .register(id, identity(user))
            .await
            .expect("relay running");
        id
    }

    /// Waits until every command sent so far has been handled.
    pub async fn settle(&self) {
        self.relay.list_sessions().await.expect("relay running");
    }
}

pub fn create_test_relay() -> TestRelay {
    let signaling = MockSignalingOutput::new();
    let audit = MockAuditSink::new();
    let (emitter, _) = AuditEmitter::spawn(Arc::new(audit.clone()), 256);
    let (relay, _) = RelayHandle::spawn(Arc::new(signaling.clone()), emitter);

    TestRelay {
        relay,
        signaling,
        audit,
    }
}
