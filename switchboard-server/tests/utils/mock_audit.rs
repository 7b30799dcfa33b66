use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use switchboard_server::{AuditEvent, AuditKind, AuditSink, AuditSinkError};
use tokio::sync::Mutex;

/// Audit sink that records every event for later assertions.
#[derive(Clone, Default)]
pub struct MockAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MockAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().await.clone()
    }

    pub async fn of_kind(&self, kind: AuditKind) -> Vec<AuditEvent> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// Audit delivery is asynchronous; poll until an event of `kind` shows up.
    pub async fn wait_for(&self, kind: AuditKind, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(timeout_ms);

        loop {
            if self.events.lock().await.iter().any(|e| e.kind == kind) {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl AuditSink for MockAuditSink {
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditSinkError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}
