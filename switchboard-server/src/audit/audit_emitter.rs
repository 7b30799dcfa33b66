use crate::audit::{AuditEvent, AuditSink};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Non-blocking handle onto the audit queue.
///
/// `emit` uses `try_send`; when the bounded queue is full the event is dropped and counted.
#[derive(Clone)]
pub struct AuditEmitter {
    tx: mpsc::Sender<AuditEvent>,
    dropped: Arc<AtomicU64>,
}

impl AuditEmitter {
    /// Starts the drain task and returns the emitter feeding it.
    pub fn spawn(sink: Arc<dyn AuditSink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(drain(rx, sink));
        (
            Self {
                tx,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            handle,
        )
    }

    pub fn emit(&self, event: AuditEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(kind = ?event.kind, dropped, "Audit queue full, dropping event");
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Audit queue closed, dropping event");
            }
        }
    }

    #[cfg(test)]
    fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

async fn drain(mut rx: mpsc::Receiver<AuditEvent>, sink: Arc<dyn AuditSink>) {
    while let Some(event) = rx.recv().await {
        if let Err(e) = sink.record(&event).await {
            warn!(error = %e, kind = ?event.kind, "Audit sink failed, event discarded");
        }
    }
    debug!("Audit queue drained, emitter stopped");
}
