use crate::audit::AuditEvent;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Error)]
pub enum AuditSinkError {
    #[error("audit sink I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit event could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for audit events. Failures are reported back to the emitter, which logs
/// them and moves on.
#[async_trait]
pub trait AuditSink: Send + Sync + 'static {
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditSinkError>;
}

/// Writes each event as one structured `tracing` record.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditSinkError> {
        let json = serde_json::to_string(event)?;
        info!(target: "switchboard::audit", kind = ?event.kind, event = %json, "{}", event.message);
        Ok(())
    }
}

/// Appends each event as a JSON line to a file.
pub struct JsonLinesAuditSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesAuditSink {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AuditSinkError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditSink for JsonLinesAuditSink {
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditSinkError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}
