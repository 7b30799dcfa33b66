use crate::audit::AuditEmitter;
use crate::relay::{Relay, RelayCommand};
use crate::signaling::SignalingOutput;
use std::sync::Arc;
use switchboard_core::{ClientSignal, ConnectionId, Session, VerifiedIdentity};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

const COMMAND_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Relay task is not running")]
pub struct RelayClosed;

/// Cloneable sender side of the relay task. Every connection holds one.
#[derive(Clone)]
pub struct RelayHandle {
    tx: mpsc::Sender<RelayCommand>,
}

impl RelayHandle {
    /// Spawns the relay task. It stops once every handle is dropped.
    pub fn spawn(
        signaling: Arc<dyn SignalingOutput>,
        audit: AuditEmitter,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let relay = Relay::new(rx, signaling, audit);
        let handle = tokio::spawn(relay.run());
        (Self { tx }, handle)
    }

    /// Wraps a bare command channel so a test can stand in for the relay task.
    #[cfg(test)]
    fn from_sender(tx: mpsc::Sender<RelayCommand>) -> Self {
        Self { tx }
    }

    pub async fn register(
        &self,
        connection_id: ConnectionId,
        identity: VerifiedIdentity,
    ) -> Result<(), RelayClosed> {
        self.send(RelayCommand::Register {
            connection_id,
            identity,
        })
        .await
    }

    pub async fn signal(
        &self,
        connection_id: ConnectionId,
        signal: ClientSignal,
    ) -> Result<(), RelayClosed> {
        self.send(RelayCommand::Signal {
            connection_id,
            signal,
        })
        .await
    }

    pub async fn disconnecting(&self, connection_id: ConnectionId) -> Result<(), RelayClosed> {
        self.send(RelayCommand::Disconnecting { connection_id })
            .await
    }

    pub async fn disconnected(&self, connection_id: ConnectionId) -> Result<(), RelayClosed> {
        self.send(RelayCommand::Disconnected { connection_id })
            .await
    }

    /// Snapshot of every live session, oldest first.
    pub async fn list_sessions(&self) -> Result<Vec<Session>, RelayClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(RelayCommand::ListSessions { reply }).await?;
        rx.await.map_err(|_| RelayClosed)
    }

    pub async fn get_session(
        &self,
        connection_id: ConnectionId,
    ) -> Result<Option<Session>, RelayClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(RelayCommand::GetSession {
            connection_id,
            reply,
        })
        .await?;
        rx.await.map_err(|_| RelayClosed)
    }

    async fn send(&self, cmd: RelayCommand) -> Result<(), RelayClosed> {
        self.tx.send(cmd).await.map_err(|_| RelayClosed)
    }
}

impl From<RelayClosed> for crate::error::ServerError {
    fn from(_: RelayClosed) -> Self {
        crate::error::ServerError::RelayUnavailable
    }
}
