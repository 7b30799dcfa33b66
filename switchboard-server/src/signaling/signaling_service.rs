use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::{Message, Utf8Bytes};
use dashmap::DashMap;
use std::sync::Arc;
use switchboard_core::{ConnectionId, ServerSignal};
use tokio::sync::mpsc;
use tracing::{debug, error};

struct SignalingInner {
    peers: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

/// Registry of open sockets. Each connection's writer task drains its own channel,
/// so a send here never waits on the network.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
            }),
        }
    }

    pub fn add_peer(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(connection_id, tx);
    }

    /// Stops all further dispatch to the connection.
    pub fn remove_peer(&self, connection_id: &ConnectionId) {
        self.inner.peers.remove(connection_id);
    }

    #[cfg(test)]
    fn peer_count(&self) -> usize {
        self.inner.peers.len()
    }

    fn encode(signal: &ServerSignal) -> Option<Utf8Bytes> {
        match serde_json::to_string(signal) {
            Ok(json) => Some(json.into()),
            Err(e) => {
                error!("Failed to serialize signal message: {}", e);
                None
            }
        }
    }

    fn send_text(&self, connection_id: &ConnectionId, text: Utf8Bytes) {
        let Some(peer) = self.inner.peers.get(connection_id) else {
            debug!(connection_id = %connection_id, "Dropping signal for closed connection");
            return;
        };
        if peer.send(Message::Text(text)).is_err() {
            debug!(connection_id = %connection_id, "Writer task already finished");
        }
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send(&self, to: &ConnectionId, signal: &ServerSignal) {
        if let Some(text) = Self::encode(signal) {
            self.send_text(to, text);
        }
    }

    async fn send_many(&self, to: &[ConnectionId], signal: &ServerSignal) {
        let Some(text) = Self::encode(signal) else {
            return;
        };
        for connection_id in to {
            self.send_text(connection_id, text.clone());
        }
    }

    async fn broadcast(&self, signal: &ServerSignal) {
        let Some(text) = Self::encode(signal) else {
            return;
        };
        for peer in self.inner.peers.iter() {
            let _ = peer.value().send(Message::Text(text.clone()));
        }
    }
}
