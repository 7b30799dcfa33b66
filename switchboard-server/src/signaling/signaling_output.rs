use async_trait::async_trait;
use switchboard_core::{ConnectionId, ServerSignal};

/// Outbound side of the relay: whatever owns the client sockets implements this so the
/// relay can deliver signals without knowing the transport.
///
/// Delivery is fire-and-forget. Sending to a connection that is already gone is a no-op.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Deliver a signal to one connection.
    async fn send(&self, to: &ConnectionId, signal: &ServerSignal);

    /// Deliver the same signal to several connections.
    async fn send_many(&self, to: &[ConnectionId], signal: &ServerSignal) {
        for connection_id in to {
            self.send(connection_id, signal).await;
        }
    }

    /// Deliver a signal to every live connection.
    async fn broadcast(&self, signal: &ServerSignal);
}
