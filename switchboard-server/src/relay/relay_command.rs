use switchboard_core::{ClientSignal, ConnectionId, Session, VerifiedIdentity};
use tokio::sync::oneshot;

/// Commands processed, one at a time, by the relay task.
#[derive(Debug)]
pub enum RelayCommand {
    /// An authenticated connection was accepted.
    Register {
        connection_id: ConnectionId,
        identity: VerifiedIdentity,
    },

    /// A validated signal from a connection.
    Signal {
        connection_id: ConnectionId,
        signal: ClientSignal,
    },

    /// The connection announced it is closing. Room peers are told it left.
    Disconnecting { connection_id: ConnectionId },

    /// The socket is gone. Cleans up whatever `Disconnecting` has not.
    Disconnected { connection_id: ConnectionId },

    ListSessions {
        reply: oneshot::Sender<Vec<Session>>,
    },

    GetSession {
        connection_id: ConnectionId,
        reply: oneshot::Sender<Option<Session>>,
    },
}
