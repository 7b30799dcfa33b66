mod connection;
mod identity;
mod room;
mod session;
mod signaling;

pub use connection::ConnectionId;
pub use identity::VerifiedIdentity;
pub use room::RoomId;
pub use session::{Session, SessionStatus};
pub use signaling::{ClientSignal, IceServerConfig, MemberInfo, ServerSignal, SignalParseError};
