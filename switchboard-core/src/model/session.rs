use crate::model::connection::ConnectionId;
use crate::model::room::RoomId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    Connected,
    Signaling,
    InCall,
    Left,
}

/// The relay's record of one authenticated connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub connection_id: ConnectionId,
    pub user_id: String,
    pub email: String,
    pub room_id: Option<RoomId>,
    pub status: SessionStatus,
    pub joined_at: DateTime<Utc>,
}

impl Session {
    pub fn new(connection_id: ConnectionId, user_id: String, email: String) -> Self {
        Self {
            connection_id,
            user_id,
            email,
            room_id: None,
            status: SessionStatus::Connected,
            joined_at: Utc::now(),
        }
    }

    pub fn is_in_room(&self) -> bool {
        self.room_id.is_some()
    }
}
