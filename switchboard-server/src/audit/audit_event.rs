use chrono::{DateTime, Utc};
use serde::Serialize;
use switchboard_core::{ConnectionId, RoomId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditKind {
    Auth,
    SignalingServer,
    WebrtcEvent,
    RoomEvent,
    SystemInfo,
    RateLimit,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: AuditKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<ConnectionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_connection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ice_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signaling_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(kind: AuditKind, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            message: message.into(),
            connection_id: None,
            user_id: None,
            email: None,
            room_id: None,
            peer_connection_id: None,
            ice_state: None,
            signaling_state: None,
            payload: None,
        }
    }

    pub fn connection(mut self, connection_id: ConnectionId) -> Self {
        self.connection_id = Some(connection_id);
        self
    }

    pub fn user(mut self, user_id: impl Into<String>, email: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.email = Some(email.into());
        self
    }

    pub fn room(mut self, room_id: Option<&RoomId>) -> Self {
        self.room_id = room_id.cloned();
        self
    }

    pub fn peer(mut self, peer: impl Into<String>) -> Self {
        self.peer_connection_id = Some(peer.into());
        self
    }

    pub fn webrtc_state(mut self, ice: Option<String>, signaling: Option<String>) -> Self {
        self.ice_state = ice;
        self.signaling_state = signaling;
        self
    }

    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}
