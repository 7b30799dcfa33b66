use crate::model::connection::ConnectionId;
use crate::model::room::RoomId;
use crate::model::session::Session;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use serde_json::value::RawValue;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

#[derive(Debug, Error)]
pub enum SignalParseError {
    #[error("malformed signal envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("unknown signal kind '{0}'")]
    UnknownKind(String),

    #[error("signal '{0}' requires a payload")]
    MissingPayload(&'static str),

    #[error("invalid payload for '{kind}': {source}")]
    Payload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("room id must not be empty")]
    EmptyRoomId,
}

/// Messages a connected client sends to the relay.
///
/// Opaque negotiation blobs (`offer`, `answer`, `candidate`, file metadata) are kept
/// as raw JSON text so they leave the relay exactly as they arrived.
#[derive(Debug, Clone)]
pub enum ClientSignal {
    JoinRoom {
        room_id: RoomId,
    },
    LeaveRoom,
    StartCall,
    Offer {
        to: ConnectionId,
        offer: Box<RawValue>,
    },
    Answer {
        to: ConnectionId,
        answer: Box<RawValue>,
    },
    IceCandidate {
        to: ConnectionId,
        /// `None` is the end-of-candidates marker and is still forwarded.
        candidate: Option<Box<RawValue>>,
    },
    WebrtcStateChange {
        peer_connection_id: String,
        ice_state: Option<String>,
        signaling_state: Option<String>,
    },
    ChatMessage {
        message: String,
        timestamp: Number,
    },
    FileMeta {
        meta: Box<RawValue>,
    },
    EndCall {
        to: Option<ConnectionId>,
    },
    Disconnecting,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<Box<RawValue>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinRoomPayload {
    room_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfferPayload {
    offer: Box<RawValue>,
    to_connection_id: ConnectionId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerPayload {
    answer: Box<RawValue>,
    to_connection_id: ConnectionId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IceCandidatePayload {
    candidate: Option<Box<RawValue>>,
    to_connection_id: ConnectionId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateChangePayload {
    peer_connection_id: String,
    ice_state: Option<String>,
    signaling_state: Option<String>,
}

#[derive(Deserialize)]
struct ChatPayload {
    message: String,
    timestamp: Number,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndCallPayload {
    to_connection_id: Option<ConnectionId>,
}

fn payload<T: DeserializeOwned>(
    kind: &'static str,
    raw: Option<&RawValue>,
) -> Result<T, SignalParseError> {
    let text = raw.map(RawValue::get).unwrap_or("{}");
    serde_json::from_str(text).map_err(|source| SignalParseError::Payload { kind, source })
}

impl ClientSignal {
    /// Parses a text frame: the envelope first, then the fixed field set of its kind.
    pub fn parse(text: &str) -> Result<Self, SignalParseError> {
        let envelope: Envelope = serde_json::from_str(text).map_err(SignalParseError::Envelope)?;
        let raw = envelope.payload.as_deref();

        let signal = match envelope.kind.as_str() {
            "join-room" => {
                let p: JoinRoomPayload = payload("join-room", raw)?;
                if p.room_id.trim().is_empty() {
                    return Err(SignalParseError::EmptyRoomId);
                }
                ClientSignal::JoinRoom {
                    room_id: RoomId(p.room_id),
                }
            }
            "leave-room" => ClientSignal::LeaveRoom,
            "start-call" => ClientSignal::StartCall,
            "offer" => {
                let p: OfferPayload = payload("offer", raw)?;
                ClientSignal::Offer {
                    to: p.to_connection_id,
                    offer: p.offer,
                }
            }
            "answer" => {
                let p: AnswerPayload = payload("answer", raw)?;
                ClientSignal::Answer {
                    to: p.to_connection_id,
                    answer: p.answer,
                }
            }
            "ice-candidate" => {
                let p: IceCandidatePayload = payload("ice-candidate", raw)?;
                ClientSignal::IceCandidate {
                    to: p.to_connection_id,
                    candidate: p.candidate,
                }
            }
            "webrtc-state-change" => {
                let p: StateChangePayload = payload("webrtc-state-change", raw)?;
                ClientSignal::WebrtcStateChange {
                    peer_connection_id: p.peer_connection_id,
                    ice_state: p.ice_state,
                    signaling_state: p.signaling_state,
                }
            }
            "chat-message" => {
                let p: ChatPayload = payload("chat-message", raw)?;
                ClientSignal::ChatMessage {
                    message: p.message,
                    timestamp: p.timestamp,
                }
            }
            "file-meta" => ClientSignal::FileMeta {
                meta: envelope
                    .payload
                    .ok_or(SignalParseError::MissingPayload("file-meta"))?,
            },
            "end-call" => {
                let p: EndCallPayload = payload("end-call", raw)?;
                ClientSignal::EndCall {
                    to: p.to_connection_id,
                }
            }
            "disconnecting" => ClientSignal::Disconnecting,
            _ => return Err(SignalParseError::UnknownKind(envelope.kind)),
        };

        Ok(signal)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClientSignal::JoinRoom { .. } => "join-room",
            ClientSignal::LeaveRoom => "leave-room",
            ClientSignal::StartCall => "start-call",
            ClientSignal::Offer { .. } => "offer",
            ClientSignal::Answer { .. } => "answer",
            ClientSignal::IceCandidate { .. } => "ice-candidate",
            ClientSignal::WebrtcStateChange { .. } => "webrtc-state-change",
            ClientSignal::ChatMessage { .. } => "chat-message",
            ClientSignal::FileMeta { .. } => "file-meta",
            ClientSignal::EndCall { .. } => "end-call",
            ClientSignal::Disconnecting => "disconnecting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub connection_id: ConnectionId,
    pub email: String,
}

/// Messages the relay delivers to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerSignal {
    #[serde(rename_all = "camelCase")]
    Welcome { connection_id: ConnectionId },

    #[serde(rename_all = "camelCase")]
    ExistingMembers {
        room_id: RoomId,
        members: Vec<MemberInfo>,
    },

    #[serde(rename_all = "camelCase")]
    UserJoined {
        connection_id: ConnectionId,
        email: String,
    },

    #[serde(rename_all = "camelCase")]
    UserLeft { connection_id: ConnectionId },

    #[serde(rename_all = "camelCase")]
    Offer {
        offer: Box<RawValue>,
        from_connection_id: ConnectionId,
    },

    #[serde(rename_all = "camelCase")]
    Answer {
        answer: Box<RawValue>,
        from_connection_id: ConnectionId,
    },

    #[serde(rename_all = "camelCase")]
    IceCandidate {
        candidate: Option<Box<RawValue>>,
        from_connection_id: ConnectionId,
    },

    #[serde(rename_all = "camelCase")]
    CallEnded { from_connection_id: ConnectionId },

    #[serde(rename_all = "camelCase")]
    ChatMessage {
        user_id: String,
        message: String,
        timestamp: Number,
    },

    FileMeta(Box<RawValue>),

    StatusUpdate { sessions: Vec<Session> },
}
