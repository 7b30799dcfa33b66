use chrono::{Duration, Utc};
use serde_json::json;
use switchboard_core::{ClientSignal, ConnectionId, VerifiedIdentity};

/// Timeout for waiting on asynchronous effects (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 2000;

pub fn identity(user: &str) -> VerifiedIdentity {
    VerifiedIdentity {
        user_id: user.to_string(),
        email: format!("{user}@example.com"),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

fn parse(kind: &str, payload: serde_json::Value) -> ClientSignal {
    let text = json!({ "type": kind, "payload": payload }).to_string();
    ClientSignal::parse(&text).expect("test signal parses")
}

pub fn join_room(room: &str) -> ClientSignal {
    parse("join-room", json!({ "roomId": room }))
}

pub fn leave_room() -> ClientSignal {
    ClientSignal::parse(r#"{"type":"leave-room"}"#).expect("test signal parses")
}

pub fn start_call() -> ClientSignal {
    ClientSignal::parse(r#"{"type":"start-call"}"#).expect("test signal parses")
}

pub fn disconnecting() -> ClientSignal {
    ClientSignal::parse(r#"{"type":"disconnecting"}"#).expect("test signal parses")
}

/// Builds an offer from raw JSON text so tests can check the blob survives untouched.
pub fn offer_raw(to: ConnectionId, offer_json: &str) -> ClientSignal {
    let text = format!(
        r#"{{"type":"offer","payload":{{"toConnectionId":"{to}","offer":{offer_json}}}}}"#
    );
    ClientSignal::parse(&text).expect("test signal parses")
}

pub fn offer(to: ConnectionId, sdp: &str) -> ClientSignal {
    parse(
        "offer",
        json!({ "toConnectionId": to, "offer": { "type": "offer", "sdp": sdp } }),
    )
}

pub fn answer(to: ConnectionId, sdp: &str) -> ClientSignal {
    parse(
        "answer",
        json!({ "toConnectionId": to, "answer": { "type": "answer", "sdp": sdp } }),
    )
}

pub fn ice_candidate(to: ConnectionId, candidate: Option<&str>) -> ClientSignal {
    let candidate = candidate.map(|c| json!({ "candidate": c, "sdpMid": "0", "sdpMLineIndex": 0 }));
    parse(
        "ice-candidate",
        json!({ "toConnectionId": to, "candidate": candidate }),
    )
}

pub fn chat(message: &str, timestamp: i64) -> ClientSignal {
    parse(
        "chat-message",
        json!({ "message": message, "timestamp": timestamp }),
    )
}

pub fn file_meta_raw(meta_json: &str) -> ClientSignal {
    let text = format!(r#"{{"type":"file-meta","payload":{meta_json}}}"#);
    ClientSignal::parse(&text).expect("test signal parses")
}

pub fn end_call(to: Option<ConnectionId>) -> ClientSignal {
    match to {
        Some(to) => parse("end-call", json!({ "toConnectionId": to })),
        None => ClientSignal::parse(r#"{"type":"end-call"}"#).expect("test signal parses"),
    }
}

pub fn state_change(peer: ConnectionId, ice: &str) -> ClientSignal {
    parse(
        "webrtc-state-change",
        json!({ "peerConnectionId": peer.to_string(), "iceState": ice }),
    )
}
