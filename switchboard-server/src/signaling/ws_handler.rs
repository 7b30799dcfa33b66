use crate::audit::{AuditEvent, AuditKind};
use crate::auth::{AuthError, ConnectParams, resolve_credential};
use crate::error::ServerError;
use crate::http::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, Query, State};
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use axum_extra::extract::CookieJar;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::net::SocketAddr;
use switchboard_core::{ClientSignal, ConnectionId, VerifiedIdentity};
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, error, info, warn};

/// Upgrade endpoint. Rate limit and credential checks run on the plain HTTP request,
/// so a refused client gets a 429 or 401 and never sees a socket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(params): Query<ConnectParams>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    jar: CookieJar,
    State(state): State<AppState>,
) -> Response {
    match authorize(&state, addr, &params, bearer.as_ref(), &jar) {
        Ok(identity) => ws.on_upgrade(move |socket| handle_socket(socket, identity, state)),
        Err(e) => e.into_response(),
    }
}

fn authorize(
    state: &AppState,
    addr: SocketAddr,
    params: &ConnectParams,
    bearer: Option<&TypedHeader<Authorization<Bearer>>>,
    jar: &CookieJar,
) -> Result<VerifiedIdentity, ServerError> {
    let ip = addr.ip().to_string();
    let policy = state.config.socket_rate_limit;

    if !state.rate_limiter.allow(&ip, policy.limit, policy.window) {
        warn!(ip = %ip, "Connection rate limit exceeded");
        state.audit.emit(
            AuditEvent::new(AuditKind::RateLimit, "Connection rate limit exceeded")
                .payload(json!({ "ip": ip, "limit": policy.limit })),
        );
        return Err(ServerError::RateLimited);
    }

    let credential = resolve_credential(
        bearer.map(|TypedHeader(auth)| auth.token()),
        params.token.as_deref(),
        jar,
        &state.config.access_token_cookie,
    )
    .ok_or(AuthError::MissingCredential);

    match credential.and_then(|c| state.verifier.verify(&c)) {
        Ok(identity) => Ok(identity),
        Err(e) => {
            info!(ip = %ip, reason = ?e, "Connection refused");
            state.audit.emit(
                AuditEvent::new(AuditKind::Auth, "Socket authentication failed")
                    .payload(json!({ "ip": ip, "reason": format!("{e:?}") })),
            );
            Err(e.into())
        }
    }
}

async fn handle_socket(socket: WebSocket, identity: VerifiedIdentity, state: AppState) {
    let connection_id = ConnectionId::new();
    info!(connection_id = %connection_id, user_id = %identity.user_id, "New WebSocket connection");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.add_peer(connection_id, tx);
    if let Err(e) = state.relay.register(connection_id, identity).await {
        error!(connection_id = %connection_id, "Relay died: {}", e);
        state.audit.emit(
            AuditEvent::new(AuditKind::Error, "Relay unavailable, connection dropped")
                .connection(connection_id),
        );
        state.signaling.remove_peer(&connection_id);
        return;
    }

    let heartbeat = state.config.heartbeat_interval;
    let mut send_task = tokio::spawn(async move {
        let mut ping = interval(heartbeat);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ping.tick().await;

        loop {
            let msg = tokio::select! {
                msg = rx.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
                _ = ping.tick() => Message::Ping(Bytes::new()),
            };
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let relay = state.relay.clone();
        let idle_timeout = state.config.idle_timeout;

        async move {
            loop {
                let msg = match timeout(idle_timeout, receiver.next()).await {
                    Ok(Some(Ok(msg))) => msg,
                    Ok(Some(Err(e))) => {
                        debug!(connection_id = %connection_id, "Socket error: {}", e);
                        break;
                    }
                    Ok(None) => break,
                    Err(_) => {
                        info!(connection_id = %connection_id, "Idle timeout, closing connection");
                        break;
                    }
                };

                match msg {
                    Message::Text(text) => match ClientSignal::parse(text.as_str()) {
                        Ok(signal) => {
                            if let Err(e) = relay.signal(connection_id, signal).await {
                                error!("Relay died: {}", e);
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(connection_id = %connection_id, "Invalid signal message: {}", e)
                        }
                    },
                    Message::Close(_) => {
                        let _ = relay.disconnecting(connection_id).await;
                        break;
                    }
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.signaling.remove_peer(&connection_id);
    let _ = state.relay.disconnected(connection_id).await;
    info!(connection_id = %connection_id, "WebSocket disconnected");
}
