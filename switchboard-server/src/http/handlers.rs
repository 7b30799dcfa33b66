use crate::auth::{AuthError, ConnectParams, resolve_credential};
use crate::error::ServerError;
use crate::http::AppState;
use axum::Json;
use axum::extract::{Query, State};
use axum_extra::TypedHeader;
use axum_extra::extract::CookieJar;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use serde::Serialize;
use switchboard_core::{IceServerConfig, Session};
use tracing::debug;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// Whole seconds since the server started.
    pub uptime: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebrtcConfigResponse {
    pub ice_servers: Vec<IceServerConfig>,
    pub ice_transport_policy: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        uptime: state.started_at.elapsed().as_secs(),
    })
}

/// Read-only session snapshot for monitoring views.
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    jar: CookieJar,
) -> Result<Json<Vec<Session>>, ServerError> {
    let credential = resolve_credential(
        bearer.as_ref().map(|TypedHeader(auth)| auth.token()),
        params.token.as_deref(),
        &jar,
        &state.config.access_token_cookie,
    )
    .ok_or(AuthError::MissingCredential)?;

    let identity = state.verifier.verify(&credential)?;
    debug!(user_id = %identity.user_id, "Session snapshot requested");

    Ok(Json(state.relay.list_sessions().await?))
}

/// TURN servers force relayed candidates; without one clients gather everything.
pub async fn webrtc_config(State(state): State<AppState>) -> Json<WebrtcConfigResponse> {
    let ice_transport_policy = if state.config.ice_servers.is_empty() {
        "all"
    } else {
        "relay"
    };
    Json(WebrtcConfigResponse {
        ice_servers: state.config.ice_servers.clone(),
        ice_transport_policy,
    })
}
