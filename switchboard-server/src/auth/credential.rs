use axum_extra::extract::CookieJar;
use serde::Deserialize;

/// Query parameters accepted on the WebSocket upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// Picks the raw credential from the handshake: bearer header first, then the
/// connection-time `token` parameter, then the access-token cookie.
pub fn resolve_credential(
    bearer: Option<&str>,
    query_token: Option<&str>,
    jar: &CookieJar,
    cookie_name: &str,
) -> Option<String> {
    bearer
        .or(query_token)
        .map(str::to_owned)
        .or_else(|| jar.get(cookie_name).map(|c| c.value().to_owned()))
        .filter(|token| !token.trim().is_empty())
}
