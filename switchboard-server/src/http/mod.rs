//! HTTP surface: the WebSocket upgrade plus a few small JSON endpoints.

mod handlers;

pub use handlers::*;

use crate::audit::AuditEmitter;
use crate::auth::{IdentityVerifier, JwtIdentityVerifier};
use crate::config::Config;
use crate::rate_limit::RateLimiter;
use crate::relay::RelayHandle;
use crate::signaling::{SignalingService, ws_handler};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub relay: RelayHandle,
    pub signaling: SignalingService,
    pub rate_limiter: Arc<RateLimiter>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub audit: AuditEmitter,
    pub started_at: Instant,
}

impl AppState {
    /// Starts the relay task and the rate limiter sweeper, verifying credentials with
    /// the configured HS256 secret.
    pub fn start(config: Config, audit: AuditEmitter) -> Self {
        let verifier = Arc::new(JwtIdentityVerifier::new(&config.jwt_secret));
        Self::with_verifier(config, audit, verifier)
    }

    pub fn with_verifier(
        config: Config,
        audit: AuditEmitter,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let signaling = SignalingService::new();
        let (relay, _) = RelayHandle::spawn(Arc::new(signaling.clone()), audit.clone());

        let rate_limiter = Arc::new(RateLimiter::new());
        rate_limiter
            .clone()
            .spawn_sweeper(config.socket_rate_limit.window);

        Self {
            config: Arc::new(config),
            relay,
            signaling,
            rate_limiter,
            verifier,
            audit,
            started_at: Instant::now(),
        }
    }
}

/// Build the application router.
///
/// - `/ws` - authenticated signaling socket
/// - `/api/health` - liveness
/// - `/api/sessions` - live session snapshot, credential required
/// - `/api/webrtc-config` - ICE servers for clients
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/health", get(health))
        .route("/api/sessions", get(list_sessions))
        .route("/api/webrtc-config", get(webrtc_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    info!(count = origins.len(), "CORS restricted to configured origins");

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
