//! Errors visible to remote peers.
//!
//! Only connection-time failures ever reach a client; routing misses inside a room are
//! absorbed by the relay. Messages are generic, details are logged server-side.

use crate::auth::AuthError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing, invalid or expired credential. Clients should re-login, not retry.
    #[error(transparent)]
    Authentication(#[from] AuthError),

    /// Origin address over its connection budget. Clients should back off.
    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Relay unavailable")]
    RelayUnavailable,
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServerError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ServerError::RelayUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServerError::Authentication(_) => "AUTHENTICATION_ERROR",
            ServerError::RateLimited => "RATE_LIMITED",
            ServerError::RelayUnavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
            },
        };
        (self.status_code(), Json(body)).into_response()
    }
}
