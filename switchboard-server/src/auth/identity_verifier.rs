use chrono::DateTime;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use switchboard_core::VerifiedIdentity;
use thiserror::Error;
use tracing::debug;

/// Tokens above this size are rejected before any decoding work.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// Why a credential was refused. Every variant renders the same generic text so the
/// remote side learns nothing about which check failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication error: access token missing")]
    MissingCredential,

    #[error("Authentication error: invalid or expired token")]
    TokenTooLarge,

    #[error("Authentication error: invalid or expired token")]
    InvalidToken,

    #[error("Authentication error: invalid or expired token")]
    Expired,

    #[error("Authentication error: invalid token payload")]
    MissingClaims,
}

/// Validates a bearer credential and yields the identity it proves.
///
/// Implementations must be side-effect free; they are called for every new connection
/// and may be called again by refresh flows.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<VerifiedIdentity, AuthError>;
}

#[derive(Deserialize)]
struct AccessClaims {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    email: Option<String>,
    exp: i64,
}

/// HS256 verifier for access tokens signed with a shared secret.
pub struct JwtIdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl IdentityVerifier for JwtIdentityVerifier {
    fn verify(&self, credential: &str) -> Result<VerifiedIdentity, AuthError> {
        if credential.len() > MAX_TOKEN_SIZE_BYTES {
            debug!(size = credential.len(), "Credential exceeds size limit");
            return Err(AuthError::TokenTooLarge);
        }

        let data = decode::<AccessClaims>(credential, &self.key, &self.validation).map_err(|e| {
            debug!(error = %e, "Credential verification failed");
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            }
        })?;

        let claims = data.claims;
        let (Some(user_id), Some(email)) = (claims.user_id, claims.email) else {
            return Err(AuthError::MissingClaims);
        };
        if user_id.is_empty() || email.is_empty() {
            return Err(AuthError::MissingClaims);
        }

        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidToken)?;

        Ok(VerifiedIdentity {
            user_id,
            email,
            expires_at,
        })
    }
}
