//! Relay configuration.
//!
//! Loaded from environment variables; the JWT secret and TURN credential are redacted
//! in Debug output.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use switchboard_core::IceServerConfig;
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const DEFAULT_SOCKET_RATE_LIMIT: u32 = 20;
pub const DEFAULT_SOCKET_RATE_WINDOW_MS: u64 = 60_000;
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 25;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_AUDIT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub window: Duration,
}

#[derive(Clone)]
pub struct Config {
    /// Listen address (default: "0.0.0.0:3000").
    pub bind_address: String,

    /// HS256 secret used to verify access tokens.
    pub jwt_secret: String,

    /// Name of the cookie that may carry the access token.
    pub access_token_cookie: String,

    /// Connection attempts allowed per origin address.
    pub socket_rate_limit: RateLimitPolicy,

    pub heartbeat_interval: Duration,

    /// A socket silent for this long is torn down.
    pub idle_timeout: Duration,

    /// JSON-lines audit file; audit goes to tracing when unset.
    pub audit_log_path: Option<PathBuf>,

    pub audit_queue_capacity: usize,

    /// CORS origins. Empty means any origin.
    pub allowed_origins: Vec<String>,

    /// ICE servers handed to clients by `/api/webrtc-config`.
    pub ice_servers: Vec<IceServerConfig>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ice_servers: Vec<_> = self.ice_servers.iter().map(|s| &s.urls).collect();
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_cookie", &self.access_token_cookie)
            .field("socket_rate_limit", &self.socket_rate_limit)
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("idle_timeout", &self.idle_timeout)
            .field("audit_log_path", &self.audit_log_path)
            .field("audit_queue_capacity", &self.audit_queue_capacity)
            .field("allowed_origins", &self.allowed_origins)
            .field("ice_servers", &ice_servers)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let jwt_secret = vars
            .get("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let access_token_cookie = vars
            .get("ACCESS_TOKEN_COOKIE")
            .cloned()
            .unwrap_or_else(|| DEFAULT_ACCESS_TOKEN_COOKIE.to_string());

        let limit = parse_or(vars, "SOCKET_RATE_LIMIT", DEFAULT_SOCKET_RATE_LIMIT)?;
        if limit == 0 {
            return Err(invalid("SOCKET_RATE_LIMIT", "must be greater than zero"));
        }
        let window_ms = parse_or(vars, "SOCKET_RATE_WINDOW_MS", DEFAULT_SOCKET_RATE_WINDOW_MS)?;
        if window_ms == 0 {
            return Err(invalid("SOCKET_RATE_WINDOW_MS", "must be greater than zero"));
        }

        let heartbeat_secs = parse_or(
            vars,
            "HEARTBEAT_INTERVAL_SECS",
            DEFAULT_HEARTBEAT_INTERVAL_SECS,
        )?;
        let idle_secs = parse_or(vars, "IDLE_TIMEOUT_SECS", DEFAULT_IDLE_TIMEOUT_SECS)?;
        if heartbeat_secs == 0 {
            return Err(invalid("HEARTBEAT_INTERVAL_SECS", "must be greater than zero"));
        }
        if idle_secs <= heartbeat_secs {
            return Err(invalid(
                "IDLE_TIMEOUT_SECS",
                "must be longer than HEARTBEAT_INTERVAL_SECS",
            ));
        }

        let audit_queue_capacity =
            parse_or(vars, "AUDIT_QUEUE_CAPACITY", DEFAULT_AUDIT_QUEUE_CAPACITY)?;
        if audit_queue_capacity == 0 {
            return Err(invalid("AUDIT_QUEUE_CAPACITY", "must be greater than zero"));
        }

        let audit_log_path = vars
            .get("AUDIT_LOG_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_address,
            jwt_secret,
            access_token_cookie,
            socket_rate_limit: RateLimitPolicy {
                limit,
                window: Duration::from_millis(window_ms),
            },
            heartbeat_interval: Duration::from_secs(heartbeat_secs),
            idle_timeout: Duration::from_secs(idle_secs),
            audit_log_path,
            audit_queue_capacity,
            allowed_origins: split_list(vars.get("ALLOWED_ORIGINS")),
            ice_servers: ice_servers(vars),
        })
    }
}

fn invalid(name: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_or<T: FromStr>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    match vars.get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(name, &e.to_string())),
        None => Ok(default),
    }
}

fn split_list(raw: Option<&String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

fn ice_servers(vars: &HashMap<String, String>) -> Vec<IceServerConfig> {
    let urls = split_list(vars.get("TURN_URLS"));
    if urls.is_empty() {
        return Vec::new();
    }
    vec![IceServerConfig {
        urls,
        username: vars.get("TURN_USERNAME").cloned(),
        credential: vars.get("TURN_CREDENTIAL").cloned(),
    }]
}
