pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod rate_limit;
pub mod relay;
pub mod signaling;

pub use audit::*;
pub use auth::*;
pub use config::{Config, ConfigError};
pub use error::ServerError;
pub use http::*;
pub use rate_limit::*;
pub use relay::*;
pub use signaling::*;
