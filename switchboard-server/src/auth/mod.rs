//! Connection-time authentication.
//!
//! The relay only consumes a verified identity; how tokens are issued and refreshed
//! lives elsewhere. `dev_token` exists for local testing.

mod credential;
mod dev_token;
mod identity_verifier;

pub use credential::*;
pub use dev_token::*;
pub use identity_verifier::*;
