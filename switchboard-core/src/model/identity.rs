use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity proven by a credential at connect time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedIdentity {
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}
