use serde::{Deserialize, Serialize};

/// The user a one-time token resolved to. Read-only from the gateway's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
    pub balance_satoshis: i64,
}
