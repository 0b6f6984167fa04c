//! One-time token (OTT) validation.
//!
//! Tokens are version-4 UUIDs minted elsewhere (typically by the web login
//! flow) and exchanged exactly once during `join` for an authenticated
//! session.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::AuthenticatedUser;

/// Why a token could not be exchanged.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Unknown, expired, or already used. Safe to show the client.
    #[error("NOT_VALID_TOKEN")]
    NotValidToken,
    #[error("token lookup failed: {0}")]
    Unavailable(String),
}

impl TokenError {
    pub const NOT_VALID_TOKEN: &'static str = "NOT_VALID_TOKEN";
}

#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Consume `token` and return the user it was issued for.
    async fn validate_one_time_token(&self, token: Uuid) -> Result<AuthenticatedUser, TokenError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (for development / tests)
// ---------------------------------------------------------------------------

pub struct MemoryTokens {
    tokens: Mutex<HashMap<Uuid, AuthenticatedUser>>,
}

impl MemoryTokens {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Mint a single-use token for `user`.
    pub fn issue(&self, user: AuthenticatedUser) -> Uuid {
        let token = Uuid::new_v4();
        self.tokens.lock().insert(token, user);
        token
    }
}

impl Default for MemoryTokens {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenValidator for MemoryTokens {
    async fn validate_one_time_token(&self, token: Uuid) -> Result<AuthenticatedUser, TokenError> {
        self.tokens
            .lock()
            .remove(&token)
            .ok_or(TokenError::NotValidToken)
    }
}
