use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single chat line as stored in history and broadcast as `say`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub time: DateTime<Utc>,
    pub message: String,
    pub username: String,
}

impl ChatMessage {
    /// Stamp a message with the current time.
    pub fn new(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            message: message.into(),
            username: username.into(),
        }
    }
}
