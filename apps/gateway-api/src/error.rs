//! Gateway error tiers.
//!
//! - **Protocol**: malformed or policy-violating client input. Sent back as
//!   `err(description)`; the connection stays usable.
//! - **Domain**: a classified collaborator code (e.g. `NOT_VALID_TOKEN`).
//!   These never become a `GatewayError`; handlers forward them through the
//!   request's ack.
//! - **Internal**: any unclassified collaborator failure. Logged in full; the
//!   client only sees [`INTERNAL_ERROR`].

use std::fmt::Display;

use crate::gateway::events::ServerMessage;

/// Opaque code sent to clients for internal failures.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    Protocol(String),
    #[error("{context}: {detail}")]
    Internal { context: &'static str, detail: String },
}

impl GatewayError {
    /// A protocol error tagged with the event that caused it, e.g.
    /// `[place_bet] No ack`.
    pub fn protocol(event: &str, message: impl Display) -> Self {
        Self::Protocol(format!("[{event}] {message}"))
    }

    pub fn internal(context: &'static str, err: impl Display) -> Self {
        Self::Internal {
            context,
            detail: err.to_string(),
        }
    }

    /// Log the error and build the `err` event the client receives.
    pub fn into_client_message(self, connection_id: &str) -> ServerMessage {
        match self {
            Self::Protocol(description) => {
                tracing::warn!(%connection_id, %description, "sending client protocol error");
                ServerMessage::error(description)
            }
            Self::Internal { context, detail } => {
                tracing::error!(%connection_id, %detail, "[INTERNAL_ERROR] {context}");
                ServerMessage::error(INTERNAL_ERROR)
            }
        }
    }
}
