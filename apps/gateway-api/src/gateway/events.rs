//! Gateway event names and wire-format messages.
//!
//! Every frame is a JSON text message. Clients send
//! `{"event": "<name>", "args": [...], "ack": <id>?}`; a present `ack` means
//! the client expects exactly one reply tagged with the same id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

pub struct EventName;

impl EventName {
    // Client → server
    pub const JOIN: &'static str = "join";
    pub const PLACE_BET: &'static str = "place_bet";
    pub const CASH_OUT: &'static str = "cash_out";
    pub const SET_AUTO_CASH_OUT: &'static str = "set_auto_cash_out";
    pub const SAY: &'static str = "say";

    // Server → client
    pub const ERR: &'static str = "err";
    pub const UPDATE: &'static str = "update";
}

// ---------------------------------------------------------------------------
// Client → Server message
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ClientMessage {
    pub event: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub ack: Option<u64>,
}

// ---------------------------------------------------------------------------
// Server → Client message
// ---------------------------------------------------------------------------

/// Either an emitted event (`event` set) or an ack reply (`ack` set).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
    pub args: Vec<Value>,
}

impl ServerMessage {
    pub fn emit(event: &str, args: Vec<Value>) -> Self {
        Self {
            event: Some(event.to_string()),
            ack: None,
            args,
        }
    }

    /// `err(description)`.
    pub fn error(description: impl Into<String>) -> Self {
        Self::emit(EventName::ERR, vec![Value::String(description.into())])
    }

    /// `update()`: the client should reset and reload its session.
    pub fn update() -> Self {
        Self::emit(EventName::UPDATE, Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Ack
// ---------------------------------------------------------------------------

/// Reply handle for a request that carried an ack id.
///
/// Consumed by value, so a request is answered at most once. Replies have the
/// shape `(errorCode, result?)`.
#[derive(Debug)]
pub struct Ack {
    id: u64,
}

impl Ack {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    /// `(null)` or `(null, result)`.
    pub fn ok(self, result: Option<Value>) -> ServerMessage {
        let mut args = vec![Value::Null];
        args.extend(result);
        self.reply(args)
    }

    /// `(code)`.
    pub fn reject(self, code: &str) -> ServerMessage {
        self.reply(vec![Value::String(code.to_string())])
    }

    fn reply(self, args: Vec<Value>) -> ServerMessage {
        ServerMessage {
            event: None,
            ack: Some(self.id),
            args,
        }
    }
}
