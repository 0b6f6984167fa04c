//! Port to the authoritative game engine.
//!
//! The engine owns the round state machine and the balance ledger. The
//! gateway only validates input, forwards commands, and relays the engine's
//! published events.

pub mod events;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::models::AuthenticatedUser;

pub use events::{EngineEvent, EngineEvents, Topic};
pub use memory::MemoryEngine;

/// Failure returned by a state-mutating engine call.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A stable code the client can render (e.g. `NOT_ENOUGH_MONEY`).
    #[error("{0}")]
    Rejected(String),
    /// Anything else. Never shown to the client.
    #[error("engine failure: {0}")]
    Failure(String),
}

#[async_trait]
pub trait GameEngine: Send + Sync {
    /// Snapshot of the current round, sent to clients on join.
    fn info(&self) -> Map<String, Value>;

    async fn place_bet(
        &self,
        user: &AuthenticatedUser,
        amount: u64,
        auto_cash_out: Option<u64>,
    ) -> Result<(), EngineError>;

    async fn cash_out(&self, user: &AuthenticatedUser) -> Result<(), EngineError>;

    fn update_auto_cash_out(&self, user: &AuthenticatedUser, amount: Option<u64>);

    /// Subscribe to every topic the engine publishes.
    fn subscribe(&self) -> broadcast::Receiver<Arc<EngineEvent>>;
}
