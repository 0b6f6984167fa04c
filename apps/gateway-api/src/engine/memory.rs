//! In-memory engine used by the development binary and tests.
//!
//! Tracks a balance per user and at most one open bet per user. There is no
//! round state machine: a cash-out returns the stake at 1.00x. Round events
//! are published by whoever drives the engine through [`MemoryEngine::events`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::models::AuthenticatedUser;

use super::{EngineError, EngineEvent, EngineEvents, GameEngine, Topic};

pub const ALREADY_PLACED_BET: &str = "ALREADY_PLACED_BET";
pub const NOT_ENOUGH_MONEY: &str = "NOT_ENOUGH_MONEY";
pub const NO_BET_PLACED: &str = "NO_BET_PLACED";

#[derive(Debug, Clone)]
struct OpenBet {
    username: String,
    amount: u64,
    auto_cash_out: Option<u64>,
}

pub struct MemoryEngine {
    events: EngineEvents,
    game_id: AtomicI64,
    balances: DashMap<i64, i64>,
    bets: Mutex<HashMap<i64, OpenBet>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            events: EngineEvents::new(),
            game_id: AtomicI64::new(1),
            balances: DashMap::new(),
            bets: Mutex::new(HashMap::new()),
        }
    }

    /// The bus this engine publishes on.
    pub fn events(&self) -> &EngineEvents {
        &self.events
    }

    pub fn balance(&self, user_id: i64) -> Option<i64> {
        self.balances.get(&user_id).map(|b| *b)
    }

    pub fn open_bet(&self, user_id: i64) -> Option<(u64, Option<u64>)> {
        self.bets
            .lock()
            .get(&user_id)
            .map(|bet| (bet.amount, bet.auto_cash_out))
    }

    /// Close the current round: drop open bets and advance the game id.
    pub fn end_round(&self) -> i64 {
        self.bets.lock().clear();
        self.game_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameEngine for MemoryEngine {
    fn info(&self) -> Map<String, Value> {
        let player_info: Map<String, Value> = self
            .bets
            .lock()
            .values()
            .map(|bet| (bet.username.clone(), serde_json::json!({ "bet": bet.amount })))
            .collect();

        let mut info = Map::new();
        info.insert("game_id".into(), self.game_id.load(Ordering::Relaxed).into());
        info.insert("state".into(), "STARTING".into());
        info.insert("player_info".into(), Value::Object(player_info));
        info
    }

    async fn place_bet(
        &self,
        user: &AuthenticatedUser,
        amount: u64,
        auto_cash_out: Option<u64>,
    ) -> Result<(), EngineError> {
        let stake = i64::try_from(amount).map_err(|e| EngineError::Failure(e.to_string()))?;
        let index = {
            let mut bets = self.bets.lock();
            if bets.contains_key(&user.id) {
                return Err(EngineError::Rejected(ALREADY_PLACED_BET.to_string()));
            }

            let mut balance = self
                .balances
                .entry(user.id)
                .or_insert(user.balance_satoshis);
            if *balance < stake {
                return Err(EngineError::Rejected(NOT_ENOUGH_MONEY.to_string()));
            }
            *balance -= stake;

            bets.insert(
                user.id,
                OpenBet {
                    username: user.username.clone(),
                    amount,
                    auto_cash_out,
                },
            );
            bets.len() - 1
        };

        self.events.publish(
            Topic::PlayerBet,
            serde_json::json!({ "username": user.username, "index": index }),
        );
        Ok(())
    }

    async fn cash_out(&self, user: &AuthenticatedUser) -> Result<(), EngineError> {
        let bet = self
            .bets
            .lock()
            .remove(&user.id)
            .ok_or_else(|| EngineError::Rejected(NO_BET_PLACED.to_string()))?;

        let stake = i64::try_from(bet.amount).map_err(|e| EngineError::Failure(e.to_string()))?;
        *self.balances.entry(user.id).or_insert(0) += stake;

        self.events.publish(
            Topic::CashedOut,
            serde_json::json!({ "username": user.username, "stopped_at": 100 }),
        );
        Ok(())
    }

    fn update_auto_cash_out(&self, user: &AuthenticatedUser, amount: Option<u64>) {
        if let Some(bet) = self.bets.lock().get_mut(&user.id) {
            bet.auto_cash_out = amount;
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<Arc<EngineEvent>> {
        self.events.subscribe()
    }
}
