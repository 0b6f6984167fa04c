//! Publish/subscribe bus for engine events over a closed topic set.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;

/// Capacity of the engine bus. Subscribers that fall behind skip messages
/// (RecvError::Lagged).
const EVENT_BUS_CAPACITY: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    GameStarting,
    GameStarted,
    GameTick,
    GameCrash,
    CashedOut,
    PlayerBet,
    Say,
    Shutdown,
}

impl Topic {
    /// Topics forwarded verbatim to joined connections.
    pub const RELAYED: [Topic; 7] = [
        Topic::GameStarting,
        Topic::GameStarted,
        Topic::GameTick,
        Topic::GameCrash,
        Topic::CashedOut,
        Topic::PlayerBet,
        Topic::Say,
    ];

    /// Wire event name.
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::GameStarting => "game_starting",
            Topic::GameStarted => "game_started",
            Topic::GameTick => "game_tick",
            Topic::GameCrash => "game_crash",
            Topic::CashedOut => "cashed_out",
            Topic::PlayerBet => "player_bet",
            Topic::Say => "say",
            Topic::Shutdown => "shutdown",
        }
    }

    pub fn is_relayed(self) -> bool {
        Self::RELAYED.contains(&self)
    }
}

/// One engine emission.
#[derive(Debug, Clone)]
pub struct EngineEvent {
    pub topic: Topic,
    pub data: Value,
}

/// The engine's broadcast hub. Cloneable.
#[derive(Clone)]
pub struct EngineEvents {
    sender: broadcast::Sender<Arc<EngineEvent>>,
}

impl EngineEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<EngineEvent>> {
        self.sender.subscribe()
    }

    pub fn publish(&self, topic: Topic, data: Value) {
        // send() returns Err when nobody is subscribed.
        let _ = self.sender.send(Arc::new(EngineEvent { topic, data }));
    }
}

impl Default for EngineEvents {
    fn default() -> Self {
        Self::new()
    }
}
