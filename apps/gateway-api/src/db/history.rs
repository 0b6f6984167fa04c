use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::models::GameRecord;

/// Number of finished rounds returned as `table_history` on join.
pub const TABLE_HISTORY_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
#[error("history store unavailable: {0}")]
pub struct StoreError(pub String);

/// Read access to finished rounds.
///
/// Backed by the game database in production and an in-memory list in tests.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Most recent rounds, newest first.
    async fn game_history(&self) -> Result<Vec<GameRecord>, StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (for development / tests)
// ---------------------------------------------------------------------------

pub struct MemoryHistory {
    games: RwLock<VecDeque<GameRecord>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self {
            games: RwLock::new(VecDeque::with_capacity(TABLE_HISTORY_LIMIT)),
        }
    }

    /// Record a finished round, dropping the oldest past the limit.
    pub fn record(&self, game: GameRecord) {
        let mut games = self.games.write();
        games.push_front(game);
        games.truncate(TABLE_HISTORY_LIMIT);
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn game_history(&self) -> Result<Vec<GameRecord>, StoreError> {
        Ok(self.games.read().iter().cloned().collect())
    }
}
