use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A finished round as returned by the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: i64,
    /// Crash multiplier in hundredths (e.g. `250` is 2.50x).
    pub game_crash: i64,
    pub created: DateTime<Utc>,
    /// Per-player bet and cash-out details, keyed by username.
    pub player_info: Value,
    pub hash: String,
}
