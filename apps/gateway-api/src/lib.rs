pub mod auth;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod models;
pub mod routes;
pub mod validate;

use std::sync::Arc;

use tokio_util::task::TaskTracker;

use auth::tokens::TokenValidator;
use config::Config;
use db::history::HistoryStore;
use engine::GameEngine;
use gateway::chat::ChatHistory;
use gateway::fanout::JoinedGroup;
use gateway::lifecycle::ShutdownGate;

/// Shared application state available to every connection.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<dyn GameEngine>,
    pub tokens: Arc<dyn TokenValidator>,
    pub history: Arc<dyn HistoryStore>,
    pub chat: Arc<ChatHistory>,
    pub group: Arc<JoinedGroup>,
    pub shutdown: Arc<ShutdownGate>,
    /// Connection loops and engine workers; drained on shutdown.
    pub tasks: TaskTracker,
}

impl AppState {
    /// Wire the collaborators with fresh process-lifetime gateway state.
    pub fn new(
        config: Config,
        engine: Arc<dyn GameEngine>,
        tokens: Arc<dyn TokenValidator>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            engine,
            tokens,
            history,
            chat: Arc::new(ChatHistory::new()),
            group: Arc::new(JoinedGroup::new()),
            shutdown: Arc::new(ShutdownGate::new()),
            tasks: TaskTracker::new(),
        }
    }
}
