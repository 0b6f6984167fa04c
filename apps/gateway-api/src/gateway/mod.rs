//! The real-time session gateway.
//!
//! A connection passes the shutdown gate ([`lifecycle`]), performs a single
//! `join` ([`handshake`]), and from then on receives relayed engine events
//! ([`relay`]) and chat through the joined group ([`fanout`]). Authenticated
//! connections additionally get the betting and chat [`commands`], whose
//! engine calls run in order on the connection's [`queue`].

pub mod chat;
pub mod commands;
pub mod events;
pub mod fanout;
pub mod handler;
pub mod handshake;
pub mod lifecycle;
pub mod queue;
pub mod relay;
pub mod server;
pub mod session;

use tokio::task::JoinHandle;

use crate::AppState;

/// Start the process-wide background tasks: the event relay and the
/// shutdown watcher. Call once, before serving connections.
pub fn start(state: &AppState) -> Vec<JoinHandle<()>> {
    vec![
        relay::spawn(state.engine.as_ref(), state.group.clone()),
        lifecycle::spawn_shutdown_watcher(state.engine.as_ref(), state.shutdown.clone()),
    ]
}
