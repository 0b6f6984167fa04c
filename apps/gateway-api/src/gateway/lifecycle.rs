//! Process-wide shutdown gate.
//!
//! Set once when the engine announces `shutdown` and never cleared. Live
//! connections are told to `update`; connections accepted afterwards get
//! `update` and nothing else.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::engine::{GameEngine, Topic};

/// Outcome of admitting a new connection through the gate.
pub enum Admission {
    /// Shutdown already happened.
    Closed,
    /// Resolves once shutdown happens.
    Open(watch::Receiver<bool>),
}

pub struct ShutdownGate {
    tx: watch::Sender<bool>,
}

impl ShutdownGate {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    /// Set the flag. Returns `true` only for the call that flipped it.
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|set| {
            if *set {
                false
            } else {
                *set = true;
                true
            }
        })
    }

    /// Resolves once the flag is set.
    pub async fn tripped(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns when set.
        let _ = rx.wait_for(|set| *set).await;
    }

    /// Subscribe before checking so a shutdown landing in between is not lost.
    pub fn admit(&self) -> Admission {
        let mut rx = self.tx.subscribe();
        if *rx.borrow_and_update() {
            Admission::Closed
        } else {
            Admission::Open(rx)
        }
    }
}

impl Default for ShutdownGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Watch the engine for `shutdown` and trip the gate.
pub fn spawn_shutdown_watcher(engine: &dyn GameEngine, gate: Arc<ShutdownGate>) -> JoinHandle<()> {
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) if event.topic == Topic::Shutdown => {
                    if gate.trigger() {
                        tracing::info!("engine shutting down; telling clients to update");
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "shutdown watcher lagged behind engine events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
