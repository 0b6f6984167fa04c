//! Relays engine events to the joined group.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::engine::GameEngine;

use super::events::ServerMessage;
use super::fanout::JoinedGroup;

/// Subscribe to the engine once and forward every relayed topic, unmodified
/// and in emission order, to all joined connections.
pub fn spawn(engine: &dyn GameEngine, group: Arc<JoinedGroup>) -> JoinHandle<()> {
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if !event.topic.is_relayed() {
                        continue;
                    }
                    group.broadcast(ServerMessage::emit(
                        event.topic.as_str(),
                        vec![event.data.clone()],
                    ));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event relay lagged behind engine");
                    // Missed events are dropped; keep going.
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("engine event bus closed; relay stopping");
                    break;
                }
            }
        }
    })
}
