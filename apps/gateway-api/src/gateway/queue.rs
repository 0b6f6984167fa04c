//! Per-connection queue of engine calls.
//!
//! One worker task drains the queue, so the engine sees a connection's calls
//! in the order the client sent them. The worker is not tied to the socket:
//! closing the connection cancels nothing already queued, and the disconnect
//! cash-out lands behind every earlier call.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::engine::{EngineError, GameEngine};
use crate::error::INTERNAL_ERROR;
use crate::models::AuthenticatedUser;
use crate::AppState;

use super::events::Ack;
use super::fanout::Outbox;

/// A state-mutating engine call made on behalf of one connection.
#[derive(Debug)]
pub enum EngineCall {
    PlaceBet {
        amount: u64,
        auto_cash_out: Option<u64>,
        ack: Ack,
    },
    CashOut {
        ack: Ack,
    },
    UpdateAutoCashOut(Option<u64>),
    /// Cash-out issued after the transport closed. Nobody is answered.
    DisconnectCashOut,
}

struct Queued {
    user: AuthenticatedUser,
    call: EngineCall,
}

/// Sending half of a connection's engine queue.
#[derive(Clone)]
pub struct EngineQueue {
    tx: mpsc::UnboundedSender<Queued>,
}

impl EngineQueue {
    /// Start the worker on the app's task tracker. It stops once every
    /// handle is dropped and the queue is drained.
    pub fn spawn(state: &AppState, connection_id: String, outbox: Outbox) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Queued>();
        let engine = state.engine.clone();
        state.tasks.spawn(async move {
            while let Some(Queued { user, call }) = rx.recv().await {
                run(engine.as_ref(), &connection_id, &user, call, &outbox).await;
            }
        });
        Self { tx }
    }

    pub fn push(&self, user: &AuthenticatedUser, call: EngineCall) {
        let queued = Queued {
            user: user.clone(),
            call,
        };
        if let Err(mpsc::error::SendError(dropped)) = self.tx.send(queued) {
            tracing::error!(
                user_id = dropped.user.id,
                call = ?dropped.call,
                "[INTERNAL_ERROR] engine worker gone; call dropped"
            );
        }
    }
}

async fn run(
    engine: &dyn GameEngine,
    connection_id: &str,
    user: &AuthenticatedUser,
    call: EngineCall,
    outbox: &Outbox,
) {
    let reply = match call {
        EngineCall::PlaceBet {
            amount,
            auto_cash_out,
            ack,
        } => match engine.place_bet(user, amount, auto_cash_out).await {
            Ok(()) => ack.ok(None),
            Err(EngineError::Rejected(code)) => ack.reject(&code),
            Err(err) => {
                tracing::error!(%connection_id, user_id = user.id, %err, "[INTERNAL_ERROR] unable to place bet");
                ack.reject(INTERNAL_ERROR)
            }
        },
        // Unclassified failures are logged and left unanswered.
        EngineCall::CashOut { ack } => match engine.cash_out(user).await {
            Ok(()) => ack.ok(None),
            Err(EngineError::Rejected(code)) => ack.reject(&code),
            Err(err) => {
                tracing::error!(%connection_id, user_id = user.id, %err, "[INTERNAL_ERROR] unable to cash out");
                return;
            }
        },
        EngineCall::UpdateAutoCashOut(amount) => {
            engine.update_auto_cash_out(user, amount);
            return;
        }
        EngineCall::DisconnectCashOut => {
            match engine.cash_out(user).await {
                Ok(()) => {
                    tracing::info!(%connection_id, user_id = user.id, "cashed out on disconnect");
                }
                Err(EngineError::Rejected(code)) => {
                    tracing::debug!(%connection_id, user_id = user.id, %code, "nothing to cash out on disconnect");
                }
                Err(err) => {
                    tracing::error!(%connection_id, user_id = user.id, %err, "[INTERNAL_ERROR] auto cash out on disconnect failed");
                }
            }
            return;
        }
    };
    // The connection may already be gone; its reply is dropped.
    let _ = outbox.send(Arc::new(reply));
}
