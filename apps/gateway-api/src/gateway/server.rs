//! WebSocket upgrade handler and per-connection event loop.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use crashline_common::id::{prefix, prefixed_ulid};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::AppState;

use super::commands;
use super::events::ServerMessage;
use super::handler::{dispatch, parse_frame};
use super::lifecycle::Admission;
use super::queue::EngineQueue;
use super::session::GatewaySession;

pub fn router() -> Router<AppState> {
    Router::new().route("/socket", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    // Upgraded sockets outlive the HTTP server; shutdown waits on this token.
    let _tracked = state.tasks.token();
    let connection_id = prefixed_ulid(prefix::CONNECTION);
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Step 1: the shutdown gate. Once closed, new sockets only hear `update`.
    let mut shutdown_rx = match state.shutdown.admit() {
        Admission::Open(rx) => rx,
        Admission::Closed => {
            tracing::debug!(%connection_id, "connection during shutdown; sending update");
            let _ = send_message(&mut ws_tx, &ServerMessage::update()).await;
            return;
        }
    };

    tracing::debug!(%connection_id, "connection accepted");

    // Step 2: the event loop. Only `join` is armed until the handshake succeeds.
    let (outbox, mut outbound) = mpsc::unbounded_channel::<Arc<ServerMessage>>();
    let calls = EngineQueue::spawn(&state, connection_id.clone(), outbox.clone());
    let mut session = GatewaySession::new(connection_id);
    let mut awaiting_shutdown = true;

    loop {
        tokio::select! {
            // Client sends us a message.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let result = match parse_frame(&text) {
                            Ok(client_msg) => dispatch(&state, &mut session, client_msg, &outbox, &calls).await,
                            Err(err) => Err(err),
                        };
                        if let Err(err) = result {
                            let _ = outbox.send(Arc::new(err.into_client_message(&session.connection_id)));
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, connection_id = %session.connection_id, "ws read error");
                        break;
                    }
                    Some(Ok(_)) => continue,
                }
            }

            // Acks, errors, and broadcasts queued for this socket.
            Some(msg) = outbound.recv() => {
                if send_message(&mut ws_tx, &msg).await.is_err() {
                    break;
                }
            }

            // Engine shutdown: tell the client once.
            changed = shutdown_rx.changed(), if awaiting_shutdown => {
                awaiting_shutdown = false;
                if changed.is_ok() {
                    let _ = outbox.send(Arc::new(ServerMessage::update()));
                }
            }
        }
    }

    commands::disconnect(&state, &session, &calls);
}

async fn send_message(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(err) => {
            tracing::error!(?err, "failed to encode server message");
            return Ok(());
        }
    };
    ws_tx.send(Message::Text(json.into())).await
}
