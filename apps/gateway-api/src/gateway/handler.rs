//! Incoming event dispatch.

use serde_json::Value;

use crate::error::GatewayError;
use crate::AppState;

use super::commands;
use super::events::{Ack, ClientMessage, EventName};
use super::fanout::Outbox;
use super::handshake;
use super::queue::EngineQueue;
use super::session::GatewaySession;

/// Route one client event according to the session's state.
///
/// Before a successful join only `join` is armed; anything else is dropped.
pub async fn dispatch(
    state: &AppState,
    session: &mut GatewaySession,
    message: ClientMessage,
    outbox: &Outbox,
    calls: &EngineQueue,
) -> Result<(), GatewayError> {
    let ClientMessage { event, args, ack } = message;
    let ack = ack.map(Ack::new);

    if event == EventName::JOIN {
        return handshake::handle_join(state, session, &args, ack, outbox).await;
    }

    if !session.has_joined() {
        tracing::debug!(connection_id = %session.connection_id, %event, "event before join ignored");
        return Ok(());
    }

    match event.as_str() {
        EventName::PLACE_BET => commands::place_bet(session, &args, ack, calls),
        EventName::CASH_OUT => commands::cash_out(session, ack, calls),
        EventName::SET_AUTO_CASH_OUT => commands::set_auto_cash_out(session, &args, calls),
        EventName::SAY => commands::say(state, session, &args),
        _ => {
            tracing::debug!(connection_id = %session.connection_id, %event, "unknown event ignored");
            Ok(())
        }
    }
}

/// Parse a text frame into a [`ClientMessage`].
pub fn parse_frame(text: &str) -> Result<ClientMessage, GatewayError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|_| GatewayError::Protocol("[frame] invalid JSON".to_string()))?;
    serde_json::from_value(value)
        .map_err(|_| GatewayError::Protocol("[frame] expected an event envelope".to_string()))
}
