//! Commands available to an authenticated connection, plus the disconnect
//! safety cash-out.
//!
//! Engine calls go through the connection's [`EngineQueue`]: they reach the
//! engine in the order received, and a disconnect never cancels one already
//! queued.

use serde_json::Value;

use crate::error::GatewayError;
use crate::models::ChatMessage;
use crate::validate;
use crate::AppState;

use super::events::{Ack, EventName, ServerMessage};
use super::queue::{EngineCall, EngineQueue};
use super::session::GatewaySession;

static NULL: Value = Value::Null;

fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&NULL)
}

/// `place_bet(amount, autoCashOut, ack)`. Silently ignored for
/// unauthenticated connections.
pub fn place_bet(
    session: &GatewaySession,
    args: &[Value],
    ack: Option<Ack>,
    calls: &EngineQueue,
) -> Result<(), GatewayError> {
    let Some(user) = session.user() else {
        return Ok(());
    };

    let amount = validate::bet_amount(arg(args, 0))
        .map_err(|err| GatewayError::protocol(EventName::PLACE_BET, err))?;
    let auto_cash_out = validate::auto_cash_out(arg(args, 1))
        .map_err(|_| GatewayError::protocol(EventName::PLACE_BET, "auto_cashout problem"))?;
    let ack = ack.ok_or_else(|| GatewayError::protocol(EventName::PLACE_BET, "No ack"))?;

    calls.push(
        user,
        EngineCall::PlaceBet {
            amount,
            auto_cash_out,
            ack,
        },
    );
    Ok(())
}

/// `cash_out(ack)`.
///
/// Unclassified engine failures are logged and left unanswered, unlike
/// `place_bet` which replies `INTERNAL_ERROR`.
pub fn cash_out(
    session: &GatewaySession,
    ack: Option<Ack>,
    calls: &EngineQueue,
) -> Result<(), GatewayError> {
    let user = session
        .user()
        .ok_or_else(|| GatewayError::protocol(EventName::CASH_OUT, "not logged in"))?;
    let ack = ack.ok_or_else(|| GatewayError::protocol(EventName::CASH_OUT, "No ack"))?;

    calls.push(user, EngineCall::CashOut { ack });
    Ok(())
}

/// `set_auto_cash_out(amount)`. A falsy amount clears the setting.
pub fn set_auto_cash_out(
    session: &mut GatewaySession,
    args: &[Value],
    calls: &EngineQueue,
) -> Result<(), GatewayError> {
    if session.user().is_none() {
        return Err(GatewayError::protocol(
            EventName::SET_AUTO_CASH_OUT,
            "not logged in",
        ));
    }

    let amount = validate::auto_cash_out(arg(args, 0))
        .map_err(|_| GatewayError::protocol(EventName::SET_AUTO_CASH_OUT, "amount problem"))?;

    session.set_auto_cash_out(amount);
    if let Some(user) = session.user() {
        calls.push(user, EngineCall::UpdateAutoCashOut(amount));
    }
    Ok(())
}

/// `say(message)`: record in chat history and broadcast to the joined group.
pub fn say(state: &AppState, session: &GatewaySession, args: &[Value]) -> Result<(), GatewayError> {
    let user = session
        .user()
        .ok_or_else(|| GatewayError::protocol(EventName::SAY, "not logged in"))?;

    let message = arg(args, 0)
        .as_str()
        .ok_or_else(|| GatewayError::protocol(EventName::SAY, "no message"))?;
    if !validate::chat_message_len_ok(message) {
        return Err(GatewayError::protocol(EventName::SAY, "invalid message size"));
    }

    let chat = ChatMessage::new(user.username.clone(), message);
    let payload = serde_json::to_value(&chat)
        .map_err(|err| GatewayError::internal("Unable to encode chat message", err))?;

    // History order and broadcast order stay identical across speakers.
    state.group.broadcast_after(
        || state.chat.push(chat),
        ServerMessage::emit(EventName::SAY, vec![payload]),
    );
    Ok(())
}

/// Transport closed: leave the group and, if authenticated, queue a cash-out
/// behind the connection's earlier engine calls. Failures are only logged;
/// there is nobody left to tell.
pub fn disconnect(state: &AppState, session: &GatewaySession, calls: &EngineQueue) {
    state.group.leave(&session.connection_id);
    tracing::info!(connection_id = %session.connection_id, "client disconnected");

    if let Some(user) = session.user() {
        calls.push(user, EngineCall::DisconnectCashOut);
    }
}
