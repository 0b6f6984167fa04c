//! The one-time `join` handshake.
//!
//! Validate → (optionally) exchange the one-time token → fetch table history
//! → ack the snapshot → enter the joined group. Each step is awaited in turn
//! and the first failure ends the attempt; a connection never gets a second
//! one.

use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::auth::tokens::TokenError;
use crate::error::GatewayError;
use crate::models::AuthenticatedUser;
use crate::validate;
use crate::AppState;

use super::events::{Ack, EventName, ServerMessage};
use super::fanout::Outbox;
use super::session::GatewaySession;

/// A join request that passed local validation.
#[derive(Debug, PartialEq)]
pub struct JoinRequest {
    pub auto_cash_out: Option<u64>,
    pub ott: Option<Uuid>,
}

impl JoinRequest {
    /// Check `info` without calling any collaborator.
    pub fn parse(info: Option<&Value>) -> Result<Self, GatewayError> {
        let info = match info {
            Some(Value::Object(info)) => info,
            _ => return Err(GatewayError::protocol(EventName::JOIN, "Invalid info")),
        };

        let auto_cash_out = validate::auto_cash_out(info.get("auto_cash_out").unwrap_or(&Value::Null))
            .map_err(|_| GatewayError::protocol(EventName::JOIN, "Invalid auto cash out"))?;

        let ott = match info.get("ott") {
            Some(token) if validate::is_truthy(token) => Some(
                validate::uuid_v4(token)
                    .ok_or_else(|| GatewayError::protocol(EventName::JOIN, "ott not valid"))?,
            ),
            _ => None,
        };

        Ok(Self { auto_cash_out, ott })
    }
}

/// Run the handshake for `session`. Only the first call per session does
/// anything.
pub async fn handle_join(
    state: &AppState,
    session: &mut GatewaySession,
    args: &[Value],
    ack: Option<Ack>,
    outbox: &Outbox,
) -> Result<(), GatewayError> {
    if !session.begin_join() {
        tracing::debug!(connection_id = %session.connection_id, "repeated join ignored");
        return Ok(());
    }

    match join(state, &session.connection_id, args, ack, outbox).await {
        Ok(Some((user, auto_cash_out))) => {
            tracing::info!(
                connection_id = %session.connection_id,
                username = user.as_ref().map(|u| u.username.as_str()),
                "connection joined"
            );
            session.complete_join(user, auto_cash_out);
            Ok(())
        }
        Ok(None) => {
            session.abandon_join();
            Ok(())
        }
        Err(err) => {
            session.abandon_join();
            Err(err)
        }
    }
}

type Joined = (Option<AuthenticatedUser>, Option<u64>);

/// `Ok(None)` means the client was answered with a domain error.
async fn join(
    state: &AppState,
    connection_id: &str,
    args: &[Value],
    ack: Option<Ack>,
    outbox: &Outbox,
) -> Result<Option<Joined>, GatewayError> {
    let ack = ack.ok_or_else(|| GatewayError::protocol(EventName::JOIN, "No ack function"))?;
    let request = JoinRequest::parse(args.first())?;

    let user = match request.ott {
        Some(token) => match state.tokens.validate_one_time_token(token).await {
            Ok(user) => Some(user),
            Err(TokenError::NotValidToken) => {
                tracing::debug!(%connection_id, "join with invalid one-time token");
                let _ = outbox.send(Arc::new(ack.reject(TokenError::NOT_VALID_TOKEN)));
                return Ok(None);
            }
            Err(err) => return Err(GatewayError::internal("Unable to validate ott", err)),
        },
        None => None,
    };

    let history = state
        .history
        .game_history()
        .await
        .map_err(|err| GatewayError::internal("Unable to get table history", err))?;

    // Snapshot and membership happen under the group's sequence lock, so
    // every chat message or relayed event is either in the snapshot or
    // delivered after it.
    let welcome = || -> Result<ServerMessage, GatewayError> {
        let mut response = state.engine.info();
        insert_json(&mut response, "chat", &state.chat.snapshot())?;
        insert_json(&mut response, "table_history", &history)?;
        response.insert(
            "username".into(),
            user.as_ref()
                .map_or(Value::Null, |u| Value::String(u.username.clone())),
        );
        response.insert(
            "balance_satoshis".into(),
            user.as_ref()
                .map_or(Value::Null, |u| Value::from(u.balance_satoshis)),
        );
        Ok(ack.ok(Some(Value::Object(response))))
    };
    state.group.admit(connection_id, outbox, welcome)?;

    Ok(Some((user, request.auto_cash_out)))
}

fn insert_json<T: serde::Serialize>(
    response: &mut Map<String, Value>,
    key: &str,
    value: &T,
) -> Result<(), GatewayError> {
    let value = serde_json::to_value(value)
        .map_err(|err| GatewayError::internal("Unable to encode join response", err))?;
    response.insert(key.to_string(), value);
    Ok(())
}
