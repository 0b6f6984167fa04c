//! Per-connection gateway session state.

use crate::models::AuthenticatedUser;

/// Where a connection is in its lifecycle.
///
/// `Connecting → Handshaking → Joined | Authenticated | Abandoned`. A
/// connection gets exactly one join attempt; a failed attempt is terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Connecting,
    Handshaking,
    /// Joined without a token: observes broadcasts only.
    Joined { auto_cash_out: Option<u64> },
    Authenticated {
        user: AuthenticatedUser,
        auto_cash_out: Option<u64>,
    },
    Abandoned,
}

/// State for a single WebSocket connection. Owned by the connection task.
pub struct GatewaySession {
    /// Unique connection identifier (`conn_` prefixed ULID).
    pub connection_id: String,
    state: SessionState,
}

impl GatewaySession {
    pub fn new(connection_id: String) -> Self {
        Self {
            connection_id,
            state: SessionState::Connecting,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Claim the single join attempt. Returns `false` if it was already used.
    pub fn begin_join(&mut self) -> bool {
        if self.state != SessionState::Connecting {
            return false;
        }
        self.state = SessionState::Handshaking;
        true
    }

    pub fn complete_join(&mut self, user: Option<AuthenticatedUser>, auto_cash_out: Option<u64>) {
        debug_assert_eq!(self.state, SessionState::Handshaking);
        self.state = match user {
            Some(user) => SessionState::Authenticated {
                user,
                auto_cash_out,
            },
            None => SessionState::Joined { auto_cash_out },
        };
    }

    pub fn abandon_join(&mut self) {
        self.state = SessionState::Abandoned;
    }

    pub fn has_joined(&self) -> bool {
        matches!(
            self.state,
            SessionState::Joined { .. } | SessionState::Authenticated { .. }
        )
    }

    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match &self.state {
            SessionState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn auto_cash_out(&self) -> Option<u64> {
        match self.state {
            SessionState::Joined { auto_cash_out } => auto_cash_out,
            SessionState::Authenticated { auto_cash_out, .. } => auto_cash_out,
            _ => None,
        }
    }

    /// Only meaningful once joined; ignored otherwise.
    pub fn set_auto_cash_out(&mut self, amount: Option<u64>) {
        match &mut self.state {
            SessionState::Joined { auto_cash_out }
            | SessionState::Authenticated { auto_cash_out, .. } => *auto_cash_out = amount,
            _ => {}
        }
    }
}
