//! The joined group: every connection that completed the join handshake.
//!
//! Each member is represented by its outbound queue. Queues are unbounded,
//! so a broadcast reaches every member regardless of how far behind its
//! socket is. Broadcasts and admissions are serialized by one lock: a new
//! member's welcome snapshot and the broadcasts it receives afterwards form a
//! gap-free sequence.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::events::ServerMessage;

/// Sending half of a connection's outbound queue.
pub type Outbox = mpsc::UnboundedSender<Arc<ServerMessage>>;

pub struct JoinedGroup {
    members: DashMap<String, Outbox>,
    sequence: Mutex<()>,
}

impl JoinedGroup {
    pub fn new() -> Self {
        Self {
            members: DashMap::new(),
            sequence: Mutex::new(()),
        }
    }

    /// Add a member without a welcome message.
    pub fn join(&self, connection_id: &str, outbox: Outbox) {
        let _sequence = self.sequence.lock();
        self.members.insert(connection_id.to_string(), outbox);
    }

    /// Build the welcome message, queue it, and add the member, with no
    /// broadcast landing in between. Nothing is queued or added if `welcome`
    /// fails.
    pub fn admit<E>(
        &self,
        connection_id: &str,
        outbox: &Outbox,
        welcome: impl FnOnce() -> Result<ServerMessage, E>,
    ) -> Result<(), E> {
        let _sequence = self.sequence.lock();
        let message = welcome()?;
        let _ = outbox.send(Arc::new(message));
        self.members.insert(connection_id.to_string(), outbox.clone());
        Ok(())
    }

    pub fn leave(&self, connection_id: &str) -> bool {
        self.members.remove(connection_id).is_some()
    }

    pub fn contains(&self, connection_id: &str) -> bool {
        self.members.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Queue `message` for every member.
    pub fn broadcast(&self, message: ServerMessage) {
        self.broadcast_after(|| {}, message);
    }

    /// Run `record`, then queue `message` for every member, as one step
    /// relative to other broadcasts and admissions.
    pub fn broadcast_after(&self, record: impl FnOnce(), message: ServerMessage) {
        let message = Arc::new(message);
        let _sequence = self.sequence.lock();
        record();
        for member in self.members.iter() {
            // A closed queue means the connection is tearing down; it leaves
            // the group right after.
            let _ = member.value().send(message.clone());
        }
    }
}

impl Default for JoinedGroup {
    fn default() -> Self {
        Self::new()
    }
}
