//! Recent chat history shared by every connection.

use crashline_common::RingBuffer;
use parking_lot::Mutex;

use crate::models::ChatMessage;

/// Number of messages kept and sent to clients on join.
pub const CHAT_HISTORY_CAPACITY: usize = 40;

pub struct ChatHistory {
    messages: Mutex<RingBuffer<ChatMessage>>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(RingBuffer::new(CHAT_HISTORY_CAPACITY)),
        }
    }

    /// Append a message, evicting the oldest once full.
    pub fn push(&self, message: ChatMessage) {
        self.messages.lock().push(message);
    }

    /// Oldest first.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.lock().to_vec()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new()
    }
}
