//! Conversation history store.

use tokio::sync::Mutex;

use crate::openai::ChatMessage;

/// Append-only conversation history behind a single lock.
///
/// The whole history is resent as model context on every turn, so ordering
/// is the contract: once appended, a message is never removed or reordered,
/// and no snapshot can observe a half-written message. The store does no
/// I/O and generates no failures.
pub struct ConversationStore {
    messages: Mutex<Vec<ChatMessage>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Seed the history with a system prompt. Done exactly once, at
    /// construction.
    pub fn with_system_prompt(prompt: &str) -> Self {
        Self {
            messages: Mutex::new(vec![ChatMessage::system(prompt)]),
        }
    }

    /// Append a message to the end of the history.
    pub async fn append(&self, message: ChatMessage) {
        self.messages.lock().await.push(message);
    }

    /// Clone the current history for use as completion context.
    pub async fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
