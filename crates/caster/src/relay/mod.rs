//! Conversation, subscriber registry and broadcast engine.
//!
//! Two independently locked domains: the conversation history (append-only,
//! turn-serialized) and the subscriber registry (concurrent add/remove while
//! delivery is in progress). Neither lock is ever held while acquiring the
//! other.

mod history;
mod hub;
mod render;
mod session;

pub use history::ConversationStore;
pub use hub::{BroadcastRouter, ChatHub, SubscriberId};
pub use render::{assistant_line, user_line};
pub use session::ChatSession;
