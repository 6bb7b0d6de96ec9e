//! Shared application state.

use std::sync::Arc;

use crate::relay::{ChatHub, ChatSession};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<ChatSession>,
    pub hub: Arc<ChatHub>,
    /// Stream assistant replies to viewers as they are generated instead of
    /// one final message.
    pub stream_replies: bool,
}

impl AppState {
    pub fn new(session: Arc<ChatSession>, hub: Arc<ChatHub>, stream_replies: bool) -> Self {
        Self {
            session,
            hub,
            stream_replies,
        }
    }
}
