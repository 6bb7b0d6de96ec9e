//! The shared conversation session.

use std::sync::Arc;

use log::warn;
use tokio::sync::Mutex;

use crate::openai::{ChatMessage, OpenAiClient, OpenAiResult};

use super::history::ConversationStore;
use super::hub::ChatHub;
use super::render;

/// One shared conversation bridged to the completion endpoint.
///
/// The turn mutex serializes the whole append/snapshot/complete/append
/// sequence: at most one completion call is in flight per conversation and
/// history interleaves user and assistant messages in submission order. The
/// store lock itself is only held for the appends and the snapshot, never
/// across the network call.
pub struct ChatSession {
    client: OpenAiClient,
    store: ConversationStore,
    hub: Arc<ChatHub>,
    turn: Mutex<()>,
}

impl ChatSession {
    pub fn new(client: OpenAiClient, hub: Arc<ChatHub>, system_prompt: Option<&str>) -> Self {
        let store = match system_prompt {
            Some(prompt) => ConversationStore::with_system_prompt(prompt),
            None => ConversationStore::new(),
        };
        Self {
            client,
            store,
            hub,
            turn: Mutex::new(()),
        }
    }

    pub fn history(&self) -> &ConversationStore {
        &self.store
    }

    /// Submit a user message and wait for the assistant reply.
    ///
    /// Broadcasts the rendered user message, then the rendered assistant
    /// reply. On failure the user message stays in history, no assistant
    /// event is broadcast, and the error propagates so the caller is told
    /// the turn failed.
    pub async fn submit(&self, text: &str) -> OpenAiResult<String> {
        let _turn = self.turn.lock().await;

        self.store.append(ChatMessage::user(text)).await;
        self.hub.publish(render::user_line(text));

        let history = self.store.snapshot().await;
        let reply = self.client.complete(&history).await.inspect_err(|err| {
            warn!("completion failed: {err}");
        })?;

        self.store.append(ChatMessage::assistant(&reply)).await;
        self.hub.publish(render::assistant_line(&reply));
        Ok(reply)
    }

    /// Streaming variant: every delta is broadcast as it arrives and the
    /// assembled reply is appended to history once at the end of the
    /// stream. No store lock is held while deltas flow. History keeps the
    /// raw model text; broadcast fragments are escaped like every other
    /// viewer-facing payload.
    pub async fn submit_streaming(&self, text: &str) -> OpenAiResult<String> {
        let _turn = self.turn.lock().await;

        self.store.append(ChatMessage::user(text)).await;
        self.hub.publish(render::user_line(text));

        let history = self.store.snapshot().await;
        let mut reply = String::new();
        self.client
            .stream_complete(&history, |delta| {
                reply.push_str(delta);
                if !delta.is_empty() {
                    self.hub.publish(render::escape_html(delta));
                }
            })
            .await
            .inspect_err(|err| {
                warn!("streaming completion failed: {err}");
            })?;

        self.store.append(ChatMessage::assistant(&reply)).await;
        Ok(reply)
    }
}
