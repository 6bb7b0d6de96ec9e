//! OpenAI-compatible chat completion client.
//!
//! Speaks the chat-completions wire protocol: `POST` with bearer auth and a
//! JSON body, either one final response object or a `data: `-framed stream
//! of incremental delta chunks.

mod client;
mod error;
mod stream;
mod types;

pub use client::{DEFAULT_ENDPOINT, OpenAiClient, OpenAiConfig};
pub use error::{OpenAiError, OpenAiResult};
pub use types::{ChatMessage, Role};
