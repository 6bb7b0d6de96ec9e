//! Caster — a real-time chat relay.
//!
//! Bridges one shared conversation with an OpenAI-compatible completion
//! endpoint and fans every message, human or assistant, out to all connected
//! viewers over WebSockets.

pub mod openai;
pub mod relay;
pub mod server;
pub mod settings;
