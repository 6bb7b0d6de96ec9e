//! HTTP handlers for the chat page and message ingress.

use axum::Form;
use axum::Json;
use axum::extract::State;
use axum::response::Html;
use serde::{Deserialize, Serialize};

use crate::relay::{assistant_line, user_line};

use super::error::ApiError;
use super::state::AppState;

const CHAT_PAGE: &str = include_str!("../../assets/chat.html");

/// GET / — the chat page.
pub async fn chat_page() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
pub struct SendForm {
    pub message: String,
}

/// POST /send — submit a user message and wait for the assistant reply.
///
/// Returns the same rendered lines that were broadcast, so a caller without
/// a WebSocket still sees the exchange.
pub async fn send_message(
    State(state): State<AppState>,
    Form(form): Form<SendForm>,
) -> Result<Html<String>, ApiError> {
    let message = form.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }

    let reply = if state.stream_replies {
        state.session.submit_streaming(message).await?
    } else {
        state.session.submit(message).await?
    };

    Ok(Html(format!(
        "{}{}",
        user_line(message),
        assistant_line(&reply)
    )))
}
