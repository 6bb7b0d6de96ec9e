//! HTTP ingress and WebSocket egress.
//!
//! Thin shells over the relay core: `POST /send` feeds the session,
//! `GET /ws` attaches a viewer to the broadcast hub.

mod error;
mod handlers;
mod state;
mod ws;

pub use error::ApiError;
pub use state::AppState;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::chat_page))
        .route("/health", get(handlers::health))
        .route("/send", post(handlers::send_message))
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
