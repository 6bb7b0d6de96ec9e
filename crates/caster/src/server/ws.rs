//! WebSocket egress for live viewers.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};

use super::state::AppState;

/// Ping interval for keepalive.
const PING_INTERVAL_SECS: u64 = 30;

/// GET /ws — upgrade and attach a viewer to the broadcast hub.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_viewer(socket, state))
}

async fn handle_viewer(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (id, mut events) = state.hub.register();

    let hub = state.hub.clone();
    let send_task = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(payload) = event else { break };
                    if sender.send(Message::Text(payload.into())).await.is_err() {
                        // Write failure: evict here rather than waiting for
                        // the read loop to notice the close. Unregister is
                        // idempotent, so racing the read loop is fine.
                        hub.unregister(id);
                        break;
                    }
                }
                _ = ping_interval.tick() => {
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        hub.unregister(id);
                        break;
                    }
                }
            }
        }
    });

    // Viewers never send commands; drain until the socket closes.
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) => {
                info!("viewer {id} closed the connection");
                break;
            }
            Ok(_) => debug!("ignoring inbound message from viewer {id}"),
            Err(err) => {
                warn!("viewer {id} socket error: {err}");
                break;
            }
        }
    }

    send_task.abort();
    state.hub.unregister(id);
    info!("viewer {id} disconnected");
}
