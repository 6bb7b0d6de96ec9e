//! Test utilities: a mock OpenAI-compatible upstream.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use caster::openai::{OpenAiClient, OpenAiConfig};

/// Canned behavior for the mock completions endpoint.
#[derive(Clone)]
pub enum MockReply {
    /// 200 with a single-choice chat response.
    Chat(String),
    /// Non-success status with a verbatim body.
    Error(StatusCode, String),
    /// 200 with an arbitrary body.
    Raw(String),
    /// 200 with the given event lines, newline-joined.
    Stream(Vec<String>),
}

/// One captured request: the bearer header and the parsed JSON body.
#[derive(Clone)]
pub struct CapturedRequest {
    pub authorization: String,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    reply: MockReply,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

pub struct MockUpstream {
    pub url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockUpstream {
    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Serve the mock upstream on an ephemeral port.
pub async fn spawn_upstream(reply: MockReply) -> MockUpstream {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        reply,
        requests: requests.clone(),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream {
        url: format!("http://{addr}/v1/chat/completions"),
        requests,
    }
}

async fn completions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state
        .requests
        .lock()
        .unwrap()
        .push(CapturedRequest { authorization, body });

    match state.reply {
        MockReply::Chat(content) => Json(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
        .into_response(),
        MockReply::Error(status, body) => (status, body).into_response(),
        MockReply::Raw(body) => body.into_response(),
        MockReply::Stream(lines) => {
            let mut body = lines.join("\n");
            body.push('\n');
            ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
        }
    }
}

/// Client pointed at a mock upstream.
pub fn test_client(url: &str) -> OpenAiClient {
    OpenAiClient::new(OpenAiConfig {
        endpoint: url.to_string(),
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        temperature: None,
        request_timeout: Some(Duration::from_secs(5)),
    })
}
