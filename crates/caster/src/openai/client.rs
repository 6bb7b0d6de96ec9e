//! HTTP client for the completion endpoint.

use std::time::Duration;

use futures::StreamExt;
use log::debug;
use reqwest::Client;

use super::error::{OpenAiError, OpenAiResult};
use super::stream::DeltaParser;
use super::types::{ChatMessage, ChatRequest, ChatResponse};

/// Stock OpenAI completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Static configuration for the client.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full URL of the completions endpoint.
    pub endpoint: String,
    /// Bearer credential.
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Optional sampling temperature.
    pub temperature: Option<f32>,
    /// Optional deadline for a whole call, streaming included. Expiry
    /// surfaces as a transport error.
    pub request_timeout: Option<Duration>,
}

/// Client for the chat-completions protocol.
///
/// Holds no state beyond configuration; every call builds its own request,
/// so one client is safe to share across concurrent callers.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Request one final completion for `history`.
    ///
    /// Returns the first choice's message content. A response with zero
    /// choices is an upstream contract violation and surfaces as a decode
    /// error rather than a panic.
    pub async fn complete(&self, history: &[ChatMessage]) -> OpenAiResult<String> {
        let response = self.send_request(history, false).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenAiError::Upstream { status, body });
        }

        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|err| OpenAiError::Decode(err.to_string()))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| OpenAiError::Decode("response contained no choices".to_string()))?;
        Ok(choice.message.content)
    }

    /// Request a streamed completion, delivering each delta to `on_delta` in
    /// wire order on the calling task.
    ///
    /// Errors are evaluated before streaming begins. A connection that dies
    /// after the success status is treated as a short stream, not an error;
    /// the callback simply stops being invoked.
    pub async fn stream_complete(
        &self,
        history: &[ChatMessage],
        mut on_delta: impl FnMut(&str),
    ) -> OpenAiResult<()> {
        let response = self.send_request(history, true).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenAiError::Upstream { status, body });
        }

        let mut parser = DeltaParser::new();
        let mut body = response.bytes_stream();
        while let Some(next) = body.next().await {
            match next {
                Ok(chunk) => parser.feed(&chunk, &mut on_delta),
                Err(err) => {
                    debug!("completion stream ended early: {err}");
                    break;
                }
            }
        }
        parser.finish(&mut on_delta);
        Ok(())
    }

    async fn send_request(
        &self,
        history: &[ChatMessage],
        stream: bool,
    ) -> OpenAiResult<reqwest::Response> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: history,
            stream,
            temperature: self.config.temperature,
        };

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body);
        if let Some(timeout) = self.config.request_timeout {
            request = request.timeout(timeout);
        }

        Ok(request.send().await?)
    }
}
