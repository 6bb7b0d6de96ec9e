//! Completion client error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for completion calls.
pub type OpenAiResult<T> = Result<T, OpenAiError>;

/// Errors from a completion call.
///
/// Nothing is retried internally; callers can layer a retry policy on the
/// error kind.
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// Network-level failure: connect, send, body read, or deadline expiry.
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint rejected the request. The body is the raw response
    /// payload, surfaced verbatim for diagnostics.
    #[error("completion endpoint returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    /// The response did not match the expected schema.
    #[error("malformed completion response: {0}")]
    Decode(String),
}
