//! Language-model backend errors.

use thiserror::Error;

/// Failure talking to a generation or completion backend.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Language model not configured: {0}")]
    NotConfigured(String),

    #[error("Language model request failed: {0}")]
    RequestFailed(String),

    #[error("Language model response parse error: {0}")]
    ParseError(String),

    #[error("Language model request timed out")]
    Timeout,

    #[error("Language model server unreachable: {0}")]
    Unreachable(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Unreachable(e.to_string())
        } else if e.is_decode() {
            Self::ParseError(e.to_string())
        } else {
            Self::RequestFailed(e.to_string())
        }
    }
}

/// Turn a non-success upstream response into an error carrying its body.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LlmError::RequestFailed(format!("HTTP {}: {}", status, body)))
}
