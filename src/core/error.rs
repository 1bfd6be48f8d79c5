//! Error types and handling for the notes server.
//!
//! This module defines a unified error type that can represent errors from
//! all domains and external dependencies. Each error carries a
//! machine-readable `kind` and maps to an HTTP status, so handlers never
//! inspect messages to decide how to respond.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::domains::files::{FileAccessError, FileFailure};
use crate::domains::llm::LlmError;
use crate::domains::notes::NoteError;

/// A specialized Result type for notes server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the notes server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the file access gate.
    #[error(transparent)]
    Files(#[from] FileAccessError),

    /// Error originating from the notes store.
    #[error(transparent)]
    Notes(#[from] NoteError),

    /// Error originating from a language-model backend.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The request was malformed or missing a required field.
    #[error("{0}")]
    BadRequest(String),

    /// A multi-file request in which no file could be read.
    #[error("None of the provided files could be read")]
    NoReadableFiles(Vec<FileFailure>),

    /// I/O errors outside the file access gate (uploads, startup).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors that should not occur under normal operation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new bad request error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Machine-readable classification sent to clients as `kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Files(e) => e.kind().as_str(),
            Self::Notes(NoteError::NotFound(_)) => "not_found",
            Self::Notes(NoteError::InvalidInput(_)) => "bad_request",
            Self::Notes(_) => "storage",
            Self::Llm(LlmError::NotConfigured(_)) => "not_configured",
            Self::Llm(_) => "upstream",
            Self::BadRequest(_) | Self::NoReadableFiles(_) => "bad_request",
            Self::Io(_) | Self::Internal(_) => "internal",
        }
    }

    /// HTTP status for this error.
    ///
    /// Policy violations are client errors (403). Filesystem failures,
    /// including a missing path, are server errors that keep their `kind`.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Files(e) if e.kind().is_policy_violation() => StatusCode::FORBIDDEN,
            Self::Files(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Notes(NoteError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Notes(NoteError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::Notes(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Llm(LlmError::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Llm(LlmError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            Self::Llm(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) | Self::NoReadableFiles(_) => StatusCode::BAD_REQUEST,
            Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The JSON body reported to clients for this error.
    pub fn into_body(self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
            file_errors: match self {
                Self::NoReadableFiles(failures) => Some(failures),
                _ => None,
            },
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Background task failed: {}", e))
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_errors: Option<Vec<FileFailure>>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }

        (status, Json(self.into_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_policy_errors_are_forbidden() {
        let denied: Error = FileAccessError::AccessDenied {
            path: PathBuf::from("/etc"),
        }
        .into();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        assert_eq!(denied.kind(), "access_denied");

        let too_large: Error = FileAccessError::TooLarge {
            path: PathBuf::from("/n/a.md"),
            size: 2,
            max: 1,
        }
        .into();
        assert_eq!(too_large.status(), StatusCode::FORBIDDEN);
        assert_eq!(too_large.kind(), "too_large");
    }

    #[test]
    fn test_filesystem_failures_are_server_errors() {
        let io: Error = FileAccessError::Io {
            path: PathBuf::from("/n"),
            source: std::io::Error::other("disk on fire"),
        }
        .into();
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let missing: Error = FileAccessError::NotFound {
            path: PathBuf::from("/n/x.md"),
        }
        .into();
        assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(missing.kind(), "not_found");
    }

    #[test]
    fn test_backend_errors() {
        let unconfigured: Error = LlmError::NotConfigured("no key".into()).into();
        assert_eq!(unconfigured.status(), StatusCode::SERVICE_UNAVAILABLE);

        let down: Error = LlmError::Unreachable("refused".into()).into();
        assert_eq!(down.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(down.kind(), "upstream");
    }

    #[test]
    fn test_body_carries_file_failures() {
        let err = Error::NoReadableFiles(vec![FileFailure {
            path: "/n/x.md".into(),
            error: "gone".into(),
            kind: crate::domains::files::FileErrorKind::NotFound,
        }]);
        let body = serde_json::to_value(err.into_body()).unwrap();
        assert_eq!(body["kind"], "bad_request");
        assert_eq!(body["fileErrors"][0]["kind"], "not_found");

        let body = serde_json::to_value(Error::bad_request("nope").into_body()).unwrap();
        assert!(body.get("fileErrors").is_none());
    }

    #[test]
    fn test_note_errors() {
        let missing: Error = NoteError::NotFound(7).into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let invalid: Error = NoteError::InvalidInput("Title is required".into()).into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "Title is required");
    }
}
