//! File access error types.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Machine-readable classification of a [`FileAccessError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileErrorKind {
    AccessDenied,
    UnsupportedType,
    TooLarge,
    NotFound,
    IoError,
}

impl FileErrorKind {
    /// Wire name of the kind, as used in error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessDenied => "access_denied",
            Self::UnsupportedType => "unsupported_type",
            Self::TooLarge => "too_large",
            Self::NotFound => "not_found",
            Self::IoError => "io_error",
        }
    }

    /// Policy rejections are the caller's fault; the rest are not.
    pub fn is_policy_violation(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied | Self::UnsupportedType | Self::TooLarge
        )
    }
}

/// Errors returned by the file access gate.
#[derive(Debug, Error)]
pub enum FileAccessError {
    /// The path is outside every allowed directory.
    #[error("Access to '{}' is not allowed", .path.display())]
    AccessDenied { path: PathBuf },

    /// The file's extension is not in the allow-list.
    #[error("File type '{extension}' is not allowed")]
    UnsupportedType { path: PathBuf, extension: String },

    /// The file is larger than the configured ceiling.
    #[error("File size {size} bytes exceeds the maximum allowed size ({max} bytes)")]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    /// The path does not exist.
    #[error("Path does not exist: '{}'", .path.display())]
    NotFound { path: PathBuf },

    /// Any other filesystem failure.
    #[error("I/O error for path '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileAccessError {
    /// Classify an I/O failure on `path`, splitting out missing paths.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// The classification of this error.
    pub fn kind(&self) -> FileErrorKind {
        match self {
            Self::AccessDenied { .. } => FileErrorKind::AccessDenied,
            Self::UnsupportedType { .. } => FileErrorKind::UnsupportedType,
            Self::TooLarge { .. } => FileErrorKind::TooLarge,
            Self::NotFound { .. } => FileErrorKind::NotFound,
            Self::Io { .. } => FileErrorKind::IoError,
        }
    }
}
