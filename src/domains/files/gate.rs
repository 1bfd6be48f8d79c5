//! File access gate.
//!
//! Composes the path, extension and size policies from
//! [`crate::core::security`] into the two operations clients may perform on
//! the local filesystem: listing a directory and reading a file. Every call
//! re-validates the policies; nothing is cached between requests.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use super::error::{FileAccessError, FileErrorKind};
use crate::core::config::FileAccessConfig;
use crate::core::security::{
    check_path, extension_of, is_allowed, is_allowed_extension, is_within_limit,
};

// ============================================================================
// Results
// ============================================================================

/// One child of a listed directory.
///
/// `size` and `extension` are `None` for directories. When the child could
/// not be stat'ed, `error` explains why and `size`/`modified` are `None`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Contents of a file that passed every policy.
#[derive(Debug, Clone, Serialize)]
pub struct FileReadResult {
    pub path: PathBuf,
    pub content: String,
    pub extension: String,
}

/// A file that could not be read as part of a multi-file request.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
    pub kind: FileErrorKind,
}

/// Joined outcome of [`FileGate::read_many`], both halves in input order.
#[derive(Debug, Default)]
pub struct ReadManyOutcome {
    pub files: Vec<FileReadResult>,
    pub failures: Vec<FileFailure>,
}

// ============================================================================
// Gate
// ============================================================================

/// Policy-enforcing access to the local filesystem.
#[derive(Debug, Clone)]
pub struct FileGate {
    config: Arc<FileAccessConfig>,
}

impl FileGate {
    /// Create a gate enforcing the given policy.
    pub fn new(config: FileAccessConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The policy this gate enforces.
    pub fn config(&self) -> &FileAccessConfig {
        &self.config
    }

    /// Directories clients may access.
    pub fn allowed_directories(&self) -> &[PathBuf] {
        &self.config.allowed_directories
    }

    /// Apply the path policy alone, returning the normalized path.
    ///
    /// Performs no I/O.
    pub fn authorize(&self, path: &Path) -> Result<PathBuf, FileAccessError> {
        let check = check_path(path, &self.config.allowed_directories);
        if check.allowed {
            Ok(check.normalized)
        } else {
            warn!("Access denied for path: {}", check.normalized.display());
            Err(FileAccessError::AccessDenied {
                path: check.normalized,
            })
        }
    }

    /// List the direct children of an allowed directory.
    ///
    /// Children are stat'ed concurrently. A child that cannot be stat'ed is
    /// still listed, carrying an `error` instead of its size and timestamp.
    /// Entries come back in enumeration order, which is unspecified.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn list_directory(
        &self,
        path: &Path,
    ) -> Result<Vec<DirectoryEntry>, FileAccessError> {
        let dir = self.authorize(path)?;
        self.enforce_symlink_policy(&dir).await?;

        let mut reader = fs::read_dir(&dir)
            .await
            .map_err(|e| FileAccessError::from_io(&dir, e))?;

        let mut children = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| FileAccessError::from_io(&dir, e))?
        {
            children.push(entry);
        }

        let entries = join_all(children.into_iter().map(describe_entry)).await;

        info!("Listed {} entries in {}", entries.len(), dir.display());
        Ok(entries)
    }

    /// Read an allowed file as text.
    ///
    /// Checks run in order: path, extension, then size via a stat that
    /// precedes the read. The file can change between the stat and the read;
    /// callers must not assume the two are atomic. Invalid UTF-8 sequences
    /// are replaced rather than rejected. The result carries `path` exactly
    /// as given, not its normalized form.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn read_file(&self, path: &Path) -> Result<FileReadResult, FileAccessError> {
        let file = self.authorize(path)?;

        let extension = extension_of(&file).unwrap_or_default();
        if !is_allowed_extension(&file, &self.config.allowed_extensions) {
            warn!("Unsupported file type {:?} for {}", extension, file.display());
            return Err(FileAccessError::UnsupportedType {
                path: file,
                extension,
            });
        }

        self.enforce_symlink_policy(&file).await?;

        let metadata = fs::metadata(&file)
            .await
            .map_err(|e| FileAccessError::from_io(&file, e))?;

        if !metadata.is_file() {
            return Err(FileAccessError::Io {
                path: file,
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        let max = self.config.max_file_size;
        if !is_within_limit(metadata.len(), max) {
            warn!(
                "File {} is {} bytes, over the {} byte limit",
                file.display(),
                metadata.len(),
                max
            );
            return Err(FileAccessError::TooLarge {
                path: file,
                size: metadata.len(),
                max,
            });
        }

        let bytes = fs::read(&file)
            .await
            .map_err(|e| FileAccessError::from_io(&file, e))?;
        let content = String::from_utf8_lossy(&bytes).into_owned();

        debug!("Read {} bytes from {}", bytes.len(), file.display());

        Ok(FileReadResult {
            path: path.to_path_buf(),
            content,
            extension,
        })
    }

    /// Read several files concurrently.
    ///
    /// One failure never aborts the others; successes and failures are
    /// returned separately, each preserving the order of `paths`.
    pub async fn read_many(&self, paths: &[String]) -> ReadManyOutcome {
        let results = join_all(paths.iter().map(|path| async move {
            (path, self.read_file(Path::new(path)).await)
        }))
        .await;

        let mut outcome = ReadManyOutcome::default();
        for (path, result) in results {
            match result {
                Ok(file) => outcome.files.push(file),
                Err(e) => {
                    warn!("Skipping {}: {}", path, e);
                    outcome.failures.push(FileFailure {
                        path: path.clone(),
                        error: e.to_string(),
                        kind: e.kind(),
                    });
                }
            }
        }

        outcome
    }

    /// When symlinks are not allowed to escape, resolve `path` and re-check
    /// the real target against the resolved allow-list.
    async fn enforce_symlink_policy(&self, path: &Path) -> Result<(), FileAccessError> {
        if self.config.allow_symlinks {
            return Ok(());
        }

        let resolved = fs::canonicalize(path)
            .await
            .map_err(|e| FileAccessError::from_io(path, e))?;

        let mut roots = Vec::with_capacity(self.config.allowed_directories.len());
        for dir in &self.config.allowed_directories {
            if let Ok(root) = fs::canonicalize(dir).await {
                roots.push(root);
            }
        }

        if is_allowed(&resolved, &roots) {
            Ok(())
        } else {
            warn!(
                "Symlink {} resolves outside allowed directories: {}",
                path.display(),
                resolved.display()
            );
            Err(FileAccessError::AccessDenied {
                path: path.to_path_buf(),
            })
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn describe_entry(entry: fs::DirEntry) -> DirectoryEntry {
    let name = entry.file_name().to_string_lossy().into_owned();
    let path = entry.path();
    let file_type = entry.file_type().await.ok();

    match fs::metadata(&path).await {
        Ok(metadata) => {
            let is_directory = match file_type {
                Some(t) if !t.is_symlink() => t.is_dir(),
                _ => metadata.is_dir(),
            };

            DirectoryEntry {
                size: (!is_directory).then(|| metadata.len()),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                extension: (!is_directory)
                    .then(|| extension_of(Path::new(&name)).unwrap_or_default()),
                name,
                path,
                is_directory,
                error: None,
            }
        }
        Err(e) => {
            debug!("Unable to stat {}: {}", path.display(), e);
            DirectoryEntry {
                name,
                path,
                is_directory: file_type.is_some_and(|t| t.is_dir()),
                size: None,
                modified: None,
                extension: None,
                error: Some("Unable to read file stats".to_string()),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
