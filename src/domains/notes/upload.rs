//! Storage of uploaded files before they are imported as notes.

use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Reduce a client-supplied file name to its final component.
///
/// Returns `None` when nothing usable remains (empty, `.`/`..`, or a bare
/// directory path).
pub fn sanitize_file_name(original: &str) -> Option<String> {
    // Browsers on Windows may send a full path with backslashes.
    let last = original.rsplit(['/', '\\']).next().unwrap_or(original).trim();
    let name = Path::new(last).file_name()?.to_string_lossy().into_owned();
    (!name.is_empty()).then_some(name)
}

/// Write an upload into `dir` as `{unix millis}-{name}`, creating `dir` if
/// needed. Returns the stored path.
pub async fn save_upload(dir: &Path, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let target = dir.join(format!("{}-{}", Utc::now().timestamp_millis(), name));
    fs::write(&target, bytes).await?;
    info!("Stored upload at {} ({} bytes)", target.display(), bytes.len());
    Ok(target)
}
