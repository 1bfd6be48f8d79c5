//! HTTP handlers for browsing and reading gated files.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use super::gate::{DirectoryEntry, FileReadResult};
use crate::core::{Error, NotesServer, Result};

/// Query string carrying the target path.
#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DirectoriesResponse {
    pub directories: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub path: String,
    pub items: Vec<DirectoryEntry>,
}

/// Routes mounted under the file-context prefix.
pub fn routes() -> Router<NotesServer> {
    Router::new()
        .route("/directories", get(allowed_directories))
        .route("/list", get(list_directory))
        .route("/read", get(read_file))
}

async fn allowed_directories(State(server): State<NotesServer>) -> Json<DirectoriesResponse> {
    Json(DirectoriesResponse {
        directories: server.gate().allowed_directories().to_vec(),
    })
}

async fn list_directory(
    State(server): State<NotesServer>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ListResponse>> {
    let path = require_path(query, "Directory path is required")?;
    info!("Listing directory: {}", path);

    let items = server.gate().list_directory(Path::new(&path)).await?;
    Ok(Json(ListResponse { path, items }))
}

async fn read_file(
    State(server): State<NotesServer>,
    Query(query): Query<PathQuery>,
) -> Result<Json<FileReadResult>> {
    let path = require_path(query, "File path is required")?;
    info!("Reading file: {}", path);

    let file = server.gate().read_file(Path::new(&path)).await?;
    Ok(Json(file))
}

fn require_path(query: PathQuery, message: &str) -> Result<String> {
    query
        .path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| Error::bad_request(message))
}
