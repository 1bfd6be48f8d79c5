//! Question answering over gated files.
//!
//! Shared by the `/query` route and the command-line `query`/`ask` commands.

use serde::Serialize;
use tracing::info;

use super::backend::{GenerationBackend, generate_with_file_context};
use crate::core::{Error, Result};
use crate::domains::files::{FileFailure, FileGate};

/// Answer to a question asked about a set of files.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub query: String,
    pub response: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_errors: Option<Vec<FileFailure>>,
}

/// Read `files` through the gate and ask `generator` about them.
///
/// Unreadable files are skipped and reported in `file_errors`; the call
/// only fails outright when none of them could be read. An empty or absent
/// `model` falls back to the backend's default.
pub async fn answer_with_files(
    gate: &FileGate,
    generator: &dyn GenerationBackend,
    query: String,
    files: &[String],
    model: Option<String>,
) -> Result<QueryResponse> {
    if query.trim().is_empty() {
        return Err(Error::bad_request("Query is required"));
    }
    if files.is_empty() {
        return Err(Error::bad_request("At least one file path is required"));
    }

    let outcome = gate.read_many(files).await;
    if outcome.files.is_empty() {
        return Err(Error::NoReadableFiles(outcome.failures));
    }

    let model = model
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| generator.default_model().to_string());

    info!(
        "Querying {} with {} file(s) ({} skipped)",
        model,
        outcome.files.len(),
        outcome.failures.len()
    );

    let generation = generate_with_file_context(generator, &model, &query, &outcome.files).await?;

    Ok(QueryResponse {
        query,
        response: generation.response,
        model: if generation.model.is_empty() {
            model
        } else {
            generation.model
        },
        file_errors: (!outcome.failures.is_empty()).then_some(outcome.failures),
    })
}
