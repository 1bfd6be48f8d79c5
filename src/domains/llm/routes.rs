//! HTTP handlers for the local model server.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::backend::{Generation, ModelInfo};
use super::query::{QueryResponse, answer_with_files};
use crate::core::{Error, NotesServer, Result};

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub files: Vec<String>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    pub model: Option<String>,
    #[serde(default)]
    pub options: Map<String, Value>,
}

/// Routes mounted next to the file-context routes.
pub fn routes() -> Router<NotesServer> {
    Router::new()
        .route("/models", get(list_models))
        .route("/query", post(query_with_files))
        .route("/generate", post(generate))
}

async fn list_models(State(server): State<NotesServer>) -> Result<Json<ModelsResponse>> {
    let models = server.generator().list_models().await?;
    Ok(Json(ModelsResponse { models }))
}

async fn query_with_files(
    State(server): State<NotesServer>,
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>> {
    let Json(request) = payload?;

    let answer = answer_with_files(
        server.gate(),
        &**server.generator(),
        request.query,
        &request.files,
        request.model,
    )
    .await?;
    Ok(Json(answer))
}

async fn generate(
    State(server): State<NotesServer>,
    payload: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<Generation>> {
    let Json(request) = payload?;

    if request.prompt.trim().is_empty() {
        return Err(Error::bad_request("Prompt is required"));
    }

    let generator = server.generator();
    let model = request
        .model
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| generator.default_model().to_string());

    let generation = generator
        .generate(&model, &request.prompt, &request.options)
        .await?;
    Ok(Json(generation))
}
