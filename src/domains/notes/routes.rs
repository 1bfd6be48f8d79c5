//! HTTP handlers for notes, uploads and AI note search.

use axum::{
    Json, Router,
    extract::{
        Multipart, Path, State,
        rejection::{JsonRejection, PathRejection},
        multipart::MultipartRejection,
    },
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::NoteError;
use super::store::{Note, NoteInput, NoteStore};
use super::upload::{sanitize_file_name, save_upload};
use crate::core::{Error, NotesServer, Result};
use crate::domains::llm::ChatMessage;
use crate::domains::prompts::{NOTES_SEARCH_INSTRUCTION, notes_search_prompt};

type JsonPayload<T> = std::result::Result<Json<T>, JsonRejection>;
type IdParam = std::result::Result<Path<i64>, PathRejection>;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: i64,
    pub title: String,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: String,
    pub notes: Vec<Note>,
}

pub fn routes() -> Router<NotesServer> {
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route(
            "/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/upload", post(upload))
        .route("/ai/search", post(ai_search))
}

/// Run a blocking store operation off the async runtime.
async fn with_store<F, T>(server: &NotesServer, f: F) -> Result<T>
where
    F: FnOnce(&NoteStore) -> std::result::Result<T, NoteError> + Send + 'static,
    T: Send + 'static,
{
    let store = server.store().clone();
    Ok(tokio::task::spawn_blocking(move || f(&store)).await??)
}

async fn list_notes(State(server): State<NotesServer>) -> Result<Json<Vec<Note>>> {
    Ok(Json(with_store(&server, |store| store.list()).await?))
}

async fn get_note(State(server): State<NotesServer>, id: IdParam) -> Result<Json<Note>> {
    let Path(id) = id?;
    Ok(Json(with_store(&server, move |store| store.get(id)).await?))
}

async fn create_note(
    State(server): State<NotesServer>,
    payload: JsonPayload<NoteInput>,
) -> Result<(StatusCode, Json<Note>)> {
    let Json(input) = payload?;
    let note = with_store(&server, move |store| store.create(&input)).await?;
    info!("Created note {} ({})", note.id, note.title);
    Ok((StatusCode::CREATED, Json(note)))
}

async fn update_note(
    State(server): State<NotesServer>,
    id: IdParam,
    payload: JsonPayload<NoteInput>,
) -> Result<Json<Note>> {
    let Path(id) = id?;
    let Json(input) = payload?;
    Ok(Json(
        with_store(&server, move |store| store.update(id, &input)).await?,
    ))
}

async fn delete_note(
    State(server): State<NotesServer>,
    id: IdParam,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    with_store(&server, move |store| store.delete(id)).await?;
    info!("Deleted note {}", id);
    Ok(Json(MessageResponse {
        message: "Note deleted successfully",
    }))
}

/// Store the multipart field `file` and import it as a note.
async fn upload(
    State(server): State<NotesServer>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let mut multipart = multipart.map_err(|_| Error::bad_request("No file uploaded"))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let name = field
            .file_name()
            .and_then(sanitize_file_name)
            .ok_or_else(|| Error::bad_request("Uploaded file has no usable name"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::bad_request(e.body_text()))?;

        save_upload(&server.config().storage.upload_dir, &name, &bytes).await?;

        let note = with_store(&server, move |store| store.import_upload(&name, &bytes)).await?;
        info!("Imported upload as note {} ({})", note.id, note.title);

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                id: note.id,
                title: note.title,
                message: "File uploaded and note created successfully",
            }),
        ));
    }

    Err(Error::bad_request("No file uploaded"))
}

/// Ask the completion service which notes match a free-text query.
async fn ai_search(
    State(server): State<NotesServer>,
    payload: JsonPayload<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let Json(request) = payload?;
    if request.query.trim().is_empty() {
        return Err(Error::bad_request("Query is required"));
    }

    let notes = with_store(&server, |store| store.list()).await?;
    info!("AI search over {} note(s)", notes.len());

    let messages = [
        ChatMessage::system(NOTES_SEARCH_INSTRUCTION),
        ChatMessage::user(notes_search_prompt(&notes, &request.query)),
    ];
    let results = server.completion().complete(&messages).await?;

    Ok(Json(SearchResponse { results, notes }))
}
