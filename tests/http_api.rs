//! REST API integration tests.
//!
//! Each test builds a `NotesServer` over a tempdir (allowed directory and
//! upload dir), an in-memory note store and stub model backends, then sends
//! requests through the router with `tower::ServiceExt::oneshot`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Map, Value, json};
use tempfile::TempDir;
use tower::ServiceExt; // for `.oneshot()`

use notes_ai_server::core::{Config, NotesServer, build_router};
use notes_ai_server::domains::llm::{
    ChatMessage, CompletionBackend, CompletionClient, Generation, GenerationBackend, LlmError,
    ModelInfo,
};
use notes_ai_server::domains::notes::NoteStore;

// ---------------------------------------------------------------------------
// Stub backends
// ---------------------------------------------------------------------------

/// Echoes the prompt back as the response.
struct EchoGenerator;

#[async_trait]
impl GenerationBackend for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    fn default_model(&self) -> &str {
        "echo-model"
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &Map<String, Value>,
    ) -> Result<Generation, LlmError> {
        let mut extra = Map::new();
        extra.insert("options".into(), Value::Object(options.clone()));
        Ok(Generation {
            model: model.to_string(),
            response: prompt.to_string(),
            extra,
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        Ok(vec![ModelInfo {
            name: "echo-model".to_string(),
            extra: Map::new(),
        }])
    }
}

/// Records the conversation and answers with a fixed string.
#[derive(Default)]
struct RecordingCompletion {
    seen: Mutex<Vec<ChatMessage>>,
}

#[async_trait]
impl CompletionBackend for RecordingCompletion {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.seen.lock().unwrap().extend_from_slice(messages);
        Ok("Note 1: Rust".to_string())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct TestApp {
    router: axum::Router,
    notes_dir: PathBuf,
    upload_dir: PathBuf,
    completion: Arc<RecordingCompletion>,
    _tmp: TempDir,
}

fn test_config(tmp: &Path) -> Config {
    let notes_dir = tmp.join("notes");
    std::fs::create_dir_all(&notes_dir).unwrap();

    let mut config = Config::default();
    config.files.allowed_directories = vec![notes_dir];
    config.files.allowed_extensions = vec![".md".to_string(), ".txt".to_string()];
    config.files.max_file_size = 1024;
    config.storage.upload_dir = tmp.join("uploads");
    config
}

fn setup() -> TestApp {
    let tmp = TempDir::new().expect("tempdir");
    let config = test_config(tmp.path());
    let notes_dir = config.files.allowed_directories[0].clone();
    let upload_dir = config.storage.upload_dir.clone();

    let completion = Arc::new(RecordingCompletion::default());
    let server = NotesServer::from_parts(
        config,
        NoteStore::open_in_memory().expect("store"),
        Arc::new(EchoGenerator),
        completion.clone(),
    );

    TestApp {
        router: build_router(server),
        notes_dir,
        upload_dir,
        completion,
        _tmp: tmp,
    }
}

fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    match body {
        Some(val) => builder.body(Body::from(val.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get(uri: &str) -> Request<Body> {
    json_request(Method::GET, uri, None)
}

fn with_path(route: &str, path: &Path) -> String {
    let query = serde_urlencoded::to_string([("path", path.to_string_lossy())]).unwrap();
    format!("{}?{}", route, query)
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let resp = app.router.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

fn multipart_request(field: &str, file_name: &str, content: &str) -> Request<Body> {
    let boundary = "X-NOTES-TEST-BOUNDARY";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
Content-Type: text/markdown\r\n\r\n{content}\r\n--{b}--\r\n",
        b = boundary
    );
    Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Service routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_and_root() {
    let app = setup();

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["notes"], "/api/notes");
}

// ---------------------------------------------------------------------------
// File-context routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn directories_lists_allowed_roots() {
    let app = setup();
    let (status, body) = send(&app, get("/api/ollama/directories")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["directories"],
        json!([app.notes_dir.to_string_lossy()])
    );
}

#[tokio::test]
async fn list_directory_returns_entries() {
    let app = setup();
    std::fs::write(app.notes_dir.join("a.md"), "alpha").unwrap();
    std::fs::create_dir(app.notes_dir.join("sub")).unwrap();

    let (status, body) = send(&app, get(&with_path("/api/ollama/list", &app.notes_dir))).await;
    assert_eq!(status, StatusCode::OK);

    let mut items = body["items"].as_array().unwrap().clone();
    items.sort_by_key(|item| item["name"].as_str().unwrap().to_string());
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "a.md");
    assert_eq!(items[0]["isDirectory"], false);
    assert_eq!(items[0]["size"], 5);
    assert_eq!(items[0]["extension"], ".md");
    assert_eq!(items[1]["name"], "sub");
    assert_eq!(items[1]["isDirectory"], true);
    assert!(items[1]["size"].is_null());
}

#[tokio::test]
async fn list_requires_path() {
    let app = setup();
    let (status, body) = send(&app, get("/api/ollama/list")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Directory path is required");
    assert_eq!(body["kind"], "bad_request");
}

#[tokio::test]
async fn list_outside_allowed_directories_is_forbidden() {
    let app = setup();
    let outside = app.notes_dir.parent().unwrap().join("other");

    let (status, body) = send(&app, get(&with_path("/api/ollama/list", &outside))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "access_denied");
}

#[tokio::test]
async fn read_file_success() {
    let app = setup();
    let file = app.notes_dir.join("a.md");
    std::fs::write(&file, "# Title\nbody").unwrap();

    let (status, body) = send(&app, get(&with_path("/api/ollama/read", &file))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "# Title\nbody");
    assert_eq!(body["extension"], ".md");
    assert_eq!(body["path"], file.to_str().unwrap());
}

#[tokio::test]
async fn read_file_policy_violations() {
    let app = setup();

    let traversal = app.notes_dir.join("../secret.md");
    let (status, body) = send(&app, get(&with_path("/api/ollama/read", &traversal))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "access_denied");

    let binary = app.notes_dir.join("image.png");
    std::fs::write(&binary, [0u8; 4]).unwrap();
    let (status, body) = send(&app, get(&with_path("/api/ollama/read", &binary))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "unsupported_type");

    let big = app.notes_dir.join("big.md");
    std::fs::write(&big, "x".repeat(1025)).unwrap();
    let (status, body) = send(&app, get(&with_path("/api/ollama/read", &big))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "too_large");
}

#[tokio::test]
async fn read_missing_file_is_not_found() {
    let app = setup();
    let missing = app.notes_dir.join("nope.md");

    let (status, body) = send(&app, get(&with_path("/api/ollama/read", &missing))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn list_missing_directory_is_not_found() {
    let app = setup();
    let missing = app.notes_dir.join("gone");

    let (status, body) = send(&app, get(&with_path("/api/ollama/list", &missing))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn read_echoes_requested_path() {
    let app = setup();
    std::fs::write(app.notes_dir.join("a.md"), "dotted").unwrap();
    let requested = format!("{}/./a.md", app.notes_dir.display());

    let (status, body) = send(
        &app,
        get(&with_path("/api/ollama/read", Path::new(&requested))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "dotted");
    assert_eq!(body["path"], requested.as_str());
}

#[tokio::test]
async fn query_labels_files_with_requested_path() {
    let app = setup();
    std::fs::write(app.notes_dir.join("a.md"), "alpha").unwrap();
    let requested = format!("{}/sub/../a.md", app.notes_dir.display());

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/ollama/query",
            Some(json!({"query": "q", "files": [requested]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let response = body["response"].as_str().unwrap();
    assert!(response.contains(&format!("FILE 1: {}", requested)));
}

// ---------------------------------------------------------------------------
// Model routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn models_are_listed() {
    let app = setup();
    let (status, body) = send(&app, get("/api/ollama/models")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"][0]["name"], "echo-model");
}

#[tokio::test]
async fn query_with_partial_failures() {
    let app = setup();
    let good = app.notes_dir.join("a.md");
    std::fs::write(&good, "alpha content").unwrap();
    let bad = app.notes_dir.join("a.txt.bak");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/ollama/query",
            Some(json!({
                "query": "What is in a?",
                "files": [good.to_string_lossy(), bad.to_string_lossy()],
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "What is in a?");
    assert_eq!(body["model"], "echo-model");

    let response = body["response"].as_str().unwrap();
    assert!(response.contains(&format!("FILE 1: {}", good.display())));
    assert!(response.contains("alpha content"));
    assert!(response.contains("USER QUERY: What is in a?"));
    assert!(!response.contains("FILE 2"));

    let errors = body["fileErrors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["path"], bad.to_str().unwrap());
    assert_eq!(errors[0]["kind"], "unsupported_type");
}

#[tokio::test]
async fn query_without_failures_omits_file_errors() {
    let app = setup();
    let good = app.notes_dir.join("a.md");
    std::fs::write(&good, "alpha").unwrap();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/ollama/query",
            Some(json!({"query": "q", "files": [good.to_string_lossy()], "model": "custom"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "custom");
    assert!(body.get("fileErrors").is_none());
}

#[tokio::test]
async fn query_with_no_readable_files() {
    let app = setup();
    let outside = app.notes_dir.parent().unwrap().join("other/a.md");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/ollama/query",
            Some(json!({"query": "q", "files": [outside.to_string_lossy()]})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "None of the provided files could be read");
    assert_eq!(body["fileErrors"][0]["kind"], "access_denied");
}

#[tokio::test]
async fn query_validation() {
    let app = setup();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/ollama/query",
            Some(json!({"files": ["/x.md"]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query is required");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/ollama/query",
            Some(json!({"query": "q", "files": []})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "At least one file path is required");
}

#[tokio::test]
async fn generate_passes_prompt_and_options() {
    let app = setup();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/ollama/generate",
            Some(json!({"prompt": "hello", "options": {"temperature": 0.1}})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "hello");
    assert_eq!(body["model"], "echo-model");
    assert_eq!(body["options"]["temperature"], 0.1);

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/ollama/generate", Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Prompt is required");
}

// ---------------------------------------------------------------------------
// Notes routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notes_crud() {
    let app = setup();

    let (status, created) = send(
        &app,
        json_request(
            Method::POST,
            "/api/notes",
            Some(json!({"title": "Rust", "content": "ownership", "tags": "lang"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["title"], "Rust");
    assert!(created["created_at"].is_string());

    let (status, listed) = send(&app, get("/api/notes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, updated) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/notes/{}", id),
            Some(json!({"title": "Rust 2024", "content": "editions"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Rust 2024");
    assert!(updated["tags"].is_null());

    let (status, fetched) = send(&app, get(&format!("/api/notes/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["content"], "editions");

    let (status, deleted) = send(
        &app,
        json_request(Method::DELETE, &format!("/api/notes/{}", id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Note deleted successfully");

    let (status, body) = send(&app, get(&format!("/api/notes/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Note not found");
}

#[tokio::test]
async fn notes_validation_and_missing() {
    let app = setup();

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/notes", Some(json!({"content": "x"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");

    let (status, body) = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/api/notes")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "bad_request");

    let (status, _) = send(
        &app,
        json_request(Method::PUT, "/api/notes/99", Some(json!({"title": "x"}))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, json_request(Method::DELETE, "/api/notes/99", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get("/api/notes/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "bad_request");
}

#[tokio::test]
async fn upload_creates_imported_note() {
    let app = setup();

    let (status, body) = send(
        &app,
        multipart_request("file", "meeting.md", "# Agenda\n- budget"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "meeting");
    assert_eq!(body["message"], "File uploaded and note created successfully");

    let id = body["id"].as_i64().unwrap();
    let (_, note) = send(&app, get(&format!("/api/notes/{}", id))).await;
    assert_eq!(note["content"], "# Agenda\n- budget");
    assert_eq!(note["tags"], "imported");

    let stored: Vec<_> = std::fs::read_dir(&app.upload_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].ends_with("-meeting.md"));
}

#[tokio::test]
async fn upload_without_file_field() {
    let app = setup();

    let (status, body) = send(&app, multipart_request("other", "a.md", "x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/upload", Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn ai_search_sends_notes_to_completion() {
    let app = setup();
    send(
        &app,
        json_request(
            Method::POST,
            "/api/notes",
            Some(json!({"title": "Rust", "content": "borrow checker"})),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/ai/search",
            Some(json!({"query": "memory safety"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], "Note 1: Rust");
    assert_eq!(body["notes"][0]["title"], "Rust");

    let seen = app.completion.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].role, "system");
    assert!(seen[1].content.contains("Title: Rust\nContent: borrow checker\nTags: None"));
    assert!(seen[1].content.ends_with("Search query: memory safety"));
}

#[tokio::test]
async fn ai_search_requires_query() {
    let app = setup();
    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/ai/search", Some(json!({"query": ""}))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query is required");
}

#[tokio::test]
async fn ai_search_without_api_key_is_unavailable() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let completion = CompletionClient::from_config(&config.completion);
    let server = NotesServer::from_parts(
        config,
        NoteStore::open_in_memory().unwrap(),
        Arc::new(EchoGenerator),
        Arc::new(completion),
    );

    let resp = build_router(server)
        .oneshot(json_request(
            Method::POST,
            "/api/ai/search",
            Some(json!({"query": "anything"})),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(resp).await["kind"], "not_configured");
}
