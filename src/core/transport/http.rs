//! HTTP transport implementation.
//!
//! Builds the REST router over [`NotesServer`] and runs it with axum. The
//! same router is used by the binary and by the integration tests.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::NotesServer;
use crate::domains::{files, llm, notes};

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Serve until Ctrl-C.
    pub async fn run(self, server: NotesServer) -> TransportResult<()> {
        let addr = self.address();
        let app = build_router(server);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {}", self.config.description());
        info!("  → Files:  /api/ollama/{{directories,list,read}}");
        info!("  → Models: /api/ollama/{{models,query,generate}}");
        info!("  → Notes:  /api/notes, /api/upload, /api/ai/search");
        info!("  → Health: GET /health");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

/// Build the full application router.
///
/// File-context and model routes live under `/api/ollama`, note routes under
/// `/api`. When a static bundle is configured it is served for every other
/// path, falling back to its `index.html`.
pub fn build_router(server: NotesServer) -> Router {
    let http = server.config().http.clone();

    let mut app = Router::new()
        .nest("/api/ollama", files::routes().merge(llm::routes()))
        .nest("/api", notes::routes())
        .route("/health", get(health_check));

    app = match &http.static_dir {
        Some(dir) => {
            info!("Serving client bundle from {}", dir.display());
            if !dir.join("index.html").is_file() {
                warn!("{} has no index.html", dir.display());
            }
            app.fallback_service(
                ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
            )
        }
        None => app.route("/", get(root_handler)),
    };

    let mut app = app
        .layer(DefaultBodyLimit::max(http.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(server);

    if http.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Root handler - provides API info.
async fn root_handler(State(server): State<NotesServer>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": server.name(),
        "version": server.version(),
        "endpoints": {
            "files": "/api/ollama",
            "notes": "/api/notes",
            "upload": "/api/upload",
            "search": "/api/ai/search",
            "health": "/health"
        }
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, keep serving.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
