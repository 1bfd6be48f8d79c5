//! Server state shared by every request handler.
//!
//! `NotesServer` owns the configuration and the domain services (file gate,
//! note store, model clients). It is cheap to clone; handlers receive it as
//! axum state.

use std::sync::Arc;
use tracing::info;

use super::config::Config;
use super::error::Result;
use crate::domains::files::FileGate;
use crate::domains::llm::{CompletionBackend, CompletionClient, GenerationBackend, OllamaClient};
use crate::domains::notes::NoteStore;

/// Application state behind the HTTP routes.
#[derive(Clone)]
pub struct NotesServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Policy-enforcing filesystem access.
    gate: FileGate,

    /// Persistent notes.
    store: NoteStore,

    /// Local model server used for file-context queries.
    generator: Arc<dyn GenerationBackend>,

    /// Hosted chat model used for note search.
    completion: Arc<dyn CompletionBackend>,
}

impl NotesServer {
    /// Build the server from configuration, opening the note database and
    /// constructing the model clients.
    pub fn new(config: Config) -> Result<Self> {
        let store = NoteStore::open(&config.storage.database_path)?;
        let generator = Arc::new(OllamaClient::from_config(&config.ollama));

        let completion = CompletionClient::from_config(&config.completion);
        if !completion.is_configured() {
            info!("No completion API key set; AI note search is disabled");
        }

        Ok(Self::from_parts(config, store, generator, Arc::new(completion)))
    }

    /// Assemble a server from already-built parts.
    pub fn from_parts(
        config: Config,
        store: NoteStore,
        generator: Arc<dyn GenerationBackend>,
        completion: Arc<dyn CompletionBackend>,
    ) -> Self {
        let gate = FileGate::new(config.files.clone());
        info!(
            "File access limited to {} director{}",
            gate.allowed_directories().len(),
            if gate.allowed_directories().len() == 1 { "y" } else { "ies" }
        );

        Self {
            config: Arc::new(config),
            gate,
            store,
            generator,
            completion,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn gate(&self) -> &FileGate {
        &self.gate
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn generator(&self) -> &Arc<dyn GenerationBackend> {
        &self.generator
    }

    pub fn completion(&self) -> &Arc<dyn CompletionBackend> {
        &self.completion
    }
}

impl std::fmt::Debug for NotesServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotesServer")
            .field("name", &self.name())
            .field("gate", &self.gate)
            .field("generator", &self.generator.name())
            .field("completion", &self.completion.name())
            .finish()
    }
}
