//! Backend traits for text generation.
//!
//! Two seams: [`GenerationBackend`] for the local prompt-in/text-out model
//! server, [`CompletionBackend`] for chat-style hosted models. Handlers only
//! see these traits, so tests swap in stubs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::LlmError;
use crate::domains::files::FileReadResult;
use crate::domains::prompts;

// ============================================================================
// Types
// ============================================================================

/// Result of a single non-streaming generation.
///
/// `extra` keeps whatever other fields the backend reported (timings, token
/// counts) so callers can forward them untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Generation {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub response: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A model the local server can run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Prompt-in, text-out model server.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Model used when a request names none.
    fn default_model(&self) -> &str;

    /// Run one generation. `options` are merged into the request body.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &Map<String, Value>,
    ) -> Result<Generation, LlmError>;

    /// Models available on the server.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError>;
}

/// Chat-completion model.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Send the conversation and return the first reply's text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// Assemble a file-context prompt for `query` and run it on `backend`.
pub async fn generate_with_file_context(
    backend: &dyn GenerationBackend,
    model: &str,
    query: &str,
    files: &[FileReadResult],
) -> Result<Generation, LlmError> {
    let prompt = prompts::assemble(query, files);
    backend.generate(model, &prompt, &Map::new()).await
}
