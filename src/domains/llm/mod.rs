//! LLM domain module.
//!
//! Clients for the language models the server talks to:
//!
//! - `ollama.rs` - Local model server used for file-context queries
//! - `completion.rs` - Hosted chat-completion service used for note search
//! - `backend.rs` - Traits both clients implement
//! - `query.rs` - Question answering over gated files
//! - `routes.rs` - HTTP handlers for `/models`, `/query` and `/generate`

pub mod backend;
pub mod completion;
mod error;
pub mod ollama;
pub mod query;
pub mod routes;

pub use backend::{
    ChatMessage, CompletionBackend, Generation, GenerationBackend, ModelInfo,
    generate_with_file_context,
};
pub use completion::CompletionClient;
pub use error::LlmError;
pub use ollama::OllamaClient;
pub use query::{QueryResponse, answer_with_files};
pub use routes::routes;
