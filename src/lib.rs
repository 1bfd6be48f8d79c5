//! Notes AI Server Library
//!
//! Backend for a notes application with language-model assistance. It
//! stores notes in SQLite, imports uploaded text files, and lets a local
//! model answer questions over files from a restricted set of directories.
//!
//! # Architecture
//!
//! - **cli**: Command-line access to the file gate and the local model
//! - **core**: Configuration, error handling, access policies, server state and the HTTP transport
//! - **domains**: Business logic organized by bounded contexts
//!   - **files**: Gated directory listing and file reads
//!   - **llm**: Clients for the local model server and the hosted completion service
//!   - **notes**: Note persistence, uploads and AI search
//!   - **prompts**: Prompt assembly
//!
//! # Example
//!
//! ```rust,no_run
//! use notes_ai_server::core::{Config, HttpTransport, NotesServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let transport = HttpTransport::new(config.http.clone());
//!     let server = NotesServer::new(config)?;
//!     transport.run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, NotesServer, Result};
