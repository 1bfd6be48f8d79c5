//! Files domain module.
//!
//! Gated access to the local filesystem for the model file-context feature.
//!
//! - `gate.rs` - Directory listing and file reads behind the access policies
//! - `routes.rs` - HTTP handlers for `/directories`, `/list` and `/read`
//! - `error.rs` - Classified file access errors

mod error;
pub mod gate;
pub mod routes;

pub use error::{FileAccessError, FileErrorKind};
pub use gate::{DirectoryEntry, FileFailure, FileGate, FileReadResult, ReadManyOutcome};
pub use routes::routes;
