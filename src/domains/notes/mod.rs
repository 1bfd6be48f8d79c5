//! Notes domain module.
//!
//! - `store.rs` - SQLite persistence for notes
//! - `upload.rs` - Saving uploaded files before import
//! - `routes.rs` - CRUD, upload and AI search handlers

mod error;
pub mod routes;
pub mod store;
pub mod upload;

pub use error::NoteError;
pub use routes::routes;
pub use store::{IMPORTED_TAG, Note, NoteInput, NoteStore};
