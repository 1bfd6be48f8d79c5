//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the notes
//! server: configuration, error handling, the access policies, shared server
//! state and the HTTP transport.

pub mod config;
pub mod error;
pub mod security;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use server::NotesServer;
pub use transport::{HttpConfig, HttpTransport, build_router};
