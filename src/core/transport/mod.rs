//! Transport layer for the notes server.
//!
//! The server speaks JSON over HTTP. This module owns the listener
//! configuration, the axum router assembly and the process lifecycle of the
//! listener. Request handling lives in each domain's `routes` module.

mod config;
mod error;
pub mod http;

pub use config::HttpConfig;
pub use error::{TransportError, TransportResult};
pub use http::{HttpTransport, build_router};
