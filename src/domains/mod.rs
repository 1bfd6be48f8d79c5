//! Domains module containing business logic organized by bounded contexts.
//!
//! Each domain owns its types, its errors and the HTTP routes that expose it.

pub mod files;
pub mod llm;
pub mod notes;
pub mod prompts;
