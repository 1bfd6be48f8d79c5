//! Prompts domain module.
//!
//! Turns user queries plus context (gated files or stored notes) into the
//! text sent to language models.

pub mod assembler;

pub use assembler::{NOTES_SEARCH_INSTRUCTION, assemble, notes_search_prompt};
