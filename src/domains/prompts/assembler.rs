//! Prompt assembly.
//!
//! Builds the single-text prompts sent to language models. Assembly is
//! deterministic and performs no truncation; callers are expected to have
//! applied the size policy to file contents beforehand.

use std::fmt::Write;

use crate::domains::files::FileReadResult;
use crate::domains::notes::Note;

const FILES_PREAMBLE: &str = "You are an AI assistant that has access to the following files:\n\n";

const FILES_INSTRUCTION: &str = "Based on the content of these files, please respond to the query. \
Reference specific parts of the files when relevant.";

/// System instruction for searching notes with a chat-completion model.
pub const NOTES_SEARCH_INSTRUCTION: &str = "You are a helpful assistant that searches through \
notes and provides relevant information. Return only the most relevant notes that match the \
query, with their IDs and titles.";

/// Build a prompt answering `query` over the given files.
///
/// Layout: preamble, one fenced block per file in input order, the query,
/// then the closing instruction.
pub fn assemble(query: &str, files: &[FileReadResult]) -> String {
    let mut prompt = String::from(FILES_PREAMBLE);

    for (index, file) in files.iter().enumerate() {
        let _ = writeln!(prompt, "FILE {}: {}", index + 1, file.path.display());
        prompt.push_str("```\n");
        prompt.push_str(&file.content);
        prompt.push_str("\n```\n\n");
    }

    let _ = write!(prompt, "USER QUERY: {}\n\n", query);
    prompt.push_str(FILES_INSTRUCTION);
    prompt
}

/// Build the user message for an AI search over all notes.
pub fn notes_search_prompt(notes: &[Note], query: &str) -> String {
    let context = notes
        .iter()
        .map(|note| {
            format!(
                "Note ID: {}\nTitle: {}\nContent: {}\nTags: {}\n---\n",
                note.id,
                note.title,
                note.content.as_deref().unwrap_or_default(),
                note.tags
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .unwrap_or("None"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("Here are my notes:\n\n{}\n\nSearch query: {}", context, query)
}
