//! SQLite-backed note store.

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::error::NoteError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT,
    tags TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
";

const SELECT_COLUMNS: &str = "SELECT id, title, content, tags, created_at, updated_at FROM notes";

/// Tag applied to notes created from uploaded files.
pub const IMPORTED_TAG: &str = "imported";

/// A stored note. Timestamps are SQLite `CURRENT_TIMESTAMP` strings (UTC).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub tags: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields a client may set on create or update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub title: String,
    pub content: Option<String>,
    pub tags: Option<String>,
}

impl NoteInput {
    pub fn validate(&self) -> Result<(), NoteError> {
        if self.title.trim().is_empty() {
            return Err(NoteError::invalid("Title is required"));
        }
        Ok(())
    }
}

/// Note persistence over a single mutex-guarded connection.
///
/// All methods block; async callers go through `spawn_blocking`.
#[derive(Clone)]
pub struct NoteStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for NoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteStore").finish_non_exhaustive()
    }
}

impl NoteStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, NoteError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                NoteError::storage(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA busy_timeout=5000;")?;
        info!("Opened note database at {}", path.display());
        Self::with_schema(conn)
    }

    pub fn open_in_memory() -> Result<Self, NoteError> {
        Self::with_schema(Connection::open_in_memory()?)
    }

    fn with_schema(conn: Connection) -> Result<Self, NoteError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` with the locked connection. The guard never outlives the call.
    fn with_conn<F, T>(&self, f: F) -> Result<T, NoteError>
    where
        F: FnOnce(&Connection) -> Result<T, NoteError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| NoteError::storage(e.to_string()))?;
        f(&conn)
    }

    fn row_to_note(row: &Row<'_>) -> rusqlite::Result<Note> {
        Ok(Note {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            tags: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    /// All notes, most recently updated first.
    pub fn list(&self) -> Result<Vec<Note>, NoteError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("{} ORDER BY updated_at DESC, id DESC", SELECT_COLUMNS))?;
            let notes = stmt
                .query_map([], Self::row_to_note)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(notes)
        })
    }

    pub fn get(&self, id: i64) -> Result<Note, NoteError> {
        self.with_conn(|conn| Self::fetch(conn, id))
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Note, NoteError> {
        conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            Self::row_to_note,
        )
        .optional()?
        .ok_or(NoteError::NotFound(id))
    }

    pub fn create(&self, input: &NoteInput) -> Result<Note, NoteError> {
        input.validate()?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notes (title, content, tags) VALUES (?1, ?2, ?3)",
                params![input.title, input.content, input.tags],
            )?;
            let id = conn.last_insert_rowid();
            debug!("Created note {}", id);
            Self::fetch(conn, id)
        })
    }

    /// Replace a note's fields and bump `updated_at`.
    pub fn update(&self, id: i64, input: &NoteInput) -> Result<Note, NoteError> {
        input.validate()?;
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notes SET title = ?1, content = ?2, tags = ?3, \
                 updated_at = CURRENT_TIMESTAMP WHERE id = ?4",
                params![input.title, input.content, input.tags, id],
            )?;
            if changed == 0 {
                return Err(NoteError::NotFound(id));
            }
            Self::fetch(conn, id)
        })
    }

    pub fn delete(&self, id: i64) -> Result<(), NoteError> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM notes WHERE id = ?1", params![id])?;
            if changed == 0 {
                return Err(NoteError::NotFound(id));
            }
            debug!("Deleted note {}", id);
            Ok(())
        })
    }

    /// Create a note from an uploaded file's name and bytes.
    ///
    /// The title is the file name without its extension; content is decoded
    /// as UTF-8, replacing invalid sequences.
    pub fn import_upload(&self, original_name: &str, bytes: &[u8]) -> Result<Note, NoteError> {
        let title = Path::new(original_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| NoteError::invalid("Uploaded file has no usable name"))?;

        self.create(&NoteInput {
            title,
            content: Some(String::from_utf8_lossy(bytes).into_owned()),
            tags: Some(IMPORTED_TAG.to_string()),
        })
    }
}
