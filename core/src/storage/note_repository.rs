use crate::models::{datetime_to_timestamp, Note};
use crate::{Error, Result};
use rusqlite::{params, Connection};

/// The `notes` collection: one JSON document per note.
pub struct NoteRepository;

impl NoteRepository {
    /// Insert or overwrite a note document
    pub fn save(conn: &Connection, note: &Note) -> Result<()> {
        let document = serde_json::to_string(note)?;
        conn.execute(
            "INSERT INTO notes (id, created_at, document) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET created_at = excluded.created_at, document = excluded.document",
            params![note.id, datetime_to_timestamp(&note.created_at), document],
        )?;
        Ok(())
    }

    /// Get all notes, newest first
    pub fn get_all(conn: &Connection) -> Result<Vec<Note>> {
        let mut stmt = conn.prepare(
            "SELECT document FROM notes ORDER BY created_at DESC, id DESC"
        )?;

        let documents = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut notes = documents
            .iter()
            .map(|doc| serde_json::from_str::<Note>(doc))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        // Sub-second order is only in the document itself
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(notes)
    }

    /// Delete a note
    pub fn delete(conn: &Connection, id: &str) -> Result<()> {
        let rows_affected = conn.execute("DELETE FROM notes WHERE id = ?1", params![id])?;

        if rows_affected == 0 {
            return Err(Error::NotFound(format!("Note not found: {}", id)));
        }

        Ok(())
    }
}
