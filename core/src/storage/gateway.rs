use std::path::Path;

use tracing::debug;

use super::{CategoryRepository, Connection, Database, NoteRepository, UserRepository};
use crate::models::{Category, Note, User};
use crate::{Error, Result};

/// Durable storage the workspace depends on.
///
/// Three collections are exposed: `notes` (one document per note),
/// `categories` (root categories with embedded subtrees, always rewritten
/// as a whole) and `users` (keyed by email).
pub trait PersistenceGateway {
    /// All notes, newest `created_at` first
    fn load_notes(&self) -> Result<Vec<Note>>;

    fn save_note(&self, note: &Note) -> Result<()>;

    /// Delete a note document. Deleting a missing note is not an error.
    fn delete_note(&self, id: &str) -> Result<()>;

    /// Root categories in stored order
    fn load_categories(&self) -> Result<Vec<Category>>;

    /// Replace the whole category collection
    fn save_all_categories(&self, categories: &[Category]) -> Result<()>;

    fn load_user(&self, email: &str) -> Result<Option<User>>;

    fn save_user(&self, user: &User) -> Result<()>;
}

/// Gateway backed by a SQLite document store
pub struct SqliteGateway {
    conn: Connection,
}

impl SqliteGateway {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (creating if needed) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Database::new(path).open()?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Database::in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl PersistenceGateway for SqliteGateway {
    fn load_notes(&self) -> Result<Vec<Note>> {
        NoteRepository::get_all(&self.conn)
    }

    fn save_note(&self, note: &Note) -> Result<()> {
        NoteRepository::save(&self.conn, note)
    }

    fn delete_note(&self, id: &str) -> Result<()> {
        match NoteRepository::delete(&self.conn, id) {
            Err(Error::NotFound(_)) => {
                debug!(note_id = %id, "note already absent from store");
                Ok(())
            }
            other => other,
        }
    }

    fn load_categories(&self) -> Result<Vec<Category>> {
        CategoryRepository::get_all(&self.conn)
    }

    fn save_all_categories(&self, categories: &[Category]) -> Result<()> {
        CategoryRepository::replace_all(&self.conn, categories)
    }

    fn load_user(&self, email: &str) -> Result<Option<User>> {
        UserRepository::get_by_email(&self.conn, email)
    }

    fn save_user(&self, user: &User) -> Result<()> {
        UserRepository::save(&self.conn, user)
    }
}
