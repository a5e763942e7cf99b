use crate::{Error, Result};
use rusqlite::Connection as SqliteConnection;
use std::path::{Path, PathBuf};
use tracing::debug;

pub type Connection = SqliteConnection;

const SCHEMA: &str = include_str!("../../schema.sql");

/// On-disk document store: one SQLite file holding the notes, categories
/// and users collections
pub struct Database {
    db_path: PathBuf,
}

impl Database {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Open the store, creating the file (and its directory) on first use.
    /// The schema is idempotent, so files written by an older build pick up
    /// any collection they are missing.
    pub fn open(&self) -> Result<Connection> {
        let fresh = !self.db_path.exists();
        if fresh {
            if let Some(dir) = self.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
        }

        let conn = SqliteConnection::open(&self.db_path)?;
        conn.execute_batch(SCHEMA)?;
        debug!(path = %self.db_path.display(), fresh, "document store opened");
        Ok(conn)
    }

    /// Scratch store for tests and throwaway sessions
    pub fn in_memory() -> Result<Connection> {
        let conn = SqliteConnection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn schema_version(conn: &Connection) -> Result<i32> {
        let version: String = conn.query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        version
            .parse()
            .map_err(|_| Error::InvalidInput(format!("Unreadable schema version: {}", version)))
    }
}
