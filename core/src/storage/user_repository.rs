use crate::models::User;
use crate::Result;
use rusqlite::{params, Connection, OptionalExtension};

/// The `users` collection, keyed by email.
pub struct UserRepository;

impl UserRepository {
    /// Insert or overwrite a user document
    pub fn save(conn: &Connection, user: &User) -> Result<()> {
        let document = serde_json::to_string(user)?;
        conn.execute(
            "INSERT INTO users (email, document) VALUES (?1, ?2)
             ON CONFLICT(email) DO UPDATE SET document = excluded.document",
            params![user.email, document],
        )?;
        Ok(())
    }

    /// Get a user by email; `None` when no profile has been saved
    pub fn get_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM users WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(document) => Ok(Some(serde_json::from_str(&document)?)),
            None => Ok(None),
        }
    }
}
