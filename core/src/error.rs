use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Not signed in")]
    NotSignedIn,
}

impl Error {
    /// True for failures raised by the persistence layer rather than by
    /// local validation or integrity checks.
    pub fn is_gateway_failure(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::Io(_) | Error::Serialization(_) | Error::Gateway(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
