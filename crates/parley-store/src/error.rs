use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A query expected exactly one row but found none.
    #[error("Record not found")]
    NotFound,

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// A statement did not produce the column set its decoder expects.
    #[error("Schema mismatch: {0}")]
    Schema(String),

    /// A thread panicked while holding the connection.
    #[error("Connection lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// `UNIQUE` constraint failure, e.g. a display name already in use.
    pub fn is_unique_violation(&self) -> bool {
        self.constraint_code() == Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
            || self.constraint_code() == Some(rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    }

    /// `FOREIGN KEY` constraint failure, e.g. an unknown participant id.
    pub fn is_foreign_key_violation(&self) -> bool {
        self.constraint_code() == Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
    }

    fn constraint_code(&self) -> Option<i32> {
        match self {
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Some(err.extended_code)
            }
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
