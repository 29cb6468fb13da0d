//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    /// A unique constraint rejected the write; carries the offending column.
    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DatabaseError {
    /// Map a write failure, recognising SQLite unique-constraint violations.
    pub fn from_write(error: sqlx::Error) -> Self {
        let message = error.to_string();
        if message.contains("UNIQUE constraint failed") {
            if message.contains("member_number") {
                DatabaseError::Duplicate("member_number".to_string())
            } else if message.contains("email") {
                DatabaseError::Duplicate("email".to_string())
            } else {
                DatabaseError::Duplicate(message)
            }
        } else {
            DatabaseError::QueryError(message)
        }
    }

    pub fn is_duplicate(&self, field: &str) -> bool {
        matches!(self, DatabaseError::Duplicate(column) if column == field)
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::QueryError(error.to_string())
    }
}
