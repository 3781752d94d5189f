//! Engine error taxonomy

use rallypoint_auth::PasswordError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Errors produced by the provisioning and ledger engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// A required field is missing or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A referenced team or identity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique key (email or team ID) is already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The import file is not readable text
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Password hashing failed
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Map a database error to Conflict when it is a unique-key violation.
    ///
    /// Concurrent provisioning can race on the allocated team ID (the
    /// allocator reads max+1 inside the same transaction as its insert); the
    /// loser of that race sees a unique violation here rather than a plain
    /// database error.
    pub fn from_db(err: DbErr, what: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                EngineError::Conflict(format!("{} already exists", what))
            }
            _ => EngineError::Database(err),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Conflict(_))
    }
}
