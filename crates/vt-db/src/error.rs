//! Database error types for vt-db.

use thiserror::Error;
use vt_core::errors::WorkflowError;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned data that could not be parsed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A non-stage uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A workflow rule rejected the operation. Nothing was written.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// The workflow rejection behind this error, if any.
    #[must_use]
    pub const fn workflow(&self) -> Option<&WorkflowError> {
        match self {
            Self::Workflow(error) => Some(error),
            _ => None,
        }
    }

    /// Rule rejections are caller errors; everything else is a storage fault.
    #[must_use]
    pub const fn is_workflow_rejection(&self) -> bool {
        matches!(self, Self::Workflow(_))
    }
}
