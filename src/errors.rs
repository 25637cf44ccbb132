use thiserror::Error;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents a request value that failed validation. Only the
    /// name of the offending field is kept.
    #[error("Data is not correct")]
    InvalidInput { field: &'static str },

    /// Represents a lookup by ID that matched no player.
    #[error("Player not found")]
    NotFound { id: i64 },

    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },
}

impl BackendError {
    pub(crate) fn invalid(field: &'static str) -> Self {
        BackendError::InvalidInput { field }
    }
}
