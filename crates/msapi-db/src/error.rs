//! Error types for database access.

/// Boxed driver error carried as the source of a [`DbError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while talking to the database.
///
/// Each variant names the stage that failed; the driver's own error is kept
/// as the source.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Opening the connection or the liveness check failed.
    #[error("database connection error: {0}")]
    Connection(#[source] BoxError),

    /// Beginning, committing or rolling back a transaction failed.
    #[error("database transaction error: {0}")]
    Transaction(#[source] BoxError),

    /// The statement could not be prepared.
    #[error("failed to prepare statement: {0}")]
    Statement(#[source] BoxError),

    /// The prepared statement failed while running or reading results.
    #[error("failed to execute statement: {0}")]
    Execution(#[source] BoxError),
}

impl DbError {
    pub fn connection(err: impl Into<BoxError>) -> Self {
        Self::Connection(err.into())
    }

    pub fn transaction(err: impl Into<BoxError>) -> Self {
        Self::Transaction(err.into())
    }

    pub fn statement(err: impl Into<BoxError>) -> Self {
        Self::Statement(err.into())
    }

    pub fn execution(err: impl Into<BoxError>) -> Self {
        Self::Execution(err.into())
    }
}
