use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Failed to obtain a connection from the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    /// Underlying database query failed.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    /// A stored JSON column could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Stored data violated a domain constraint.
    #[error("validation error: {0}")]
    ValidationError(String),
    /// The requested transition is not allowed from the record's current state.
    #[error("{0}")]
    InvalidState(String),
    /// Requested record does not exist.
    #[error("record not found")]
    NotFound,
}

/// Convenient alias for results returned from repository functions.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
