use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Food item {0} is not available: {1}")]
    NotAvailable(i32, String),
    #[error("Invalid claim code: {0}")]
    InvalidCode(String),
    #[error("Invalid state: {0} is currently '{1}'")]
    WrongState(String, String),
    #[error("Expired: {0}")]
    Expired(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
    #[error("Connection pool error: {0}")]
    ConnectionPoolError(#[from] diesel::r2d2::PoolError),
}
