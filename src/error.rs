// ============================================================================
// Service Errors
// ============================================================================
//
// Not-found conditions are never errors here: operations log them and hand
// back `None`/`false`. Everything the store raises propagates untouched.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
