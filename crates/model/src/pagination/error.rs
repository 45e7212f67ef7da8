use thiserror::Error;

/// Input validation failures raised while decoding a cursor or building a
/// pagination directive. None of them are retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// The order spec is empty where sort keys are required, or names a
    /// column that does not exist.
    #[error("invalid order spec: {0}")]
    InvalidOrderSpec(String),

    /// The token is not valid base64url, not an array of scalars, or its
    /// value count does not match the order spec.
    #[error("invalid cursor token: {0}")]
    InvalidCursorToken(String),

    /// Page sizes must be positive.
    #[error("invalid limit: {0} (must be a positive integer)")]
    InvalidLimit(i64),
}
