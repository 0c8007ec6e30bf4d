//! Bootstrap-level errors.

use thiserror::Error;

/// Errors raised while loading configuration or bootstrapping the schema.
#[derive(Debug, Error)]
pub enum InitError {
    /// A required environment variable was missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connecting to PostgreSQL or running the schema bootstrap failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for bootstrap operations.
pub type InitResult<T> = Result<T, InitError>;
