//! Translation of `sqlx::Error` into the engine's error taxonomy.
//!
//! Checks for Postgres code `23505` (unique violation) before falling
//! back to an opaque storage error.

/// Postgres error code for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Whether a `sqlx::Error` represents a unique constraint violation.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}
