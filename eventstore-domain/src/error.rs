//! Domain-level validation errors.
//!
//! These are raised by the entity constructors in this crate, not by the
//! persistence engine. The engine's own error taxonomy (`DuplicateCommit`,
//! `Concurrency`, `Storage`, ...) lives in `eventstore-core`.

use thiserror::Error;

/// Errors raised while constructing or validating domain entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required identifier was the nil UUID.
    #[error("identifier must not be nil: {0}")]
    NilIdentifier(&'static str),

    /// `commit_sequence` was zero (sequences are 1-based).
    #[error("commit_sequence must be >= 1, got {0}")]
    InvalidCommitSequence(u64),

    /// `starting_stream_revision` was greater than `stream_revision`.
    #[error(
        "starting_stream_revision ({starting}) must be <= stream_revision ({revision})"
    )]
    InvalidRevisionRange {
        /// The offending starting revision.
        starting: u64,
        /// The offending stream revision.
        revision: u64,
    },

    /// A commit was constructed with zero events.
    #[error("a commit must contain at least one event")]
    EmptyCommit,
}
