//! Persistence engine error taxonomy.

use eventstore_domain::{CommitId, StreamId};
use thiserror::Error;

/// Errors surfaced by [`crate::PersistenceEngine`] operations.
///
/// `DuplicateCommit` and `Concurrency` both arise from a uniqueness
/// collision on `(stream_id, commit_sequence)`, but only `Concurrency`
/// represents a genuine conflict the caller must rebase against.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The exact same commit (same `stream_id`, `commit_sequence`, and
    /// `commit_id`) was already persisted. Idempotent retry: the caller
    /// should treat this as success.
    #[error(
        "commit {existing_commit_id} already persisted at stream {stream_id} sequence {commit_sequence}"
    )]
    DuplicateCommit {
        /// Stream the commit targets.
        stream_id: StreamId,
        /// The colliding sequence number.
        commit_sequence: u64,
        /// The commit id already on record.
        existing_commit_id: CommitId,
    },

    /// A different commit already occupies `(stream_id, commit_sequence)`.
    /// The caller must re-read the stream and rebase before retrying.
    #[error(
        "concurrent append at stream {stream_id} sequence {commit_sequence}: existing commit {existing_commit_id}, attempted {attempted_commit_id}"
    )]
    Concurrency {
        /// Stream the commit targets.
        stream_id: StreamId,
        /// The colliding sequence number.
        commit_sequence: u64,
        /// The commit id already on record.
        existing_commit_id: CommitId,
        /// The commit id the caller attempted to append.
        attempted_commit_id: CommitId,
    },

    /// Any backend/transport error not classified above. Opaque to the
    /// caller; retrying after a delay is reasonable.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),

    /// A required argument was absent (e.g. a null/default commit).
    #[error("required argument missing: {0}")]
    ArgumentNull(&'static str),

    /// The commit failed a structural precondition (impossible revisions,
    /// zero events, …). A programming error; do not retry.
    #[error("invalid commit: {0}")]
    InvalidCommit(String),
}

/// Convenience result alias for persistence engine operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
