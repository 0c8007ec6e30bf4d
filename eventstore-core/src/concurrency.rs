//! Concurrency discrimination.
//!
//! On a uniqueness violation during `commit()`, every backend performs the
//! same targeted lookup by the deterministic key `(stream_id,
//! commit_sequence)` and hands the result here. Centralizing the
//! comparison means each backend only has to detect "a uniqueness
//! violation happened" in its own idiom (a Postgres error code, a
//! `HashMap::entry` collision, …) and call this once.

use crate::error::PersistenceError;
use eventstore_domain::{CommitId, StreamId};

/// Classify a uniqueness collision on `(stream_id, commit_sequence)`.
///
/// `existing_commit_id` is the commit id already on record at that key;
/// `attempted_commit_id` is the commit id the caller just tried to append.
/// Equal ids mean the caller is retrying an identical append and the
/// prior write stands ([`PersistenceError::DuplicateCommit`]); different
/// ids mean another writer got there first
/// ([`PersistenceError::Concurrency`]).
pub fn classify_unique_violation(
    stream_id: StreamId,
    commit_sequence: u64,
    existing_commit_id: CommitId,
    attempted_commit_id: CommitId,
) -> PersistenceError {
    if existing_commit_id == attempted_commit_id {
        PersistenceError::DuplicateCommit {
            stream_id,
            commit_sequence,
            existing_commit_id,
        }
    } else {
        PersistenceError::Concurrency {
            stream_id,
            commit_sequence,
            existing_commit_id,
            attempted_commit_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_commit_id_is_duplicate() {
        let stream_id = StreamId::generate();
        let commit_id = CommitId::generate();

        let err = classify_unique_violation(stream_id, 2, commit_id, commit_id);

        assert!(matches!(err, PersistenceError::DuplicateCommit { .. }));
    }

    #[test]
    fn different_commit_id_is_concurrency_conflict() {
        let stream_id = StreamId::generate();
        let existing = CommitId::generate();
        let attempted = CommitId::generate();

        let err = classify_unique_violation(stream_id, 2, existing, attempted);

        assert!(matches!(err, PersistenceError::Concurrency { .. }));
    }
}
