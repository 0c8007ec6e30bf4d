//! The `Commit` entity: an immutable append to one stream.

use crate::error::DomainError;
use crate::ids::{CommitId, StreamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable append of one or more events to a stream.
///
/// Once persisted, the only mutation a `Commit` ever undergoes is the
/// monotonic `dispatched` transition from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Stream this commit belongs to.
    pub stream_id: StreamId,
    /// Client-generated identifier, globally unique per stream.
    pub commit_id: CommitId,
    /// 1-based index of this commit within its stream.
    pub commit_sequence: u64,
    /// Revision immediately after the previous commit.
    pub starting_stream_revision: u64,
    /// Revision of the stream after applying this commit's events.
    pub stream_revision: u64,
    /// Wall-clock instant at append time.
    pub commit_stamp: DateTime<Utc>,
    /// Opaque serialized header blob, produced by the serializer port.
    pub headers: Vec<u8>,
    /// Opaque serialized event blob, produced by the serializer port.
    pub events: Vec<u8>,
    /// Whether this commit has been handed to the external dispatcher.
    pub dispatched: bool,
}

impl Commit {
    /// Construct a new, not-yet-dispatched commit, validating the
    /// structural invariants below.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stream_id: StreamId,
        commit_id: CommitId,
        commit_sequence: u64,
        starting_stream_revision: u64,
        stream_revision: u64,
        commit_stamp: DateTime<Utc>,
        headers: Vec<u8>,
        events: Vec<u8>,
    ) -> Result<Self, DomainError> {
        if stream_id.is_nil() {
            return Err(DomainError::NilIdentifier("stream_id"));
        }
        if commit_id.is_nil() {
            return Err(DomainError::NilIdentifier("commit_id"));
        }
        if commit_sequence < 1 {
            return Err(DomainError::InvalidCommitSequence(commit_sequence));
        }
        if starting_stream_revision > stream_revision {
            return Err(DomainError::InvalidRevisionRange {
                starting: starting_stream_revision,
                revision: stream_revision,
            });
        }
        if events.is_empty() {
            return Err(DomainError::EmptyCommit);
        }

        Ok(Self {
            stream_id,
            commit_id,
            commit_sequence,
            starting_stream_revision,
            stream_revision,
            commit_stamp,
            headers,
            events,
            dispatched: false,
        })
    }

    /// Number of events carried by this commit, per the revision range.
    pub fn event_count(&self) -> u64 {
        self.stream_revision - self.starting_stream_revision + 1
    }

    /// Whether `[self.starting_stream_revision, self.stream_revision]`
    /// intersects the half-open window `[min_revision, max_revision]`
    /// used by `GetFrom(streamId, minRevision, maxRevision)`.
    pub fn overlaps_revision_window(&self, min_revision: u64, max_revision: u64) -> bool {
        self.starting_stream_revision <= max_revision && self.stream_revision >= min_revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(seq: u64, starting: u64, revision: u64) -> Result<Commit, DomainError> {
        Commit::new(
            StreamId::generate(),
            CommitId::generate(),
            seq,
            starting,
            revision,
            Utc::now(),
            vec![],
            vec![1, 2, 3],
        )
    }

    #[test]
    fn rejects_zero_sequence() {
        assert_eq!(
            make(0, 1, 1).unwrap_err(),
            DomainError::InvalidCommitSequence(0)
        );
    }

    #[test]
    fn rejects_inverted_revision_range() {
        assert_eq!(
            make(1, 5, 3).unwrap_err(),
            DomainError::InvalidRevisionRange {
                starting: 5,
                revision: 3
            }
        );
    }

    #[test]
    fn rejects_empty_events() {
        let err = Commit::new(
            StreamId::generate(),
            CommitId::generate(),
            1,
            1,
            3,
            Utc::now(),
            vec![],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, DomainError::EmptyCommit);
    }

    #[test]
    fn event_count_matches_revision_span() {
        let commit = make(1, 4, 7).unwrap();
        assert_eq!(commit.event_count(), 4);
    }

    #[test]
    fn overlap_uses_half_open_window_intersection() {
        let commit = make(2, 4, 6).unwrap();
        assert!(commit.overlaps_revision_window(1, 4));
        assert!(commit.overlaps_revision_window(5, 10));
        assert!(!commit.overlaps_revision_window(7, 10));
        assert!(!commit.overlaps_revision_window(1, 3));
    }
}
