//! The `StreamHead` entity: a best-effort per-stream summary.

use crate::ids::StreamId;
use serde::{Deserialize, Serialize};

/// Best-effort summary of a stream's latest commit revision and latest
/// snapshot revision.
///
/// Stream heads are derived from the commit log and may lag it; they are
/// never consulted for concurrency checks, only for advisory queries such
/// as `GetStreamsToSnapshot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamHead {
    /// Stream this head summarizes.
    pub stream_id: StreamId,
    /// Maximum committed stream revision observed so far.
    pub head_revision: u64,
    /// Maximum snapshot revision observed so far, 0 if none exist.
    pub snapshot_revision: u64,
}

impl StreamHead {
    /// Construct the head for a stream's first commit: no snapshot yet.
    pub fn first_commit(stream_id: StreamId, head_revision: u64) -> Self {
        Self {
            stream_id,
            head_revision,
            snapshot_revision: 0,
        }
    }

    /// Revisions committed since the latest snapshot.
    pub fn snapshot_age(&self) -> u64 {
        self.head_revision.saturating_sub(self.snapshot_revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_age_is_gap_between_head_and_snapshot() {
        let head = StreamHead {
            stream_id: StreamId::generate(),
            head_revision: 10,
            snapshot_revision: 4,
        };
        assert_eq!(head.snapshot_age(), 6);
    }

    #[test]
    fn first_commit_has_zero_snapshot_revision() {
        let head = StreamHead::first_commit(StreamId::generate(), 3);
        assert_eq!(head.snapshot_revision, 0);
        assert_eq!(head.snapshot_age(), 3);
    }
}
