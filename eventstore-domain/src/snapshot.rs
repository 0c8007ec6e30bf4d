//! The `Snapshot` entity: a materialised stream state at a revision.

use crate::ids::StreamId;
use serde::{Deserialize, Serialize};

/// A materialised view of a stream's state at a given revision.
///
/// `(stream_id, stream_revision)` uniquely identifies a snapshot. Multiple
/// snapshots per stream are allowed; callers reading via `GetSnapshot`
/// always get the one with the greatest revision not exceeding the
/// requested bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Stream this snapshot summarizes.
    pub stream_id: StreamId,
    /// Revision at which the snapshot was taken.
    pub stream_revision: u64,
    /// Opaque serialized state, produced by the serializer port.
    pub payload: Vec<u8>,
}

impl Snapshot {
    /// Construct a new snapshot.
    pub fn new(stream_id: StreamId, stream_revision: u64, payload: Vec<u8>) -> Self {
        Self {
            stream_id,
            stream_revision,
            payload,
        }
    }
}
