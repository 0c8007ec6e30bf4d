//! Backend record mappers.
//!
//! Translates between the domain entities and the row shapes sqlx reads
//! off the wire. Never inspects the `headers`/`payload` blobs — they pass
//! through opaque.

use chrono::{DateTime, Utc};
use eventstore_domain::{Commit, CommitId, Snapshot, StreamHead, StreamId};
use uuid::Uuid;

/// Row shape for the `commits` table.
#[derive(sqlx::FromRow)]
pub struct CommitRow {
    pub stream_id: Uuid,
    pub commit_id: Uuid,
    pub commit_sequence: i64,
    pub starting_stream_revision: i64,
    pub stream_revision: i64,
    pub commit_stamp: DateTime<Utc>,
    pub headers: Vec<u8>,
    pub payload: Vec<u8>,
    pub dispatched: bool,
}

impl From<CommitRow> for Commit {
    fn from(row: CommitRow) -> Self {
        Commit {
            stream_id: StreamId::new(row.stream_id),
            commit_id: CommitId::new(row.commit_id),
            commit_sequence: row.commit_sequence as u64,
            starting_stream_revision: row.starting_stream_revision as u64,
            stream_revision: row.stream_revision as u64,
            commit_stamp: row.commit_stamp,
            headers: row.headers,
            events: row.payload,
            dispatched: row.dispatched,
        }
    }
}

/// Row shape for the `snapshots` table.
#[derive(sqlx::FromRow)]
pub struct SnapshotRow {
    pub stream_id: Uuid,
    pub stream_revision: i64,
    pub payload: Vec<u8>,
}

impl From<SnapshotRow> for Snapshot {
    fn from(row: SnapshotRow) -> Self {
        Snapshot {
            stream_id: StreamId::new(row.stream_id),
            stream_revision: row.stream_revision as u64,
            payload: row.payload,
        }
    }
}

/// Row shape for the `stream_heads` table.
#[derive(sqlx::FromRow)]
pub struct StreamHeadRow {
    pub stream_id: Uuid,
    pub head_revision: i64,
    pub snapshot_revision: i64,
}

impl From<StreamHeadRow> for StreamHead {
    fn from(row: StreamHeadRow) -> Self {
        StreamHead {
            stream_id: StreamId::new(row.stream_id),
            head_revision: row.head_revision as u64,
            snapshot_revision: row.snapshot_revision as u64,
        }
    }
}
