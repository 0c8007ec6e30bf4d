//! Commit/snapshot builders for tests.
//!
//! An options-style builder with sane defaults, assembled into the real
//! domain type rather than constructing it field-by-field at every call
//! site.

use chrono::{DateTime, Utc};
use eventstore_domain::{Commit, CommitId, Snapshot, StreamId};
use eventstore_serialize::{JsonSerializer, Serializer};

/// Encode `event_count` placeholder events through [`JsonSerializer`],
/// so fixtures carry bytes the serializer port actually produced rather
/// than a hand-written literal.
fn encode_events(event_count: u64) -> Vec<u8> {
    let events: Vec<serde_json::Value> = (0..event_count.max(1))
        .map(|seq| serde_json::json!({ "seq": seq }))
        .collect();
    JsonSerializer
        .serialize(&events)
        .expect("JsonSerializer can always encode a JSON array of plain objects")
}

/// Builder for a [`Commit`] with test-friendly defaults.
pub struct CommitBuilder {
    stream_id: StreamId,
    commit_id: CommitId,
    commit_sequence: u64,
    starting_stream_revision: u64,
    stream_revision: u64,
    commit_stamp: DateTime<Utc>,
    headers: Vec<u8>,
    events: Vec<u8>,
}

impl CommitBuilder {
    /// Start a builder for the first commit (`sequence = 1`) on a fresh
    /// stream, spanning revisions `1..=event_count`.
    pub fn first(stream_id: StreamId, event_count: u64) -> Self {
        Self {
            stream_id,
            commit_id: CommitId::generate(),
            commit_sequence: 1,
            starting_stream_revision: 1,
            stream_revision: event_count.max(1),
            commit_stamp: Utc::now(),
            headers: Vec::new(),
            events: encode_events(event_count),
        }
    }

    /// Continue the same stream: `sequence` follows `previous`, and
    /// revisions pick up where it left off, spanning `event_count` events.
    pub fn following(previous: &Commit, event_count: u64) -> Self {
        Self {
            stream_id: previous.stream_id,
            commit_id: CommitId::generate(),
            commit_sequence: previous.commit_sequence + 1,
            starting_stream_revision: previous.stream_revision + 1,
            stream_revision: previous.stream_revision + event_count.max(1),
            commit_stamp: Utc::now(),
            headers: Vec::new(),
            events: encode_events(event_count),
        }
    }

    /// Override the commit id (to construct a deliberate duplicate or a
    /// competing commit for a conflict scenario).
    pub fn with_commit_id(mut self, commit_id: CommitId) -> Self {
        self.commit_id = commit_id;
        self
    }

    /// Override the commit sequence.
    pub fn with_sequence(mut self, commit_sequence: u64) -> Self {
        self.commit_sequence = commit_sequence;
        self
    }

    /// Override the commit stamp, for temporal-query scenarios.
    pub fn with_stamp(mut self, stamp: DateTime<Utc>) -> Self {
        self.commit_stamp = stamp;
        self
    }

    /// Override the opaque event payload.
    pub fn with_events(mut self, events: Vec<u8>) -> Self {
        self.events = events;
        self
    }

    /// Assemble the commit, validating invariants.
    pub fn build(self) -> Commit {
        Commit::new(
            self.stream_id,
            self.commit_id,
            self.commit_sequence,
            self.starting_stream_revision,
            self.stream_revision,
            self.commit_stamp,
            self.headers,
            self.events,
        )
        .expect("fixture builder produced an invalid commit")
    }
}

/// Build a snapshot at `stream_revision` with an opaque payload.
pub fn snapshot_at(stream_id: StreamId, stream_revision: u64) -> Snapshot {
    let payload = JsonSerializer
        .serialize(&serde_json::json!({ "revision": stream_revision }))
        .expect("JsonSerializer can always encode a JSON object");
    Snapshot::new(stream_id, stream_revision, payload)
}
