//! The persistence engine contract.

use crate::error::Result;
use chrono::{DateTime, Utc};
use eventstore_domain::{Commit, Snapshot, StreamHead, StreamId};
use futures::stream::BoxStream;

/// A lazy, ordered sequence of commits.
pub type CommitStream = BoxStream<'static, Result<Commit>>;

/// A lazy, ordered sequence of stream heads.
pub type StreamHeadStream = BoxStream<'static, Result<StreamHead>>;

/// The public surface of the event store persistence core.
///
/// One value implements this trait per storage backend (in-memory,
/// PostgreSQL, …); callers depend on the trait, not a concrete backend.
#[async_trait::async_trait]
pub trait PersistenceEngine: Send + Sync {
    /// Ensure schema/indexes exist. Idempotent; safe to call on every
    /// process start.
    async fn initialize(&self) -> Result<()>;

    /// Append one commit.
    ///
    /// On success, the commit is durably in the log and a stream-head
    /// update has been enqueued (it may not yet be visible).
    ///
    /// # Errors
    ///
    /// - [`crate::PersistenceError::DuplicateCommit`] if the exact same
    ///   commit was already persisted (idempotent retry).
    /// - [`crate::PersistenceError::Concurrency`] if a different commit
    ///   already occupies `(stream_id, commit_sequence)`.
    /// - [`crate::PersistenceError::Storage`] on any other backend error.
    async fn commit(&self, attempt: Commit) -> Result<()>;

    /// Lazily stream commits on `stream_id` whose
    /// `[starting_stream_revision, stream_revision]` overlaps the
    /// half-open window `[min_revision, max_revision]`, ascending by
    /// `starting_stream_revision` (equivalently `commit_sequence`).
    fn get_from_range(&self, stream_id: StreamId, min_revision: u64, max_revision: u64) -> CommitStream;

    /// Lazily stream all commits across all streams with
    /// `commit_stamp >= start`, ascending by `commit_stamp`.
    fn get_from_stamp(&self, start: DateTime<Utc>) -> CommitStream;

    /// Lazily stream all commits with `dispatched == false`, ascending by
    /// `commit_stamp`. May be stale; must not omit a commit whose flag is
    /// still false at observation time.
    fn get_undispatched(&self) -> CommitStream;

    /// Monotonically set `dispatched = true` on the identified commit.
    /// Idempotent: calling it twice is not an error.
    async fn mark_dispatched(&self, stream_id: StreamId, commit_sequence: u64) -> Result<()>;

    /// Return the snapshot of greatest `stream_revision <= max_revision`
    /// for `stream_id`, or `None` if none exist.
    async fn get_snapshot(&self, stream_id: StreamId, max_revision: u64) -> Result<Option<Snapshot>>;

    /// Insert a snapshot and enqueue a stream-head update.
    ///
    /// Returns `false` when the backend signals the snapshot cannot be
    /// written (e.g. a duplicate key) rather than raising. Any other
    /// backend error is [`crate::PersistenceError::Storage`].
    async fn add_snapshot(&self, snapshot: Snapshot) -> Result<bool>;

    /// Lazily stream stream heads whose `snapshot_age() >= max_threshold`.
    /// Advisory: reads the best-effort stream-head summary.
    fn get_streams_to_snapshot(&self, max_threshold: u64) -> StreamHeadStream;
}
