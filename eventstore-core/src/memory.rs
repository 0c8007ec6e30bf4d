//! In-memory reference backend.
//!
//! Exists for tests and local development without a database: thread-safe
//! via `RwLock`-protected maps, no external dependencies.

use crate::engine::{CommitStream, PersistenceEngine, StreamHeadStream};
use crate::error::{PersistenceError, Result};
use crate::maintainer::{HeadSink, HeadUpdate, MaintainerHandle};
use eventstore_domain::{Commit, Snapshot, StreamHead, StreamId};
use futures::stream;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

#[derive(Default)]
struct Backend {
    commits: HashMap<StreamId, Vec<Commit>>,
    snapshots: HashMap<StreamId, Vec<Snapshot>>,
    heads: HashMap<StreamId, StreamHead>,
}

struct MemoryHeadSink {
    backend: Arc<RwLock<Backend>>,
}

#[async_trait::async_trait]
impl HeadSink for MemoryHeadSink {
    async fn apply(&self, update: HeadUpdate) -> anyhow::Result<()> {
        let mut backend = self
            .backend
            .write()
            .map_err(|_| anyhow::anyhow!("stream head lock poisoned"))?;

        match update {
            HeadUpdate::CommitAppended { stream_id, revision } => {
                backend
                    .heads
                    .entry(stream_id)
                    .and_modify(|head| head.head_revision = revision)
                    .or_insert_with(|| StreamHead::first_commit(stream_id, revision));
            }
            HeadUpdate::SnapshotAdded { stream_id, revision } => {
                backend
                    .heads
                    .entry(stream_id)
                    .and_modify(|head| head.snapshot_revision = revision)
                    .or_insert(StreamHead {
                        stream_id,
                        head_revision: revision,
                        snapshot_revision: revision,
                    });
            }
        }

        Ok(())
    }
}

/// In-memory `PersistenceEngine`, backed by a thread-safe `HashMap`.
pub struct InMemoryEngine {
    backend: Arc<RwLock<Backend>>,
    maintainer: MaintainerHandle,
}

impl InMemoryEngine {
    /// Construct a new, empty in-memory engine.
    pub fn new() -> Self {
        let backend = Arc::new(RwLock::new(Backend::default()));
        let maintainer = MaintainerHandle::spawn(MemoryHeadSink {
            backend: backend.clone(),
        });
        Self { backend, maintainer }
    }
}

impl Default for InMemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceEngine for InMemoryEngine {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn commit(&self, attempt: Commit) -> Result<()> {
        let mut backend = self
            .backend
            .write()
            .map_err(|_| PersistenceError::Storage(anyhow::anyhow!("commit lock poisoned")))?;

        if let Some(existing) = backend
            .commits
            .values()
            .flatten()
            .find(|c| c.commit_id == attempt.commit_id && c.stream_id != attempt.stream_id)
        {
            // CommitId is globally unique, matching the unique constraint
            // a relational backend would enforce on this column.
            return Err(PersistenceError::Concurrency {
                stream_id: attempt.stream_id,
                commit_sequence: attempt.commit_sequence,
                existing_commit_id: existing.commit_id,
                attempted_commit_id: attempt.commit_id,
            });
        }

        let stream_commits = backend.commits.entry(attempt.stream_id).or_default();

        if let Some(existing) = stream_commits
            .iter()
            .find(|c| c.commit_sequence == attempt.commit_sequence)
        {
            return Err(crate::concurrency::classify_unique_violation(
                attempt.stream_id,
                attempt.commit_sequence,
                existing.commit_id,
                attempt.commit_id,
            ));
        }

        let revision = attempt.stream_revision;
        let stream_id = attempt.stream_id;
        stream_commits.push(attempt);

        self.maintainer
            .enqueue(HeadUpdate::CommitAppended { stream_id, revision });

        Ok(())
    }

    fn get_from_range(&self, stream_id: StreamId, min_revision: u64, max_revision: u64) -> CommitStream {
        let backend = self.backend.read().expect("stream lock poisoned");
        let mut commits: Vec<Commit> = backend
            .commits
            .get(&stream_id)
            .into_iter()
            .flatten()
            .filter(|c| c.overlaps_revision_window(min_revision, max_revision))
            .cloned()
            .collect();
        commits.sort_by_key(|c| c.starting_stream_revision);

        Box::pin(stream::iter(commits.into_iter().map(Ok)))
    }

    fn get_from_stamp(&self, start: chrono::DateTime<chrono::Utc>) -> CommitStream {
        let backend = self.backend.read().expect("stream lock poisoned");
        let mut commits: Vec<Commit> = backend
            .commits
            .values()
            .flatten()
            .filter(|c| c.commit_stamp >= start)
            .cloned()
            .collect();
        commits.sort_by_key(|c| c.commit_stamp);

        Box::pin(stream::iter(commits.into_iter().map(Ok)))
    }

    fn get_undispatched(&self) -> CommitStream {
        let backend = self.backend.read().expect("stream lock poisoned");
        let mut commits: Vec<Commit> = backend
            .commits
            .values()
            .flatten()
            .filter(|c| !c.dispatched)
            .cloned()
            .collect();
        commits.sort_by_key(|c| c.commit_stamp);

        Box::pin(stream::iter(commits.into_iter().map(Ok)))
    }

    async fn mark_dispatched(&self, stream_id: StreamId, commit_sequence: u64) -> Result<()> {
        let mut backend = self
            .backend
            .write()
            .map_err(|_| PersistenceError::Storage(anyhow::anyhow!("commit lock poisoned")))?;

        if let Some(commits) = backend.commits.get_mut(&stream_id) {
            if let Some(commit) = commits
                .iter_mut()
                .find(|c| c.commit_sequence == commit_sequence)
            {
                commit.dispatched = true;
            }
        }

        Ok(())
    }

    async fn get_snapshot(&self, stream_id: StreamId, max_revision: u64) -> Result<Option<Snapshot>> {
        let backend = self
            .backend
            .read()
            .map_err(|_| PersistenceError::Storage(anyhow::anyhow!("snapshot lock poisoned")))?;

        let snapshot = backend
            .snapshots
            .get(&stream_id)
            .into_iter()
            .flatten()
            .filter(|s| s.stream_revision <= max_revision)
            .max_by_key(|s| s.stream_revision)
            .cloned();

        Ok(snapshot)
    }

    async fn add_snapshot(&self, snapshot: Snapshot) -> Result<bool> {
        let mut backend = self
            .backend
            .write()
            .map_err(|_| PersistenceError::Storage(anyhow::anyhow!("snapshot lock poisoned")))?;

        let stream_id = snapshot.stream_id;
        let revision = snapshot.stream_revision;
        let existing = backend.snapshots.entry(stream_id).or_default();

        if existing.iter().any(|s| s.stream_revision == revision) {
            debug!(%stream_id, revision, "duplicate snapshot key, not written");
            return Ok(false);
        }

        existing.push(snapshot);
        drop(backend);

        self.maintainer
            .enqueue(HeadUpdate::SnapshotAdded { stream_id, revision });

        Ok(true)
    }

    fn get_streams_to_snapshot(&self, max_threshold: u64) -> StreamHeadStream {
        let backend = self.backend.read().expect("stream lock poisoned");
        let heads: Vec<StreamHead> = backend
            .heads
            .values()
            .filter(|h| h.snapshot_age() >= max_threshold)
            .copied()
            .collect();

        Box::pin(stream::iter(heads.into_iter().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eventstore_domain::CommitId;
    use futures::StreamExt;

    fn make_commit(
        stream_id: StreamId,
        commit_id: CommitId,
        sequence: u64,
        starting: u64,
        revision: u64,
    ) -> Commit {
        Commit::new(
            stream_id,
            commit_id,
            sequence,
            starting,
            revision,
            Utc::now(),
            vec![],
            vec![1],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn first_commit_is_readable_and_populates_head() {
        let engine = InMemoryEngine::new();
        let stream_id = StreamId::generate();
        let commit = make_commit(stream_id, CommitId::generate(), 1, 1, 3);

        engine.commit(commit.clone()).await.unwrap();

        let read_back: Vec<_> = engine
            .get_from_range(stream_id, 1, 10)
            .collect::<Vec<_>>()
            .await;
        assert_eq!(read_back.len(), 1);
        assert_eq!(read_back[0].as_ref().unwrap().commit_id, commit.commit_id);

        for _ in 0..50 {
            let heads: Vec<_> = engine
                .get_streams_to_snapshot(0)
                .collect::<Vec<_>>()
                .await;
            if !heads.is_empty() {
                assert_eq!(heads[0].as_ref().unwrap().head_revision, 3);
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("stream head was never populated");
    }

    #[tokio::test]
    async fn identical_retry_is_duplicate_commit() {
        let engine = InMemoryEngine::new();
        let stream_id = StreamId::generate();
        let commit_id = CommitId::generate();
        let commit = make_commit(stream_id, commit_id, 1, 1, 3);

        engine.commit(commit.clone()).await.unwrap();
        let err = engine.commit(commit).await.unwrap_err();

        assert!(matches!(err, PersistenceError::DuplicateCommit { .. }));
    }

    #[tokio::test]
    async fn competing_commit_at_same_sequence_is_concurrency_conflict() {
        let engine = InMemoryEngine::new();
        let stream_id = StreamId::generate();
        let first = make_commit(stream_id, CommitId::generate(), 1, 1, 3);
        let second = make_commit(stream_id, CommitId::generate(), 1, 1, 2);

        engine.commit(first).await.unwrap();
        let err = engine.commit(second).await.unwrap_err();

        assert!(matches!(err, PersistenceError::Concurrency { .. }));
    }

    #[tokio::test]
    async fn mark_dispatched_is_idempotent() {
        let engine = InMemoryEngine::new();
        let stream_id = StreamId::generate();
        let commit = make_commit(stream_id, CommitId::generate(), 1, 1, 1);
        engine.commit(commit).await.unwrap();

        engine.mark_dispatched(stream_id, 1).await.unwrap();
        engine.mark_dispatched(stream_id, 1).await.unwrap();

        let undispatched: Vec<_> = engine.get_undispatched().collect::<Vec<_>>().await;
        assert!(undispatched.is_empty());
    }

    #[tokio::test]
    async fn snapshot_selection_returns_greatest_revision_not_exceeding_bound() {
        let engine = InMemoryEngine::new();
        let stream_id = StreamId::generate();

        engine
            .add_snapshot(Snapshot::new(stream_id, 3, vec![1]))
            .await
            .unwrap();
        engine
            .add_snapshot(Snapshot::new(stream_id, 5, vec![2]))
            .await
            .unwrap();

        let snapshot = engine.get_snapshot(stream_id, 6).await.unwrap().unwrap();
        assert_eq!(snapshot.stream_revision, 5);

        let none = engine.get_snapshot(stream_id, 2).await.unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn duplicate_snapshot_key_is_reported_not_raised() {
        let engine = InMemoryEngine::new();
        let stream_id = StreamId::generate();

        assert!(engine
            .add_snapshot(Snapshot::new(stream_id, 3, vec![1]))
            .await
            .unwrap());
        assert!(!engine
            .add_snapshot(Snapshot::new(stream_id, 3, vec![2]))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn get_from_stamp_orders_ascending_across_streams() {
        let engine = InMemoryEngine::new();
        let stream_a = StreamId::generate();
        let stream_b = StreamId::generate();

        let mut early = make_commit(stream_a, CommitId::generate(), 1, 1, 1);
        early.commit_stamp = Utc::now() - chrono::Duration::seconds(10);
        let mut late = make_commit(stream_b, CommitId::generate(), 1, 1, 1);
        late.commit_stamp = Utc::now();

        engine.commit(late.clone()).await.unwrap();
        engine.commit(early.clone()).await.unwrap();

        let from_zero: Vec<_> = engine
            .get_from_stamp(early.commit_stamp)
            .collect::<Vec<_>>()
            .await;
        assert_eq!(from_zero.len(), 2);
        assert_eq!(
            from_zero[0].as_ref().unwrap().commit_id,
            early.commit_id
        );
    }
}
