//! The backend-agnostic conformance suite.
//!
//! Each function exercises one invariant or literal scenario against any
//! [`PersistenceEngine`]. A backend crate's own test module calls these
//! against its concrete engine rather than this crate owning a test
//! binary of its own.

use crate::fixtures::{snapshot_at, CommitBuilder};
use chrono::Duration;
use eventstore_core::{PersistenceEngine, PersistenceError};
use eventstore_domain::StreamId;
use futures::StreamExt;

/// first commit on a new stream is durable, readable, and surfaces
/// in the snapshot-candidate stream once the head has quiesced.
pub async fn first_commit_on_new_stream(engine: &dyn PersistenceEngine) {
    let stream_id = StreamId::generate();
    let commit = CommitBuilder::first(stream_id, 3).build();

    engine.commit(commit.clone()).await.expect("first commit succeeds");

    let read_back: Vec<_> = engine
        .get_from_range(stream_id, 1, 10)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("range read succeeds");

    assert_eq!(read_back.len(), 1);
    assert_eq!(read_back[0], commit);

    let head = wait_for_stream_head(engine, stream_id, 0).await;
    assert_eq!(head.head_revision, 3);
    assert_eq!(head.snapshot_revision, 0);
}

/// two commits racing for the same `(stream_id, commit_sequence)`:
/// exactly one succeeds, the other raises `Concurrency`.
pub async fn concurrency_collision(engine: &dyn PersistenceEngine) {
    let stream_id = StreamId::generate();
    let first = CommitBuilder::first(stream_id, 3).build();
    engine.commit(first.clone()).await.expect("seed commit succeeds");

    let winner = CommitBuilder::following(&first, 2).build();
    let loser = CommitBuilder::following(&first, 2)
        .with_commit_id(eventstore_domain::CommitId::generate())
        .build();

    engine.commit(winner.clone()).await.expect("winner succeeds");
    let err = engine.commit(loser).await.expect_err("loser must raise");
    assert!(matches!(err, PersistenceError::Concurrency { .. }));
}

/// re-issuing an already-persisted commit raises `DuplicateCommit`
/// and the log still contains exactly one copy.
pub async fn idempotent_retry(engine: &dyn PersistenceEngine) {
    let stream_id = StreamId::generate();
    let first = CommitBuilder::first(stream_id, 3).build();
    let second = CommitBuilder::following(&first, 2).build();

    engine.commit(first.clone()).await.expect("first succeeds");
    engine.commit(second.clone()).await.expect("second succeeds");

    let err = engine
        .commit(second.clone())
        .await
        .expect_err("retry must raise");
    assert!(matches!(err, PersistenceError::DuplicateCommit { .. }));

    let read_back: Vec<_> = engine
        .get_from_range(stream_id, 1, 10)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("range read succeeds");
    assert_eq!(read_back.len(), 2);
}

/// `GetSnapshot` returns the greatest revision not exceeding the
/// requested bound, or the null indicator below the earliest snapshot.
pub async fn snapshot_selection(engine: &dyn PersistenceEngine) {
    let stream_id = StreamId::generate();
    let first = CommitBuilder::first(stream_id, 3).build();
    let second = CommitBuilder::following(&first, 2).build();
    let third = CommitBuilder::following(&second, 2).build();
    engine.commit(first).await.expect("commit 1");
    engine.commit(second).await.expect("commit 2");
    engine.commit(third).await.expect("commit 3");

    assert!(engine
        .add_snapshot(snapshot_at(stream_id, 3))
        .await
        .expect("snapshot at 3"));
    assert!(engine
        .add_snapshot(snapshot_at(stream_id, 5))
        .await
        .expect("snapshot at 5"));

    let found = engine
        .get_snapshot(stream_id, 6)
        .await
        .expect("lookup succeeds")
        .expect("a snapshot exists at or below 6");
    assert_eq!(found.stream_revision, 5);

    let none = engine
        .get_snapshot(stream_id, 2)
        .await
        .expect("lookup succeeds");
    assert!(none.is_none());
}

/// the dispatch cycle is idempotent.
pub async fn dispatch_cycle(engine: &dyn PersistenceEngine) {
    let stream_id = StreamId::generate();
    let commit = CommitBuilder::first(stream_id, 3).build();
    engine.commit(commit.clone()).await.expect("commit succeeds");

    let undispatched: Vec<_> = engine
        .get_undispatched()
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("undispatched read succeeds");
    assert!(undispatched
        .iter()
        .any(|c| c.stream_id == stream_id && c.commit_sequence == commit.commit_sequence));

    engine
        .mark_dispatched(stream_id, commit.commit_sequence)
        .await
        .expect("mark succeeds");

    let undispatched: Vec<_> = engine
        .get_undispatched()
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("undispatched read succeeds");
    assert!(!undispatched
        .iter()
        .any(|c| c.stream_id == stream_id && c.commit_sequence == commit.commit_sequence));

    engine
        .mark_dispatched(stream_id, commit.commit_sequence)
        .await
        .expect("second mark does not raise");
}

/// temporal query returns commits at or after the requested stamp,
/// ascending.
pub async fn temporal_query(engine: &dyn PersistenceEngine) {
    let now = chrono::Utc::now();
    let t1 = now - Duration::seconds(30);
    let t2 = now - Duration::seconds(20);
    let t3 = now - Duration::seconds(10);

    let stream_a = StreamId::generate();
    let stream_b = StreamId::generate();
    let stream_c = StreamId::generate();

    let commit_a = CommitBuilder::first(stream_a, 1).with_stamp(t1).build();
    let commit_b = CommitBuilder::first(stream_b, 1).with_stamp(t2).build();
    let commit_c = CommitBuilder::first(stream_c, 1).with_stamp(t3).build();

    engine.commit(commit_a).await.expect("commit a");
    engine.commit(commit_b.clone()).await.expect("commit b");
    engine.commit(commit_c.clone()).await.expect("commit c");

    let read_back: Vec<_> = engine
        .get_from_stamp(t2)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("stamp read succeeds");

    assert_eq!(read_back.len(), 2);
    assert_eq!(read_back[0].stream_id, stream_b);
    assert_eq!(read_back[1].stream_id, stream_c);
    assert!(read_back[0].commit_stamp <= read_back[1].commit_stamp);
}

/// Poll `get_streams_to_snapshot` until `stream_id` appears, up to a
/// short timeout. The maintainer updates the head asynchronously, so
/// tests observe it this way rather than assuming immediate visibility.
async fn wait_for_stream_head(
    engine: &dyn PersistenceEngine,
    stream_id: StreamId,
    max_threshold: u64,
) -> eventstore_domain::StreamHead {
    for _ in 0..200 {
        let heads: Vec<_> = engine
            .get_streams_to_snapshot(max_threshold)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .expect("stream head read succeeds");

        if let Some(head) = heads.into_iter().find(|h| h.stream_id == stream_id) {
            return head;
        }

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    panic!("stream head for {stream_id} never appeared");
}
