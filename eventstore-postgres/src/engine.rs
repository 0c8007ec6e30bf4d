//! `PostgresEngine`: the relational implementation of
//! [`eventstore_core::PersistenceEngine`].
//!
//! The append path: insert, and on a unique-violation re-read the
//! colliding row by the deterministic key to discriminate duplicate-retry
//! from genuine conflict ([`eventstore_core::classify_unique_violation`]).

use crate::dialect;
use crate::error::is_unique_violation;
use crate::mapper::{CommitRow, SnapshotRow, StreamHeadRow};
use chrono::{DateTime, Utc};
use eventstore_core::{
    classify_unique_violation, CommitStream, HeadSink, HeadUpdate, MaintainerHandle,
    PersistenceEngine, PersistenceError, Result, StreamHeadStream,
};
use eventstore_domain::{Commit, CommitId, Snapshot, StreamHead, StreamId};
use sqlx::PgPool;
use tracing::debug;

struct PgHeadSink {
    pool: PgPool,
}

#[async_trait::async_trait]
impl HeadSink for PgHeadSink {
    async fn apply(&self, update: HeadUpdate) -> anyhow::Result<()> {
        match update {
            HeadUpdate::CommitAppended { stream_id, revision } => {
                sqlx::query(dialect::UPSERT_HEAD_REVISION)
                    .bind(stream_id.as_uuid())
                    .bind(revision as i64)
                    .execute(&self.pool)
                    .await?;
            }
            HeadUpdate::SnapshotAdded { stream_id, revision } => {
                sqlx::query(dialect::UPSERT_HEAD_SNAPSHOT_REVISION)
                    .bind(stream_id.as_uuid())
                    .bind(revision as i64)
                    .execute(&self.pool)
                    .await?;
            }
        }
        Ok(())
    }
}

/// PostgreSQL-backed [`PersistenceEngine`].
///
/// Owns a `PgPool` for its lifetime; each operation acquires a connection
/// (and, for writes, a short-lived transaction) scoped to that call rather
/// than holding one across the engine's lifetime.
pub struct PostgresEngine {
    pool: PgPool,
    maintainer: MaintainerHandle,
}

impl PostgresEngine {
    /// Construct an engine over an already-connected pool. Call
    /// [`PersistenceEngine::initialize`] before first use.
    pub fn new(pool: PgPool) -> Self {
        let maintainer = MaintainerHandle::spawn(PgHeadSink { pool: pool.clone() });
        Self { pool, maintainer }
    }
}

#[async_trait::async_trait]
impl PersistenceEngine for PostgresEngine {
    async fn initialize(&self) -> Result<()> {
        crate::init::initialize(&self.pool)
            .await
            .map_err(|e| PersistenceError::Storage(e.into()))
    }

    async fn commit(&self, attempt: Commit) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PersistenceError::Storage(e.into()))?;

        let result = sqlx::query(dialect::INSERT_COMMIT)
            .bind(attempt.stream_id.as_uuid())
            .bind(attempt.commit_id.as_uuid())
            .bind(attempt.commit_sequence as i64)
            .bind(attempt.starting_stream_revision as i64)
            .bind(attempt.stream_revision as i64)
            .bind(attempt.commit_stamp)
            .bind(&attempt.headers)
            .bind(&attempt.events)
            .execute(&mut *tx)
            .await;

        match result {
            Ok(_) => {
                tx.commit().await.map_err(|e| PersistenceError::Storage(e.into()))?;

                debug!(
                    stream_id = %attempt.stream_id,
                    commit_sequence = attempt.commit_sequence,
                    "commit appended"
                );

                self.maintainer.enqueue(HeadUpdate::CommitAppended {
                    stream_id: attempt.stream_id,
                    revision: attempt.stream_revision,
                });

                Ok(())
            }
            Err(e) if is_unique_violation(&e) => {
                let existing_commit_id: Option<uuid::Uuid> =
                    sqlx::query_scalar(dialect::SELECT_COMMIT_BY_KEY)
                        .bind(attempt.stream_id.as_uuid())
                        .bind(attempt.commit_sequence as i64)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(|e| PersistenceError::Storage(e.into()))?;

                match existing_commit_id {
                    Some(existing) => Err(classify_unique_violation(
                        attempt.stream_id,
                        attempt.commit_sequence,
                        CommitId::new(existing),
                        attempt.commit_id,
                    )),
                    // Nothing at this attempt's (stream_id, commit_sequence)
                    // key, so the collision was on commit_id alone: the same
                    // id already landed on a different stream. commit_id is
                    // client-generated and globally unique, so this can never
                    // be a legitimate identical retry of this attempt.
                    None => {
                        let existing_stream_id: Option<uuid::Uuid> =
                            sqlx::query_scalar(dialect::SELECT_STREAM_BY_COMMIT_ID)
                                .bind(attempt.commit_id.as_uuid())
                                .fetch_optional(&mut *tx)
                                .await
                                .map_err(|e| PersistenceError::Storage(e.into()))?;

                        match existing_stream_id {
                            Some(_) => Err(PersistenceError::Concurrency {
                                stream_id: attempt.stream_id,
                                commit_sequence: attempt.commit_sequence,
                                existing_commit_id: attempt.commit_id,
                                attempted_commit_id: attempt.commit_id,
                            }),
                            None => Err(PersistenceError::DuplicateCommit {
                                stream_id: attempt.stream_id,
                                commit_sequence: attempt.commit_sequence,
                                existing_commit_id: attempt.commit_id,
                            }),
                        }
                    }
                }
            }
            Err(e) => Err(PersistenceError::Storage(e.into())),
        }
    }

    fn get_from_range(&self, stream_id: StreamId, min_revision: u64, max_revision: u64) -> CommitStream {
        let pool = self.pool.clone();
        Box::pin(async_stream::try_stream! {
            let rows: Vec<CommitRow> = sqlx::query_as(dialect::SELECT_COMMITS_BY_REVISION_RANGE)
                .bind(stream_id.as_uuid())
                .bind(min_revision as i64)
                .bind(max_revision as i64)
                .fetch_all(&pool)
                .await
                .map_err(|e| PersistenceError::Storage(e.into()))?;

            for row in rows {
                yield Commit::from(row);
            }
        })
    }

    fn get_from_stamp(&self, start: DateTime<Utc>) -> CommitStream {
        let pool = self.pool.clone();
        Box::pin(async_stream::try_stream! {
            let rows: Vec<CommitRow> = sqlx::query_as(dialect::SELECT_COMMITS_FROM_STAMP)
                .bind(start)
                .fetch_all(&pool)
                .await
                .map_err(|e| PersistenceError::Storage(e.into()))?;

            for row in rows {
                yield Commit::from(row);
            }
        })
    }

    fn get_undispatched(&self) -> CommitStream {
        let pool = self.pool.clone();
        Box::pin(async_stream::try_stream! {
            let rows: Vec<CommitRow> = sqlx::query_as(dialect::SELECT_UNDISPATCHED_COMMITS)
                .fetch_all(&pool)
                .await
                .map_err(|e| PersistenceError::Storage(e.into()))?;

            for row in rows {
                yield Commit::from(row);
            }
        })
    }

    async fn mark_dispatched(&self, stream_id: StreamId, commit_sequence: u64) -> Result<()> {
        sqlx::query(dialect::MARK_DISPATCHED)
            .bind(stream_id.as_uuid())
            .bind(commit_sequence as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::Storage(e.into()))?;

        Ok(())
    }

    async fn get_snapshot(&self, stream_id: StreamId, max_revision: u64) -> Result<Option<Snapshot>> {
        let row: Option<SnapshotRow> = sqlx::query_as(dialect::SELECT_LATEST_SNAPSHOT)
            .bind(stream_id.as_uuid())
            .bind(max_revision as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PersistenceError::Storage(e.into()))?;

        Ok(row.map(Snapshot::from))
    }

    async fn add_snapshot(&self, snapshot: Snapshot) -> Result<bool> {
        let result = sqlx::query(dialect::INSERT_SNAPSHOT)
            .bind(snapshot.stream_id.as_uuid())
            .bind(snapshot.stream_revision as i64)
            .bind(&snapshot.payload)
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::Storage(e.into()))?;

        let inserted = result.rows_affected() > 0;

        if inserted {
            self.maintainer.enqueue(HeadUpdate::SnapshotAdded {
                stream_id: snapshot.stream_id,
                revision: snapshot.stream_revision,
            });
        } else {
            debug!(
                stream_id = %snapshot.stream_id,
                revision = snapshot.stream_revision,
                "duplicate snapshot key, not written"
            );
        }

        Ok(inserted)
    }

    fn get_streams_to_snapshot(&self, max_threshold: u64) -> StreamHeadStream {
        let pool = self.pool.clone();
        Box::pin(async_stream::try_stream! {
            let rows: Vec<StreamHeadRow> = sqlx::query_as(dialect::SELECT_STREAMS_TO_SNAPSHOT)
                .bind(max_threshold as i64)
                .fetch_all(&pool)
                .await
                .map_err(|e| PersistenceError::Storage(e.into()))?;

            for row in rows {
                yield StreamHead::from(row);
            }
        })
    }
}
