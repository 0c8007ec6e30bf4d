//! The PostgreSQL storage dialect.
//!
//! Centralizes the schema DDL and the parameterised SQL for every engine
//! operation. `sqlx::Transaction`'s `Drop` impl already rolls back an
//! uncommitted transaction, so no separate resource-chain type is
//! introduced — each operation below opens its own short-lived
//! transaction rather than an ambient one.

/// Idempotent schema bootstrap. Safe to run on every process start;
/// `IF NOT EXISTS` makes a second run a no-op rather than an error.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS commits (
    id                          BIGSERIAL PRIMARY KEY,
    stream_id                   UUID NOT NULL,
    commit_id                   UUID NOT NULL,
    commit_sequence             BIGINT NOT NULL,
    starting_stream_revision    BIGINT NOT NULL,
    stream_revision             BIGINT NOT NULL,
    commit_stamp                TIMESTAMPTZ NOT NULL,
    headers                     BYTEA NOT NULL,
    payload                     BYTEA NOT NULL,
    dispatched                  BOOLEAN NOT NULL DEFAULT FALSE,
    CONSTRAINT commits_stream_sequence_key UNIQUE (stream_id, commit_sequence),
    CONSTRAINT commits_stream_revision_key UNIQUE (stream_id, stream_revision),
    CONSTRAINT commits_commit_id_key UNIQUE (commit_id)
);

CREATE INDEX IF NOT EXISTS commits_commit_stamp_idx ON commits (commit_stamp);
CREATE INDEX IF NOT EXISTS commits_dispatched_idx ON commits (dispatched, commit_stamp);
CREATE INDEX IF NOT EXISTS commits_stream_revision_range_idx
    ON commits (stream_id, starting_stream_revision, stream_revision);

CREATE TABLE IF NOT EXISTS snapshots (
    stream_id       UUID NOT NULL,
    stream_revision BIGINT NOT NULL,
    payload         BYTEA NOT NULL,
    PRIMARY KEY (stream_id, stream_revision)
);

CREATE INDEX IF NOT EXISTS snapshots_stream_revision_desc_idx
    ON snapshots (stream_id, stream_revision DESC);

CREATE TABLE IF NOT EXISTS stream_heads (
    stream_id         UUID PRIMARY KEY,
    head_revision     BIGINT NOT NULL,
    snapshot_revision BIGINT NOT NULL DEFAULT 0,
    snapshot_age      BIGINT GENERATED ALWAYS AS (head_revision - snapshot_revision) STORED
);

CREATE INDEX IF NOT EXISTS stream_heads_snapshot_age_idx ON stream_heads (snapshot_age);
"#;

/// Insert one commit. Relies on the unique constraints in [`SCHEMA`] to
/// surface uniqueness collisions; a Postgres error code `23505` is the
/// signal the engine layer watches for.
pub const INSERT_COMMIT: &str = r#"
INSERT INTO commits (
    stream_id, commit_id, commit_sequence, starting_stream_revision,
    stream_revision, commit_stamp, headers, payload, dispatched
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE)
"#;

/// Read back the commit at the deterministic key used by the
/// concurrency-discrimination algorithm.
pub const SELECT_COMMIT_BY_KEY: &str = r#"
SELECT commit_id FROM commits WHERE stream_id = $1 AND commit_sequence = $2
"#;

/// Read back the stream a given `commit_id` already landed on, to detect
/// a collision against the global `commit_id` uniqueness constraint
/// rather than the `(stream_id, commit_sequence)` one.
pub const SELECT_STREAM_BY_COMMIT_ID: &str = r#"
SELECT stream_id FROM commits WHERE commit_id = $1
"#;

/// `GetFrom(streamId, minRevision, maxRevision)`.
pub const SELECT_COMMITS_BY_REVISION_RANGE: &str = r#"
SELECT stream_id, commit_id, commit_sequence, starting_stream_revision,
       stream_revision, commit_stamp, headers, payload, dispatched
FROM commits
WHERE stream_id = $1 AND starting_stream_revision <= $3 AND stream_revision >= $2
ORDER BY starting_stream_revision ASC
"#;

/// `GetFrom(start)`: all commits across all streams, ascending stamp.
pub const SELECT_COMMITS_FROM_STAMP: &str = r#"
SELECT stream_id, commit_id, commit_sequence, starting_stream_revision,
       stream_revision, commit_stamp, headers, payload, dispatched
FROM commits
WHERE commit_stamp >= $1
ORDER BY commit_stamp ASC
"#;

/// `GetUndispatchedCommits()`.
pub const SELECT_UNDISPATCHED_COMMITS: &str = r#"
SELECT stream_id, commit_id, commit_sequence, starting_stream_revision,
       stream_revision, commit_stamp, headers, payload, dispatched
FROM commits
WHERE dispatched = FALSE
ORDER BY commit_stamp ASC
"#;

/// `MarkCommitAsDispatched(commit)`. `WHERE dispatched = FALSE` makes the
/// statement itself idempotent: a second call matches zero rows instead
/// of erroring.
pub const MARK_DISPATCHED: &str = r#"
UPDATE commits SET dispatched = TRUE
WHERE stream_id = $1 AND commit_sequence = $2 AND dispatched = FALSE
"#;

/// `GetSnapshot(streamId, maxRevision)`: greatest revision not exceeding
/// the bound, via the `(stream_id, stream_revision DESC)` index.
pub const SELECT_LATEST_SNAPSHOT: &str = r#"
SELECT stream_id, stream_revision, payload
FROM snapshots
WHERE stream_id = $1 AND stream_revision <= $2
ORDER BY stream_revision DESC
LIMIT 1
"#;

/// `AddSnapshot(snapshot)`. Duplicate `(stream_id, stream_revision)`
/// keys are absorbed by `ON CONFLICT DO NOTHING` rather than raising.
pub const INSERT_SNAPSHOT: &str = r#"
INSERT INTO snapshots (stream_id, stream_revision, payload)
VALUES ($1, $2, $3)
ON CONFLICT (stream_id, stream_revision) DO NOTHING
"#;

/// Stream-head upsert used by the maintainer after a commit. Last-write-
/// wins, no monotonicity check.
pub const UPSERT_HEAD_REVISION: &str = r#"
INSERT INTO stream_heads (stream_id, head_revision, snapshot_revision)
VALUES ($1, $2, 0)
ON CONFLICT (stream_id) DO UPDATE SET head_revision = EXCLUDED.head_revision
"#;

/// Stream-head upsert used by the maintainer after a snapshot append.
pub const UPSERT_HEAD_SNAPSHOT_REVISION: &str = r#"
INSERT INTO stream_heads (stream_id, head_revision, snapshot_revision)
VALUES ($1, $2, $2)
ON CONFLICT (stream_id) DO UPDATE SET snapshot_revision = EXCLUDED.snapshot_revision
"#;

/// `GetStreamsToSnapshot(maxThreshold)`.
pub const SELECT_STREAMS_TO_SNAPSHOT: &str = r#"
SELECT stream_id, head_revision, snapshot_revision
FROM stream_heads
WHERE snapshot_age >= $1
"#;
