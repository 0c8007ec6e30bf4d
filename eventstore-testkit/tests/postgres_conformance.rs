//! Runs the conformance suite against the PostgreSQL backend.
//!
//! Ignored by default: set `DATABASE_URL` and run with `--ignored` to
//! exercise this against a real database.

use eventstore_core::PersistenceEngine;
use eventstore_postgres::PostgresEngine;
use eventstore_testkit::conformance;
use sqlx::postgres::PgPoolOptions;

async fn connect() -> PostgresEngine {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for this test");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database");
    let engine = PostgresEngine::new(pool);
    engine.initialize().await.expect("schema bootstrap succeeds");
    engine
}

#[tokio::test]
#[ignore]
async fn first_commit_on_new_stream() {
    let engine = connect().await;
    conformance::first_commit_on_new_stream(&engine).await;
}

#[tokio::test]
#[ignore]
async fn concurrency_collision() {
    let engine = connect().await;
    conformance::concurrency_collision(&engine).await;
}

#[tokio::test]
#[ignore]
async fn idempotent_retry() {
    let engine = connect().await;
    conformance::idempotent_retry(&engine).await;
}

#[tokio::test]
#[ignore]
async fn snapshot_selection() {
    let engine = connect().await;
    conformance::snapshot_selection(&engine).await;
}

#[tokio::test]
#[ignore]
async fn dispatch_cycle() {
    let engine = connect().await;
    conformance::dispatch_cycle(&engine).await;
}

#[tokio::test]
#[ignore]
async fn temporal_query() {
    let engine = connect().await;
    conformance::temporal_query(&engine).await;
}
