//! Runs the conformance suite against the in-memory backend.

use eventstore_core::InMemoryEngine;
use eventstore_testkit::conformance;

#[tokio::test]
async fn first_commit_on_new_stream() {
    let engine = InMemoryEngine::new();
    conformance::first_commit_on_new_stream(&engine).await;
}

#[tokio::test]
async fn concurrency_collision() {
    let engine = InMemoryEngine::new();
    conformance::concurrency_collision(&engine).await;
}

#[tokio::test]
async fn idempotent_retry() {
    let engine = InMemoryEngine::new();
    conformance::idempotent_retry(&engine).await;
}

#[tokio::test]
async fn snapshot_selection() {
    let engine = InMemoryEngine::new();
    conformance::snapshot_selection(&engine).await;
}

#[tokio::test]
async fn dispatch_cycle() {
    let engine = InMemoryEngine::new();
    conformance::dispatch_cycle(&engine).await;
}

#[tokio::test]
async fn temporal_query() {
    let engine = InMemoryEngine::new();
    conformance::temporal_query(&engine).await;
}
