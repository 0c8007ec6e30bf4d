//! Event store persistence engine contract.
//!
//! Defines [`PersistenceEngine`], the abstract surface every storage
//! backend implements (`Commit`, `GetFrom`, snapshot and dispatch
//! operations), the shared concurrency-discrimination algorithm backends
//! call into on a uniqueness collision, the stream-head maintainer, and
//! one concrete backend — [`InMemoryEngine`] — for tests and local
//! development. The PostgreSQL backend lives in `eventstore-postgres`.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod concurrency;
mod engine;
mod error;
mod maintainer;
mod memory;

pub use concurrency::classify_unique_violation;
pub use engine::{CommitStream, PersistenceEngine, StreamHeadStream};
pub use error::{PersistenceError, Result};
pub use maintainer::{HeadSink, HeadUpdate, MaintainerHandle};
pub use memory::InMemoryEngine;
