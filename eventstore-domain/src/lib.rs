//! Event store domain layer.
//!
//! Pure data model for the persistence core: the `Commit` log entry, the
//! `Snapshot` sidecar, and the best-effort `StreamHead` summary. No I/O,
//! no storage-backend concerns — those live in `eventstore-core` and its
//! backend crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commit;
mod error;
mod ids;
mod snapshot;
mod stream_head;

pub use commit::Commit;
pub use error::DomainError;
pub use ids::{CommitId, StreamId};
pub use snapshot::Snapshot;
pub use stream_head::StreamHead;
