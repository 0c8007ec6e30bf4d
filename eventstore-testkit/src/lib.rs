//! Backend-agnostic conformance suite for [`eventstore_core::PersistenceEngine`]
//! implementations, plus fixture builders for constructing test commits
//! and snapshots.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod conformance;
pub mod fixtures;
