//! Opaque identifiers for streams and commits.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies a logical stream of commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamId(Uuid);

impl StreamId {
    /// Wrap an existing UUID as a stream identifier.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random stream identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Whether this id is the nil UUID (never valid for a real stream).
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for StreamId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Identifies a single commit, client-generated, globally unique per stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommitId(Uuid);

impl CommitId {
    /// Wrap an existing UUID as a commit identifier.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random commit identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Whether this id is the nil UUID (never valid for a real commit).
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CommitId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_ids_are_detected() {
        assert!(StreamId::new(Uuid::nil()).is_nil());
        assert!(CommitId::new(Uuid::nil()).is_nil());
        assert!(!StreamId::generate().is_nil());
    }

    #[test]
    fn display_matches_uuid_string() {
        let uuid = Uuid::new_v4();
        let id = StreamId::new(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }
}
