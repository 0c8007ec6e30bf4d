//! Serializer port: opaque byte <-> value conversion.
//!
//! The persistence core never inspects event or header payloads; it only
//! moves bytes produced and consumed by an implementation of
//! [`Serializer`]. This crate ships one concrete implementation,
//! [`JsonSerializer`], so the port has at least one exercised,
//! round-trip-tested backend.

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors raised while converting between values and their serialized form.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// The concrete serializer rejected the value or the bytes.
    #[error("serialization error: {0}")]
    Codec(String),
}

/// Opaque byte <-> value conversion, consumed by the persistence engine
/// for event payloads, commit headers, and snapshot payloads.
///
/// Implementations must round-trip: `deserialize(serialize(v)) == v` for
/// every `v` the caller can construct.
pub trait Serializer: Send + Sync {
    /// Serialize a value to an opaque byte sequence.
    fn serialize<T>(&self, value: &T) -> Result<Vec<u8>, SerializeError>
    where
        T: Serialize;

    /// Deserialize a value from a byte sequence previously produced by
    /// [`Serializer::serialize`].
    fn deserialize<T>(&self, bytes: &[u8]) -> Result<T, SerializeError>
    where
        T: DeserializeOwned;
}

/// JSON implementation of the [`Serializer`] port, backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize<T>(&self, value: &T) -> Result<Vec<u8>, SerializeError>
    where
        T: Serialize,
    {
        serde_json::to_vec(value).map_err(|e| SerializeError::Codec(e.to_string()))
    }

    fn deserialize<T>(&self, bytes: &[u8]) -> Result<T, SerializeError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(bytes).map_err(|e| SerializeError::Codec(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn json_round_trip_is_identity() {
        let serializer = JsonSerializer;
        let value = Sample {
            name: "widget".to_string(),
            count: 7,
        };

        let bytes = serializer.serialize(&value).unwrap();
        let restored: Sample = serializer.deserialize(&bytes).unwrap();

        assert_eq!(value, restored);
    }

    #[test]
    fn deserializing_garbage_is_a_codec_error() {
        let serializer = JsonSerializer;
        let result: Result<Sample, _> = serializer.deserialize(b"not json");
        assert!(matches!(result, Err(SerializeError::Codec(_))));
    }
}
