//! Serialisation codecs for the generic encrypt/decrypt variant.
//!
//! A codec turns a value into the plaintext bytes that get encrypted, and
//! back. The only contract is the round trip: `decode(encode(v)) == v`.

use common::{EnvelopeError, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Reversible mapping between values and plaintext bytes.
pub trait Codec: Send + Sync {
    /// Serialise `value` to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Serialization`] if the value cannot be encoded.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    /// Deserialise a value from decrypted bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Serialization`] if the bytes are not a valid
    /// encoding of `T`.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON via `serde_json`. The default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value)
            .map_err(|e| EnvelopeError::Serialization(format!("failed to serialize value: {e}")))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes)
            .map_err(|e| EnvelopeError::Serialization(format!("failed to deserialize value: {e}")))
    }
}

/// Compact length-prefixed binary encoding via `bincode`.
///
/// Not self-describing: the decoding type must match the encoding type.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value)
            .map_err(|e| EnvelopeError::Serialization(format!("failed to serialize value: {e}")))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes)
            .map_err(|e| EnvelopeError::Serialization(format!("failed to deserialize value: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ErrorKind;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        user_id: u64,
        roles: Vec<String>,
        expires: Option<i64>,
    }

    fn session() -> Session {
        Session {
            user_id: 42,
            roles: vec!["admin".into(), "billing".into()],
            expires: None,
        }
    }

    #[test]
    fn json_round_trip() {
        let bytes = JsonCodec.encode(&session()).unwrap();
        assert_eq!(JsonCodec.decode::<Session>(&bytes).unwrap(), session());
    }

    #[test]
    fn bincode_round_trip() {
        let bytes = BincodeCodec.encode(&session()).unwrap();
        assert_eq!(BincodeCodec.decode::<Session>(&bytes).unwrap(), session());
    }

    #[test]
    fn json_encodes_unsized_str() {
        let bytes = JsonCodec.encode("hello").unwrap();
        assert_eq!(bytes, br#""hello""#);
    }

    #[test]
    fn json_rejects_non_string_map_keys() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], 1);
        let err = JsonCodec.encode(&map).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn decode_failures_are_serialization_errors() {
        let err = JsonCodec.decode::<Session>(b"hello").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);

        let err = BincodeCodec.decode::<Session>(&[1, 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }
}
