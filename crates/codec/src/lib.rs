//! Self-describing compressed encoding for `Value`.
//!
//! ## Envelope format
//!
//! ```text
//! [version: u8][zstd-compressed rmp-serde payload]
//! ```
//!
//! - **version**: format discriminator. A decoder that doesn't recognize
//!   it refuses the blob rather than guessing at its shape.
//! - **payload**: the `Value` serialized with `rmp-serde` (MessagePack),
//!   then compressed with `zstd` at the configured level.
//!
//! Encoding is deterministic for a given `Value` on a given host/codec
//! version, but the blob is only meant to be read back by a process using
//! a compatible codec — it is not a cross-version wire format.
//!
//! Decoding untrusted bytes is unsafe: a corrupt-but-self-consistent blob
//! can still deserialize into an unexpected (but well-typed) `Value`. No
//! authenticated variant is offered here.

use granary_core::Value;
use thiserror::Error;

/// Current envelope version. Bump when the payload format changes in a
/// way that breaks older decoders.
const VERSION: u8 = 1;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("refused to decode: unknown envelope version {0}")]
    UnknownVersion(u8),

    #[error("refused to decode: empty blob")]
    EmptyBlob,

    #[error("decompression failed: {0}")]
    Decompress(#[from] std::io::Error),

    #[error("deserialization failed: {0}")]
    Deserialize(#[from] rmp_serde::decode::Error),

    #[error("serialization failed: {0}")]
    Serialize(#[from] rmp_serde::encode::Error),
}

/// Compression level, 1 (fastest, least compression) to 9 (slowest, most).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    pub fn new(level: u8) -> Option<Self> {
        (1..=9).contains(&level).then_some(Self(level))
    }

    pub fn get(self) -> i32 {
        self.0 as i32
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self(7)
    }
}

/// Encode a value into a self-describing, compressed byte sequence.
pub fn encode(value: &Value, level: CompressionLevel) -> Result<Vec<u8>, CodecError> {
    let packed = rmp_serde::to_vec(value)?;
    let compressed = zstd::stream::encode_all(&packed[..], level.get())?;
    let mut out = Vec::with_capacity(compressed.len() + 1);
    out.push(VERSION);
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Inverse of [`encode`]. Refuses blobs with an unrecognized version tag.
pub fn decode(bytes: &[u8]) -> Result<Value, CodecError> {
    let (&version, rest) = bytes.split_first().ok_or(CodecError::EmptyBlob)?;
    if version != VERSION {
        return Err(CodecError::UnknownVersion(version));
    }
    let packed = zstd::stream::decode_all(rest)?;
    let value = rmp_serde::from_slice(&packed)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn roundtrip(v: Value) {
        let bytes = encode(&v, CompressionLevel::default()).unwrap();
        let back = decode(&bytes).unwrap();
        assert_eq!(v, back);
    }

    #[test]
    fn roundtrips_scalars() {
        roundtrip(Value::Null);
        roundtrip(Value::Bool(true));
        roundtrip(Value::Int(-42));
        roundtrip(Value::Float(3.25));
        roundtrip(Value::Str("agent007".into()));
        roundtrip(Value::Bytes(vec![0, 1, 2, 255]));
    }

    #[test]
    fn roundtrips_nested_collections() {
        let mut set = BTreeSet::new();
        set.insert(Value::Int(1));
        set.insert(Value::Str("x".into()));

        let mut map = BTreeMap::new();
        map.insert(Value::Str("key".into()), Value::Seq(vec![Value::Int(1), Value::Int(2)]));

        roundtrip(Value::Seq(vec![Value::Set(set), Value::Map(map), Value::Null]));
    }

    #[test]
    fn refuses_unknown_version() {
        let mut bytes = encode(&Value::Int(1), CompressionLevel::default()).unwrap();
        bytes[0] = 0xFF;
        assert!(matches!(decode(&bytes), Err(CodecError::UnknownVersion(0xFF))));
    }

    #[test]
    fn refuses_empty_blob() {
        assert!(matches!(decode(&[]), Err(CodecError::EmptyBlob)));
    }

    #[test]
    fn compression_shrinks_repetitive_payloads() {
        let big = Value::Str("x".repeat(10_000));
        let bytes = encode(&big, CompressionLevel::default()).unwrap();
        assert!(bytes.len() < 10_000 / 4);
    }

    #[test]
    fn compression_level_rejects_out_of_range() {
        assert!(CompressionLevel::new(0).is_none());
        assert!(CompressionLevel::new(10).is_none());
        assert!(CompressionLevel::new(7).is_some());
    }
}
