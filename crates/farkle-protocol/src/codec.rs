//! Codec trait and implementations for boundary serialization.
//!
//! The engine hands typed values across its boundary; whatever delivers
//! them to participants needs a way to turn them into bytes and back.
//! The [`Codec`] trait keeps that choice swappable — [`JsonCodec`] is the
//! provided implementation, and a binary codec can be added without
//! touching the rest of the engine.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back into values.
///
/// `Send + Sync + 'static` because codecs are shared across Tokio tasks.
/// `decode` requires `DeserializeOwned` so results never borrow the input
/// buffer.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Human-readable, so intents and snapshots can be inspected in logs and
/// browser devtools. Behind the default `json` feature.
///
/// ## Example
///
/// ```rust
/// use farkle_protocol::{Codec, Intent, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Intent::Roll).unwrap();
/// let decoded: Intent = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, Intent::Roll);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
