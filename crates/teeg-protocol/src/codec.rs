//! Turning messages into frame payloads and back.
//!
//! The server never touches a serialization format directly; it holds
//! something implementing [`Codec`]. [`JsonCodec`] is the only format
//! today and sits behind the `json` feature (on by default).

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because the codec lives in shared server state
/// and is used from every connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a frame payload.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Parses a frame payload.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] for malformed input or input that
    /// doesn't match `T`.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] speaking JSON, the format browser clients send.
///
/// ```rust
/// use teeg_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let msg: ClientMessage = JsonCodec
///     .decode(br#"{"type":"Ping","client_time":7}"#)
///     .unwrap();
/// assert_eq!(msg, ClientMessage::Ping { client_time: 7 });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
