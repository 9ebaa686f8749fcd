//! Codec trait and implementations for serializing wire frames.
//!
//! The rest of the server never calls `serde_json` directly: it goes
//! through the [`Codec`] trait, so the wire format can be swapped (a
//! compact binary codec, say) without touching the handler or rooms.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Converts protocol types to and from raw bytes.
///
/// `Send + Sync + 'static` because one codec instance is shared across
/// every connection handler task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that speaks JSON via `serde_json`.
///
/// JSON keeps frames readable in browser dev tools, which is what the
/// game clients live in. Behind the `json` feature flag (on by default).
///
/// ## Example
///
/// ```rust
/// use wordrush_protocol::{Codec, Frame, JsonCodec, PlayerId, ServerEvent};
///
/// let codec = JsonCodec;
/// let frame = Frame::event(ServerEvent::PlayerEliminated {
///     player_id: PlayerId(4),
/// });
///
/// let bytes = codec.encode(&frame).unwrap();
/// let decoded: Frame = codec.decode(&bytes).unwrap();
/// assert_eq!(frame, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
