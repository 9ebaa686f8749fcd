//! Unified error type for the wordrush server.

use wordrush_dict::DictError;
use wordrush_protocol::ProtocolError;
use wordrush_room::RoomError;
use wordrush_session::SessionError;
use wordrush_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When embedding the `wordrush` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WordrushError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid frame).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (unknown player, duplicate connection).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (room gone, actor unreachable).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A word-list error (unreadable, empty, no usable sequences).
    #[error(transparent)]
    Dict(#[from] DictError),
}
