//! Wire protocol for wordrush.
//!
//! Defines the language clients and the server speak:
//!
//! - **Types** ([`Request`], [`Frame`], [`ClientEvent`], [`ServerEvent`],
//!   the id newtypes): the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how they become bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing that.
//!
//! The protocol layer sits between transport (raw frames) and the rooms
//! (game semantics). It knows nothing about connections, rosters, or
//! turns; it only fixes the JSON shapes both sides agree on.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, Frame, PlayerId, PlayerInfo, Recipient, Request, RoomCode,
    ServerEvent,
};
