//! # Wordrush
//!
//! Realtime multiplayer word game server.
//!
//! Players join rooms by short code and take turns producing a word that
//! contains the current letter sequence before their timer runs out.
//! A timeout costs a life; the last player standing wins. Wordrush is
//! server-authoritative: rooms live in their own Tokio tasks, clients
//! speak a JSON WebSocket protocol, and this crate wires the layers
//! together: transport, protocol, sessions, rooms, dictionary.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wordrush::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), WordrushError> {
//!     let lexicon = Lexicon::load("words.txt", LexiconConfig::default())?;
//!     let server = WordrushServer::builder()
//!         .bind("0.0.0.0:8080")
//!         .build(Arc::new(lexicon))
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod server;

pub use error::WordrushError;
pub use server::{PROTOCOL_VERSION, WordrushServer, WordrushServerBuilder};

/// Everything needed to embed or talk to a wordrush server.
pub mod prelude {
    pub use crate::error::WordrushError;
    pub use crate::server::{PROTOCOL_VERSION, WordrushServer, WordrushServerBuilder};
    pub use wordrush_dict::{DictError, Dictionary, Lexicon, LexiconConfig};
    pub use wordrush_protocol::{
        ClientEvent, Codec, Frame, JsonCodec, PlayerId, PlayerInfo, ProtocolError, Request,
        RoomCode, ServerEvent,
    };
    pub use wordrush_room::{GameConfig, RoomError, RoomRegistry, WordOutcome};
    pub use wordrush_session::{SessionError, SessionManager};
    pub use wordrush_transport::{Connection, ConnectionId, Transport, TransportError};
}
