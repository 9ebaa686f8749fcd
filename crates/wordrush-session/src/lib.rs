//! Player session tracking for wordrush.
//!
//! A session is the server-side record of one open connection: the
//! player's id, their display name, and the room they currently occupy.
//! It is created when the socket is accepted and torn down when the
//! socket closes, and it is the single source of truth for room
//! membership.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)  ← told to remove a player when their session closes
//!     ↕
//! Session Layer (this crate)  ← who is connected and where they are
//!     ↕
//! Protocol Layer (below)  ← provides PlayerId, RoomCode
//! ```

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::Session;
