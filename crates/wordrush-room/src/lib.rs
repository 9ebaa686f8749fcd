//! Rooms and games for wordrush.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its
//! roster and, while a game is running, the turn state. The registry
//! creates rooms on demand and destroys them when they empty.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: room code → actor handle; create/join/leave
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`WordOutcome`]: verdict returned for a word submission
//! - [`GameConfig`]: starting lives, minimum players

mod config;
mod error;
mod registry;
mod room;
mod roster;
mod turn;

pub use config::GameConfig;
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{JoinOutcome, LeaveOutcome, PlayerSender, RoomHandle};
pub use turn::WordOutcome;
