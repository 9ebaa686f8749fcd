//! Error types for the room layer.

use wordrush_protocol::RoomCode;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room's command channel is closed; its actor is gone.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
