//! Error types for the session layer.

use wordrush_protocol::PlayerId;

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given player. Seen when an operation
    /// races with disconnect cleanup.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// The player already has an open session. A connection gets
    /// exactly one.
    #[error("player {0} already has an active session")]
    AlreadyConnected(PlayerId),
}
