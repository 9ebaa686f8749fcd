//! The per-connection session record.

use wordrush_protocol::{PlayerId, RoomCode};

/// The server's record of one connected player.
///
/// A session exists exactly as long as the underlying connection: it is
/// created when the socket is accepted and removed when the socket
/// closes. The `room` field is the authoritative answer to "which room
/// is this player in" and is what disconnect cleanup consults.
#[derive(Debug, Clone)]
pub struct Session {
    /// Which player this session belongs to.
    pub player_id: PlayerId,

    /// Display name, set by the first join request. `None` until the
    /// player has joined a room at least once.
    pub name: Option<String>,

    /// The room this player currently occupies, if any.
    pub room: Option<RoomCode>,
}

impl Session {
    pub(crate) fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            name: None,
            room: None,
        }
    }
}
