//! Core protocol types for the wordrush wire format.
//!
//! Everything here travels on the wire as JSON. Client and server exchange
//! single-frame events: the client wraps a [`ClientEvent`] in a [`Request`]
//! (carrying a client-chosen `seq`), and the server answers with [`Frame`]s,
//! either replies (`replyTo` set to the request's `seq`) or pushed events
//! (no `replyTo`). Event tags are kebab-case, field names camelCase.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Player identity is the connection identifier: the server assigns it on
/// accept and announces it in the `welcome` event. Serialized as a plain
/// number (`#[serde(transparent)]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A room code: the short string players share to meet in the same room
/// (e.g. `"ABC123"`). Codes are client-chosen and treated verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Creates a room code from anything string-like.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

// ---------------------------------------------------------------------------
// Recipient: event fan-out targets
// ---------------------------------------------------------------------------

/// Specifies who should receive a server event.
///
/// The turn engine returns lists of `(Recipient, ServerEvent)` pairs; the
/// room actor fans each pair out to the matching player connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every player in the room.
    All,
    /// One specific player.
    Player(PlayerId),
    /// Everyone except the given player (e.g. "X is typing" goes to
    /// everyone but X).
    AllExcept(PlayerId),
}

// ---------------------------------------------------------------------------
// PlayerInfo: roster snapshots
// ---------------------------------------------------------------------------

/// One entry in a roster snapshot, as sent in `room-players` and
/// `game-started`. Ordered by join time wherever it appears in a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub lives: u8,
    pub is_spectator: bool,
}

// ---------------------------------------------------------------------------
// ClientEvent: everything a client can send
// ---------------------------------------------------------------------------

/// Events sent by clients.
///
/// On the wire the variant name becomes the kebab-case `type` tag and the
/// fields camelCase, e.g.:
///
/// ```text
/// {"type":"submit-word","roomId":"ABC123","word":"ring","timeRemaining":4.2}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Join (or create) the room with the given code.
    JoinRoom {
        room_id: RoomCode,
        player_name: String,
    },

    /// Leave the room.
    LeaveRoom { room_id: RoomCode },

    /// Start a game. Only honored for the room owner.
    StartGame { room_id: RoomCode },

    /// Forcibly end the running game. Only honored for the room owner;
    /// the winner is the player with the most lives left.
    EndGame { room_id: RoomCode },

    /// Submit a word for the current turn. `time_remaining <= 0` means
    /// the client's turn timer expired and the word is ignored.
    SubmitWord {
        room_id: RoomCode,
        word: String,
        time_remaining: f64,
    },

    /// Request a roster snapshot. Read-only.
    GetRoomPlayers { room_id: RoomCode },

    /// Live keystroke preview, relayed to the other players while it is
    /// the sender's turn. Fire-and-forget: no reply.
    PlayerTyping {
        room_id: RoomCode,
        input: String,
        time_remaining: f64,
    },
}

// ---------------------------------------------------------------------------
// ServerEvent: everything the server can send
// ---------------------------------------------------------------------------

/// Events sent by the server, both request replies and pushed updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Pushed once, immediately after the connection is accepted.
    /// Announces the identity this connection plays as.
    Welcome {
        player_id: PlayerId,
        protocol_version: u32,
    },

    // -- Room membership --
    /// To the joiner: you are now in this room.
    RoomJoined { room_id: RoomCode, is_owner: bool },

    /// To the leaver: you are no longer in this room.
    RoomLeft { room_id: RoomCode },

    /// To the rest of the room: someone joined.
    PlayerJoined { player_id: PlayerId },

    /// To the rest of the room: someone left.
    PlayerLeft { player_id: PlayerId },

    /// Full roster snapshot, pushed after every membership or status
    /// change and returned for `get-room-players`. `owner_id` is absent
    /// when the room does not exist.
    RoomPlayers {
        players: Vec<PlayerInfo>,
        owner_id: Option<PlayerId>,
    },

    // -- Game lifecycle --
    /// A game began: the roster (lives reset), the epoch-ms start time,
    /// the randomly chosen first player, and the first challenge.
    GameStarted {
        players: Vec<PlayerInfo>,
        start_time: u64,
        current_player: PlayerId,
        current_letters: String,
    },

    /// The turn moved on.
    NextTurn {
        current_player: PlayerId,
        current_letters: String,
    },

    /// A player ran out of time and lost a life (but is still in).
    PlayerLostLife { player_id: PlayerId, lives_left: u8 },

    /// A player's last life is gone; they are now a spectator.
    PlayerEliminated { player_id: PlayerId },

    /// The game is over. `winner` is absent when nobody survived.
    /// `scores` maps each player still present to their final lives.
    GameEnded {
        winner: Option<PlayerId>,
        scores: HashMap<PlayerId, u8>,
    },

    /// Relay of another player's in-progress typing.
    PlayerTypingUpdate {
        player_id: PlayerId,
        input: String,
        time_remaining: f64,
    },

    // -- Request replies --
    /// Reply to `join-room`.
    Joined { success: bool, is_owner: bool },

    /// Generic success/failure reply (`leave-room`, `start-game`,
    /// `end-game`, and malformed requests).
    Ack { success: bool },

    /// Reply to `submit-word`. `feedback` is human-readable: the
    /// rejection reason, or a confirmation on success.
    WordResult {
        correct: bool,
        feedback: String,
        lives_left: u8,
        is_eliminated: bool,
    },
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// A client request: a `seq` chosen by the client plus the event, flattened
/// into one JSON object:
///
/// ```text
/// {"seq":3,"type":"join-room","roomId":"ABC123","playerName":"ana"}
/// ```
///
/// The server sends at most one reply per `seq`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub seq: u64,
    #[serde(flatten)]
    pub event: ClientEvent,
}

impl Request {
    pub fn new(seq: u64, event: ClientEvent) -> Self {
        Self { seq, event }
    }
}

/// A server frame: an optional `replyTo` correlating it to a request, plus
/// the event, flattened. Pushed events omit `replyTo` entirely:
///
/// ```text
/// {"replyTo":3,"type":"joined","success":true,"isOwner":true}
/// {"type":"next-turn","currentPlayer":7,"currentLetters":"ing"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(
        rename = "replyTo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reply_to: Option<u64>,
    #[serde(flatten)]
    pub event: ServerEvent,
}

impl Frame {
    /// A pushed event with no request correlation.
    pub fn event(event: ServerEvent) -> Self {
        Self {
            reply_to: None,
            event,
        }
    }

    /// The reply to the request with the given `seq`.
    pub fn reply(seq: u64, event: ServerEvent) -> Self {
        Self {
            reply_to: Some(seq),
            event,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
