//! The session manager: tracks every open connection.
//!
//! Room membership lives here, not in the room layer. When a client
//! event arrives carrying a room id, the handler checks it against the
//! session record; when a connection drops, the record says which room
//! to clean up. Keeping that truth in one place means a player can
//! never be "in" two rooms at once.
//!
//! # Concurrency note
//!
//! `SessionManager` is not thread-safe by itself. The server owns one
//! instance behind a mutex and every connection task goes through it.

use std::collections::HashMap;

use wordrush_protocol::{PlayerId, RoomCode};

use crate::{Session, SessionError};

/// Registry of all open sessions, keyed by player id.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
}

impl SessionManager {
    /// Creates an empty session manager.
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Opens a session for a newly accepted connection.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyConnected`] if the player already
    /// has a session. Connection ids are never reused while a socket is
    /// open, so this indicates a bug in the caller.
    pub fn create(&mut self, player_id: PlayerId) -> Result<&Session, SessionError> {
        if self.sessions.contains_key(&player_id) {
            return Err(SessionError::AlreadyConnected(player_id));
        }
        tracing::info!(%player_id, "session opened");
        Ok(self
            .sessions
            .entry(player_id)
            .or_insert_with(|| Session::new(player_id)))
    }

    /// Looks up a session by player id.
    pub fn get(&self, player_id: &PlayerId) -> Option<&Session> {
        self.sessions.get(player_id)
    }

    /// Records the player's display name.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no session exists.
    pub fn set_name(&mut self, player_id: PlayerId, name: &str) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        session.name = Some(name.to_string());
        Ok(())
    }

    /// Records which room the player occupies. `None` clears it.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no session exists.
    pub fn set_room(
        &mut self,
        player_id: PlayerId,
        room: Option<RoomCode>,
    ) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        session.room = room;
        Ok(())
    }

    /// The room the player currently occupies, if any.
    pub fn room_of(&self, player_id: &PlayerId) -> Option<RoomCode> {
        self.sessions.get(player_id).and_then(|s| s.room.clone())
    }

    /// Closes a session, returning the final record so the caller can
    /// clean up room membership.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no session exists.
    pub fn remove(&mut self, player_id: PlayerId) -> Result<Session, SessionError> {
        let session = self
            .sessions
            .remove(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        tracing::info!(%player_id, "session closed");
        Ok(session)
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
