//! Room registry: creates rooms on demand, routes operations to their
//! actors, and destroys rooms the moment they empty out.

use std::collections::HashMap;
use std::sync::Arc;

use wordrush_dict::Dictionary;
use wordrush_protocol::{PlayerId, PlayerInfo, RoomCode};

use crate::room::{spawn_room, JoinOutcome, PlayerSender, RoomHandle};
use crate::turn::WordOutcome;
use crate::{GameConfig, RoomError};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// All live rooms, keyed by room code.
///
/// Rooms come into existence when the first player joins a code and are
/// torn down when the last player leaves. Absent rooms never fail a
/// read: snapshots come back empty and submissions come back rejected,
/// as the protocol promises.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, RoomHandle>,
    config: GameConfig,
    dict: Arc<dyn Dictionary>,
}

impl RoomRegistry {
    pub fn new(config: GameConfig, dict: Arc<dyn Dictionary>) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
            dict,
        }
    }

    /// Puts a player in the room with the given code, creating the room
    /// if it does not exist yet (the creator becomes owner).
    ///
    /// A player occupies at most one room: when `previous` names a
    /// different room, the player leaves it first with full leave
    /// semantics.
    pub async fn create_or_join(
        &mut self,
        code: &RoomCode,
        player_id: PlayerId,
        name: &str,
        sender: PlayerSender,
        previous: Option<RoomCode>,
    ) -> Result<JoinOutcome, RoomError> {
        if let Some(prev) = previous {
            if prev != *code {
                self.leave(&prev, player_id).await;
            }
        }

        let handle = match self.rooms.get(code) {
            Some(handle) => handle.clone(),
            None => {
                let handle = spawn_room(
                    code.clone(),
                    self.config,
                    Arc::clone(&self.dict),
                    DEFAULT_CHANNEL_SIZE,
                );
                self.rooms.insert(code.clone(), handle.clone());
                tracing::info!(room = %code, "room created");
                handle
            }
        };

        match handle.join(player_id, name.to_string(), sender).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                // The actor is gone; drop the stale handle so the next
                // join recreates the room.
                self.rooms.remove(code);
                Err(err)
            }
        }
    }

    /// Removes a player from a room. Returns `false` when the room or
    /// the membership does not exist. An emptied room is destroyed.
    pub async fn leave(&mut self, code: &RoomCode, player_id: PlayerId) -> bool {
        let Some(handle) = self.rooms.get(code) else {
            return false;
        };

        match handle.leave(player_id).await {
            Ok(outcome) => {
                if outcome.now_empty {
                    self.destroy(code).await;
                }
                outcome.removed
            }
            Err(_) => {
                self.rooms.remove(code);
                false
            }
        }
    }

    /// Starts a game on the owner's behalf. `false` when the room is
    /// absent, the requester is not its owner, a game is already
    /// running, or too few players are present.
    pub async fn start(&self, code: &RoomCode, player_id: PlayerId) -> bool {
        match self.rooms.get(code) {
            Some(handle) => handle.start(player_id).await.unwrap_or(false),
            None => false,
        }
    }

    /// Forcibly ends a running game on the owner's behalf.
    pub async fn force_end(&self, code: &RoomCode, player_id: PlayerId) -> bool {
        match self.rooms.get(code) {
            Some(handle) => handle.force_end(player_id).await.unwrap_or(false),
            None => false,
        }
    }

    /// Judges a word submission. Absent rooms reject rather than error.
    pub async fn submit(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        word: String,
        out_of_time: bool,
    ) -> WordOutcome {
        match self.rooms.get(code) {
            Some(handle) => handle
                .submit(player_id, word, out_of_time)
                .await
                .unwrap_or_else(|_| WordOutcome::rejected("room not found", 0, false)),
            None => WordOutcome::rejected("room not found", 0, false),
        }
    }

    /// Relays typing to the room, if it exists. Fire-and-forget.
    pub async fn typing(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        input: String,
        time_remaining: f64,
    ) {
        if let Some(handle) = self.rooms.get(code) {
            let _ = handle.typing(player_id, input, time_remaining).await;
        }
    }

    /// Roster snapshot for a room; empty when the room does not exist.
    pub async fn snapshot(&self, code: &RoomCode) -> (Vec<PlayerInfo>, Option<PlayerId>) {
        match self.rooms.get(code) {
            Some(handle) => handle.snapshot().await.unwrap_or((Vec::new(), None)),
            None => (Vec::new(), None),
        }
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    async fn destroy(&mut self, code: &RoomCode) {
        if let Some(handle) = self.rooms.remove(code) {
            let _ = handle.shutdown().await;
            tracing::info!(room = %code, "room destroyed");
        }
    }
}
