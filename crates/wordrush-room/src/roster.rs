//! Room membership: who is in the room and who owns it.

use wordrush_protocol::{PlayerId, PlayerInfo, ServerEvent};

/// One member of a room.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub lives: u8,
    pub spectator: bool,
}

/// The member list of one room, ordered by join time.
///
/// A `Vec` keeps insertion order, which the protocol exposes directly:
/// roster snapshots list players by join time, and ownership falls back
/// to the earliest remaining member when the owner leaves.
#[derive(Debug, Default)]
pub struct Roster {
    players: Vec<Player>,
    owner: Option<PlayerId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player, or refreshes the name of an existing member.
    ///
    /// An existing member keeps their lives and spectator status, so
    /// rejoining mid-game does not undo an elimination. The first player
    /// ever added becomes owner. Returns whether the player was newly
    /// added.
    pub fn join(&mut self, id: PlayerId, name: &str, lives: u8, spectator: bool) -> bool {
        if let Some(existing) = self.get_mut(id) {
            existing.name = name.to_string();
            return false;
        }
        self.players.push(Player {
            id,
            name: name.to_string(),
            lives,
            spectator,
        });
        if self.owner.is_none() {
            self.owner = Some(id);
        }
        true
    }

    /// Removes a player, reassigning ownership if the owner left.
    ///
    /// Ownership goes to the earliest-joined remaining non-spectator,
    /// falling back to the earliest-joined member of any kind. Returns
    /// whether the player was a member.
    pub fn remove(&mut self, id: PlayerId) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != id);
        if self.players.len() == before {
            return false;
        }
        if self.owner == Some(id) {
            self.owner = self
                .players
                .iter()
                .find(|p| !p.spectator)
                .or_else(|| self.players.first())
                .map(|p| p.id);
        }
        true
    }

    /// Resets every member for a fresh game: full lives, nobody
    /// spectating.
    pub fn reset_for_game(&mut self, starting_lives: u8) {
        for player in &mut self.players {
            player.lives = starting_lives;
            player.spectator = false;
        }
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    pub fn is_owner(&self, id: PlayerId) -> bool {
        self.owner == Some(id)
    }

    /// Member ids in join order.
    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    /// Snapshot of every member, in join order.
    pub fn infos(&self) -> Vec<PlayerInfo> {
        self.players
            .iter()
            .map(|p| PlayerInfo {
                id: p.id,
                name: p.name.clone(),
                lives: p.lives,
                is_spectator: p.spectator,
            })
            .collect()
    }

    /// The `room-players` event describing the current roster.
    pub fn snapshot_event(&self) -> ServerEvent {
        ServerEvent::RoomPlayers {
            players: self.infos(),
            owner_id: self.owner(),
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    #[test]
    fn test_join_first_player_becomes_owner() {
        let mut roster = Roster::new();

        let added = roster.join(pid(1), "ana", 2, false);

        assert!(added);
        assert_eq!(roster.owner(), Some(pid(1)));
        assert!(roster.is_owner(pid(1)));
    }

    #[test]
    fn test_join_second_player_keeps_owner() {
        let mut roster = Roster::new();
        roster.join(pid(1), "ana", 2, false);

        roster.join(pid(2), "ben", 2, false);

        assert_eq!(roster.owner(), Some(pid(1)));
        assert!(!roster.is_owner(pid(2)));
    }

    #[test]
    fn test_join_preserves_join_order() {
        let mut roster = Roster::new();
        roster.join(pid(3), "c", 2, false);
        roster.join(pid(1), "a", 2, false);
        roster.join(pid(2), "b", 2, false);

        assert_eq!(roster.ids(), vec![pid(3), pid(1), pid(2)]);
    }

    #[test]
    fn test_join_existing_member_refreshes_name_only() {
        // Rejoining must not reset game state: a player who lost lives
        // keeps that loss.
        let mut roster = Roster::new();
        roster.join(pid(1), "ana", 2, false);
        roster.get_mut(pid(1)).unwrap().lives = 1;

        let added = roster.join(pid(1), "ana2", 2, false);

        assert!(!added, "existing member is not a new join");
        let player = roster.get(pid(1)).unwrap();
        assert_eq!(player.name, "ana2");
        assert_eq!(player.lives, 1, "lives must survive a rejoin");
    }

    #[test]
    fn test_remove_missing_player_returns_false() {
        let mut roster = Roster::new();
        roster.join(pid(1), "ana", 2, false);

        assert!(!roster.remove(pid(99)));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_remove_owner_reassigns_to_earliest_non_spectator() {
        let mut roster = Roster::new();
        roster.join(pid(1), "ana", 2, false);
        roster.join(pid(2), "ben", 2, false);
        roster.join(pid(3), "cy", 2, false);
        roster.get_mut(pid(2)).unwrap().spectator = true;

        assert!(roster.remove(pid(1)));

        // pid(2) joined earlier but spectates, so pid(3) takes over.
        assert_eq!(roster.owner(), Some(pid(3)));
    }

    #[test]
    fn test_remove_owner_falls_back_to_spectator() {
        let mut roster = Roster::new();
        roster.join(pid(1), "ana", 2, false);
        roster.join(pid(2), "ben", 0, true);

        roster.remove(pid(1));

        assert_eq!(roster.owner(), Some(pid(2)));
    }

    #[test]
    fn test_remove_non_owner_keeps_owner() {
        let mut roster = Roster::new();
        roster.join(pid(1), "ana", 2, false);
        roster.join(pid(2), "ben", 2, false);

        roster.remove(pid(2));

        assert_eq!(roster.owner(), Some(pid(1)));
    }

    #[test]
    fn test_remove_last_player_clears_owner() {
        let mut roster = Roster::new();
        roster.join(pid(1), "ana", 2, false);

        roster.remove(pid(1));

        assert!(roster.is_empty());
        assert_eq!(roster.owner(), None);
    }

    #[test]
    fn test_reset_for_game_restores_lives_and_clears_spectators() {
        let mut roster = Roster::new();
        roster.join(pid(1), "ana", 2, false);
        roster.join(pid(2), "ben", 0, true);
        roster.get_mut(pid(1)).unwrap().lives = 0;

        roster.reset_for_game(2);

        for info in roster.infos() {
            assert_eq!(info.lives, 2);
            assert!(!info.is_spectator);
        }
    }

    #[test]
    fn test_snapshot_event_carries_players_and_owner() {
        let mut roster = Roster::new();
        roster.join(pid(1), "ana", 2, false);
        roster.join(pid(2), "ben", 2, false);

        match roster.snapshot_event() {
            ServerEvent::RoomPlayers { players, owner_id } => {
                assert_eq!(players.len(), 2);
                assert_eq!(owner_id, Some(pid(1)));
            }
            other => panic!("expected room-players, got {other:?}"),
        }
    }

    #[test]
    fn test_infos_reflect_current_state() {
        let mut roster = Roster::new();
        roster.join(pid(1), "ana", 2, false);
        roster.join(pid(2), "ben", 0, true);

        let infos = roster.infos();

        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].id, pid(1));
        assert_eq!(infos[0].name, "ana");
        assert!(!infos[0].is_spectator);
        assert_eq!(infos[1].lives, 0);
        assert!(infos[1].is_spectator);
    }
}
