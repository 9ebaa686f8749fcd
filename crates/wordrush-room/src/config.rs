//! Game configuration.

use serde::{Deserialize, Serialize};

/// Settings for the games a room runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameConfig {
    /// Lives each player holds at game start.
    pub starting_lives: u8,

    /// Minimum players required to start a game.
    pub min_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_lives: 2,
            min_players: 2,
        }
    }
}
