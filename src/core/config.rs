//! Game configuration.
//!
//! Tunables a game variant fixes at startup: player and location counts,
//! the winning score, resource income, and the cleanup convergence cap.
//! The engine never hardcodes these; scenario builders provide them.

use serde::{Deserialize, Serialize};

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of players (2-255).
    pub player_count: usize,

    /// Number of battlefield locations.
    pub location_count: usize,

    /// Points needed to win.
    pub win_threshold: u32,

    /// Energy added by the Channel phase.
    pub channel_energy: u32,

    /// Command added by the Channel phase.
    pub channel_command: u32,

    /// Energy cost of the optional Action-phase draw.
    pub draw_cost: u32,

    /// Cards drawn into the opening hand.
    pub starting_hand_size: usize,

    /// Hard cap on cleanup passes before declaring divergence.
    pub max_cleanup_passes: u32,
}

impl GameConfig {
    /// Create a configuration with standard tunables.
    #[must_use]
    pub fn new(player_count: usize, location_count: usize) -> Self {
        assert!(player_count >= 2, "Must have at least 2 players");
        assert!(player_count <= 255, "At most 255 players supported");
        assert!(location_count >= 1, "Must have at least 1 location");

        Self {
            player_count,
            location_count,
            win_threshold: 8,
            channel_energy: 3,
            channel_command: 1,
            draw_cost: 2,
            starting_hand_size: 4,
            max_cleanup_passes: 32,
        }
    }

    /// Set the winning score.
    #[must_use]
    pub fn with_win_threshold(mut self, threshold: u32) -> Self {
        self.win_threshold = threshold;
        self
    }

    /// Set per-turn resource income.
    #[must_use]
    pub fn with_income(mut self, energy: u32, command: u32) -> Self {
        self.channel_energy = energy;
        self.channel_command = command;
        self
    }

    /// Set the opening hand size.
    #[must_use]
    pub fn with_starting_hand(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }

    /// Set the cleanup convergence cap.
    #[must_use]
    pub fn with_cleanup_cap(mut self, passes: u32) -> Self {
        self.max_cleanup_passes = passes;
        self
    }
}
