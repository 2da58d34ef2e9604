//! Game configuration.
//!
//! `GameConfig` carries the table-level settings a game is created with.
//! `PlayerOptions` carries the per-player preferences that change how
//! prompts are presented (never what the rules allow).

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use crate::error::{Result, RulesError};

/// Per-player interface preferences.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerOptions {
    /// Always show the action menu, even when a card has a single legal
    /// action.
    pub confirm_one_click: bool,
}

impl PlayerOptions {
    #[must_use]
    pub fn with_confirm_one_click(mut self, confirm: bool) -> Self {
        self.confirm_one_click = confirm;
        self
    }
}

/// Configuration for a game.
///
/// ```
/// use ashes_rules::core::{GameConfig, PlayerId};
///
/// let config = GameConfig::new(2)
///     .with_first_player(PlayerId::new(1))
///     .with_seed(7);
/// assert_eq!(config.player_count, 2);
/// assert_eq!(config.dice_per_player, 10);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of seated players.
    pub player_count: usize,
    /// Player who takes the first turn of the first round.
    pub first_player: PlayerId,
    /// Dice rolled into each player's pool every round.
    pub dice_per_player: usize,
    /// Enables the manual token menu on card summaries.
    pub manual_mode: bool,
    /// Table-wide default for `PlayerOptions::confirm_one_click`.
    pub confirm_one_click: bool,
    /// Seed for the deterministic dice RNG.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(2)
    }
}

impl GameConfig {
    /// Create a configuration for the given number of players.
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            first_player: PlayerId::new(0),
            dice_per_player: 10,
            manual_mode: false,
            confirm_one_click: false,
            seed: 0,
        }
    }

    #[must_use]
    pub fn with_first_player(mut self, player: PlayerId) -> Self {
        self.first_player = player;
        self
    }

    #[must_use]
    pub fn with_dice_per_player(mut self, count: usize) -> Self {
        self.dice_per_player = count;
        self
    }

    #[must_use]
    pub fn with_manual_mode(mut self, manual: bool) -> Self {
        self.manual_mode = manual;
        self
    }

    #[must_use]
    pub fn with_confirm_one_click(mut self, confirm: bool) -> Self {
        self.confirm_one_click = confirm;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the configuration before a game is built from it.
    pub fn validate(&self) -> Result<()> {
        if !(2..=255).contains(&self.player_count) {
            return Err(RulesError::InvalidConfig(format!(
                "player_count must be between 2 and 255, got {}",
                self.player_count
            )));
        }
        if self.first_player.index() >= self.player_count {
            return Err(RulesError::InvalidConfig(format!(
                "first_player {} is not seated",
                self.first_player
            )));
        }
        Ok(())
    }

    /// Default options handed to each seated player.
    #[must_use]
    pub fn player_options(&self) -> PlayerOptions {
        PlayerOptions {
            confirm_one_click: self.confirm_one_click,
        }
    }
}
