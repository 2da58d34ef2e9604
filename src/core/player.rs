//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! Type-safe player identifier. Seating order is the id order, and turn order
//! starts from the active player and wraps around.
//!
//! ## PlayerMap
//!
//! Per-seat storage.
//!
//! ## Player
//!
//! The per-player rules state: dice pool, remaining main/side actions and
//! the player's option flags.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::ops::{Index, IndexMut};

use super::config::PlayerOptions;
use crate::dice::{Die, DieId};

/// Unique identifier for a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the index for array access.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all player IDs for a given player count.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }

    /// The next player in seating order.
    #[must_use]
    pub fn next(self, player_count: usize) -> PlayerId {
        PlayerId(((self.index() + 1) % player_count.max(1)) as u8)
    }

    /// Turn order starting from this player: self first, then the others
    /// in seating order.
    pub fn turn_order(self, player_count: usize) -> impl Iterator<Item = PlayerId> {
        let start = self.index();
        (0..player_count).map(move |offset| PlayerId(((start + offset) % player_count) as u8))
    }

    /// Every other player, in turn order after this one.
    #[must_use]
    pub fn opponents(self, player_count: usize) -> SmallVec<[PlayerId; 4]> {
        self.turn_order(player_count).skip(1).collect()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-seat storage, indexed by `PlayerId`.
///
/// ```
/// use ashes_rules::core::{PlayerId, PlayerMap};
///
/// let mut actions: PlayerMap<u8> = PlayerMap::new(2, |_| 1);
/// actions[PlayerId::new(1)] = 0;
/// assert_eq!(actions.try_get(PlayerId::new(1)), Some(&0));
/// assert!(actions.try_get(PlayerId::new(2)).is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    seats: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Build one entry per seat.
    ///
    /// # Panics
    ///
    /// Panics if `player_count` is 0 or greater than 255.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(
            (1..=255).contains(&player_count),
            "player count must be between 1 and 255"
        );
        Self {
            seats: PlayerId::all(player_count).map(factory).collect(),
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        player.index() < self.seats.len()
    }

    #[must_use]
    pub fn try_get(&self, player: PlayerId) -> Option<&T> {
        self.seats.get(player.index())
    }

    pub fn try_get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.seats.get_mut(player.index())
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.seats.len())
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &T {
        &self.seats[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.seats[player.index()]
    }
}

/// Rules state for one seated player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// The player's dice pool, in roll order.
    pub dice: Vec<Die>,
    pub main_actions: u8,
    pub side_actions: u8,
    pub options: PlayerOptions,
}

impl Player {
    /// Main and side actions granted at the start of each turn.
    pub const ACTIONS_PER_TURN: u8 = 1;

    /// Create a player with an empty dice pool.
    pub fn new(id: PlayerId, name: impl Into<String>, options: PlayerOptions) -> Self {
        Self {
            id,
            name: name.into(),
            dice: Vec::new(),
            main_actions: Self::ACTIONS_PER_TURN,
            side_actions: Self::ACTIONS_PER_TURN,
            options,
        }
    }

    /// Look up a die in this player's pool.
    #[must_use]
    pub fn die(&self, id: DieId) -> Option<&Die> {
        self.dice.iter().find(|d| d.id == id)
    }

    /// Mutable lookup of a die in this player's pool.
    pub fn die_mut(&mut self, id: DieId) -> Option<&mut Die> {
        self.dice.iter_mut().find(|d| d.id == id)
    }

    /// Dice that are not exhausted.
    pub fn available_dice(&self) -> impl Iterator<Item = &Die> {
        self.dice.iter().filter(|d| !d.exhausted)
    }

    /// Restore the per-turn action allowances.
    pub fn reset_actions(&mut self) {
        self.main_actions = Self::ACTIONS_PER_TURN;
        self.side_actions = Self::ACTIONS_PER_TURN;
    }
}
