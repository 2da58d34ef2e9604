//! Zone manager for card locations and movement.
//!
//! The `ZoneManager` tracks which player's board and which location each card
//! is in, and keeps every board in order. Play-area order is meaningful: a
//! unit's neighbors are the units directly left and right of it.

use rustc_hash::FxHashMap;

use crate::core::entity::EntityId;
use crate::core::player::PlayerId;

use super::location::Location;

use serde::{Deserialize, Serialize};

/// Position for inserting a card into a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Append (rightmost in the play area, top of a deck).
    Top,
    /// Prepend (leftmost in the play area, bottom of a deck).
    Bottom,
    /// Insert at specific index.
    Index(usize),
}

/// A player's board for one location.
pub type Board = (PlayerId, Location);

/// Manages card locations across players and locations.
///
/// ```
/// use ashes_rules::core::{EntityId, PlayerId};
/// use ashes_rules::zones::{Location, ZoneManager, ZonePosition};
///
/// let mut manager = ZoneManager::new();
/// let p0 = PlayerId::new(0);
///
/// manager.add(EntityId(10), (p0, Location::PlayArea), None);
/// manager.add(EntityId(11), (p0, Location::PlayArea), None);
/// manager.add(EntityId(12), (p0, Location::PlayArea), Some(ZonePosition::Bottom));
///
/// assert_eq!(
///     manager.cards(p0, Location::PlayArea),
///     &[EntityId(12), EntityId(10), EntityId(11)]
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    /// Card locations: entity_id -> board
    locations: FxHashMap<EntityId, Board>,

    /// Ordered card lists per board.
    boards: FxHashMap<Board, Vec<EntityId>>,
}

impl ZoneManager {
    /// Create a new empty zone manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(order: &mut Vec<EntityId>, entity: EntityId, position: Option<ZonePosition>) {
        match position.unwrap_or(ZonePosition::Top) {
            ZonePosition::Top => order.push(entity),
            ZonePosition::Bottom => order.insert(0, entity),
            ZonePosition::Index(i) => {
                let idx = i.min(order.len());
                order.insert(idx, entity);
            }
        }
    }

    /// Add a card to a board.
    ///
    /// Returns `false` (and changes nothing) if the card is already tracked.
    pub fn add(&mut self, entity: EntityId, board: Board, position: Option<ZonePosition>) -> bool {
        if self.locations.contains_key(&entity) {
            return false;
        }
        self.locations.insert(entity, board);
        Self::insert(self.boards.entry(board).or_default(), entity, position);
        true
    }

    /// Move a card to another board.
    ///
    /// Returns the old board, or `None` if the card wasn't found. Moving a
    /// card onto the board it is already on leaves its position unchanged.
    pub fn move_to(
        &mut self,
        entity: EntityId,
        board: Board,
        position: Option<ZonePosition>,
    ) -> Option<Board> {
        let old = self.locations.get(&entity).copied()?;
        if old == board {
            return Some(old);
        }

        if let Some(order) = self.boards.get_mut(&old) {
            order.retain(|&e| e != entity);
        }
        self.locations.insert(entity, board);
        Self::insert(self.boards.entry(board).or_default(), entity, position);

        Some(old)
    }

    /// Get the board a card is on.
    #[must_use]
    pub fn board_of(&self, entity: EntityId) -> Option<Board> {
        self.locations.get(&entity).copied()
    }

    /// Cards on a board, in order.
    #[must_use]
    pub fn cards(&self, player: PlayerId, location: Location) -> &[EntityId] {
        self.boards
            .get(&(player, location))
            .map_or(&[], |v| v.as_slice())
    }
}
