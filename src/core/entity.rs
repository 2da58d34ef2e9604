//! Entity identification.
//!
//! Every card instance in a game has a unique `EntityId`, allocated by
//! `GameState` when the card is created. Ids are never reused within a game,
//! so an id captured in an event or snapshot always refers to the same
//! physical card even after it has left play.
//!
//! ```
//! use ashes_rules::core::EntityId;
//!
//! let card = EntityId::new(10);
//! assert_eq!(card.raw(), 10);
//! assert_eq!(format!("{}", card), "Card(10)");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a card instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create an entity ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}
