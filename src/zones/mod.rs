//! Zone system for card locations.
//!
//! Unlike a generic engine, the set of locations is fixed by the game:
//! deck, hand, play area, spellboard, discard, archives (the conjuration
//! pile), purged, grafted and "being played". Every location is kept per
//! player.
//!
//! ## Key Types
//!
//! - `Location`: Where a card is
//! - `ZoneManager`: Card location tracking and ordered boards
//! - `ZonePosition`: Position specifier for ordered boards

pub mod location;
pub mod manager;

pub use location::{Location, LocationScope};
pub use manager::{Board, ZoneManager, ZonePosition};
