//! Card system: definitions, instances, snapshots and summaries.
//!
//! ## Key Types
//!
//! - [`CardDefinition`]: printed card data plus the setup function that
//!   declares the card's abilities
//! - [`Card`]: one copy of a definition in a game (location, tokens, owner
//!   and controller)
//! - [`CardRegistry`]: the catalog, keyed by stub
//! - [`CardSnapshot`]: a value copy of a card at one moment
//! - [`CardSummary`]: what a viewer may know about a card

pub mod definition;
pub mod instance;
pub mod registry;
pub mod snapshot;
pub mod summary;
pub mod tokens;

pub use definition::{CardDefinition, CardSetup, CardType, Keyword, PrintedStats, StatValue};
pub use instance::Card;
pub use registry::CardRegistry;
pub use snapshot::{CardSnapshot, EffectSnapshot};
pub use summary::{CardSummary, HiddenCard, MenuItem, StatFlags, VisibleCard};
pub use tokens::{TokenKind, Tokens};
