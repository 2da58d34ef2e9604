//! Card catalogs.
//!
//! Each set registers its card definitions into a [`CardRegistry`]. A card
//! script is a `CardDefinition` whose setup function declares the card's
//! abilities through the `AbilityBuilder`.
//!
//! [`CardRegistry`]: crate::cards::CardRegistry

pub mod core_set;

pub use core_set::core_set;
