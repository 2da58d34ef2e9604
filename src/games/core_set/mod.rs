//! Ashes core set.
//!
//! Only the cards the engine's scenarios need are scripted here:
//!
//! - Silver Snake: a conjuration whose attack is its status token count and
//!   which grows whenever an opposing unit is destroyed
//! - Summon Masked Wolf: a ready spell that brings a Masked Wolf out of the
//!   archives
//! - Masked Wolf: the conjuration it summons

mod cards;

pub use cards::{masked_wolf, silver_snake, summon_masked_wolf};

use crate::cards::CardRegistry;
use crate::error::Result;

/// Register every core set card.
pub fn register(registry: &mut CardRegistry) -> Result<()> {
    registry.register(silver_snake())?;
    registry.register(summon_masked_wolf())?;
    registry.register(masked_wolf())?;
    Ok(())
}

/// A registry holding only the core set.
pub fn core_set() -> Result<CardRegistry> {
    let mut registry = CardRegistry::new();
    register(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_set_registers_once() {
        let mut registry = core_set().unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("silver-snake"));
        assert!(register(&mut registry).is_err());
    }
}
