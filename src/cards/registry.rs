//! Card catalog.
//!
//! The `CardRegistry` maps card stubs to shared definitions. Games are
//! created against a registry and instantiate cards from it by stub.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardType};
use crate::error::{Result, RulesError};

/// Registry of card definitions keyed by stub.
///
/// ```
/// use ashes_rules::cards::{CardDefinition, CardRegistry, CardType};
///
/// let mut registry = CardRegistry::new();
/// registry
///     .register(CardDefinition::new("masked-wolf", "Masked Wolf", CardType::Conjuration))
///     .unwrap();
/// assert!(registry.get("masked-wolf").is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<String, Arc<CardDefinition>>,
    order: Vec<String>,
}

impl CardRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition.
    ///
    /// A second definition for the same stub is rejected as malformed.
    pub fn register(&mut self, card: CardDefinition) -> Result<()> {
        if card.stub.is_empty() {
            return Err(RulesError::malformed(card.name, "card has an empty stub"));
        }
        if self.cards.contains_key(&card.stub) {
            return Err(RulesError::malformed(card.stub, "duplicate card stub"));
        }
        self.order.push(card.stub.clone());
        self.cards.insert(card.stub.clone(), Arc::new(card));
        Ok(())
    }

    /// Get a definition by stub.
    #[must_use]
    pub fn get(&self, stub: &str) -> Option<Arc<CardDefinition>> {
        self.cards.get(stub).cloned()
    }

    /// Get a definition by stub, or a `MalformedCard` error naming it.
    pub fn require(&self, stub: &str) -> Result<Arc<CardDefinition>> {
        self.get(stub)
            .ok_or_else(|| RulesError::malformed(stub, "unknown card stub"))
    }

    #[must_use]
    pub fn contains(&self, stub: &str) -> bool {
        self.cards.contains_key(stub)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CardDefinition>> {
        self.order.iter().filter_map(|stub| self.cards.get(stub))
    }

    /// Definitions of a given type, in registration order.
    pub fn find_by_type(&self, card_type: CardType) -> impl Iterator<Item = &Arc<CardDefinition>> {
        self.iter().filter(move |c| c.card_type == card_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut registry = CardRegistry::new();
        registry
            .register(CardDefinition::new("a", "Alpha", CardType::Ally))
            .unwrap();
        registry
            .register(CardDefinition::new("b", "Beta", CardType::ReadySpell))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a").unwrap().name, "Alpha");
        assert!(registry.get("zzz").is_none());
        let stubs: Vec<_> = registry.iter().map(|c| c.stub.as_str()).collect();
        assert_eq!(stubs, vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_stub_rejected() {
        let mut registry = CardRegistry::new();
        registry
            .register(CardDefinition::new("a", "Alpha", CardType::Ally))
            .unwrap();
        let err = registry
            .register(CardDefinition::new("a", "Other", CardType::Ally))
            .unwrap_err();
        assert!(matches!(err, RulesError::MalformedCard { .. }));
    }

    #[test]
    fn test_require_unknown() {
        let registry = CardRegistry::new();
        assert!(matches!(
            registry.require("missing"),
            Err(RulesError::MalformedCard { .. })
        ));
    }

    #[test]
    fn test_find_by_type() {
        let mut registry = CardRegistry::new();
        registry
            .register(CardDefinition::new("a", "Alpha", CardType::Ally))
            .unwrap();
        registry
            .register(CardDefinition::new("w", "Wolf", CardType::Conjuration))
            .unwrap();
        let conj: Vec<_> = registry.find_by_type(CardType::Conjuration).collect();
        assert_eq!(conj.len(), 1);
        assert_eq!(conj[0].stub, "w");
    }
}
