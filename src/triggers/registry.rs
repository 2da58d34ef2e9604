//! Triggered ability registry.
//!
//! The registry owns every triggered ability created in a game and an index
//! of the *registered* ones by `(event name, kind)`, so the pipeline only
//! asks abilities that listen for an event at the current stage. Cards
//! register and unregister their abilities as they move in and out of scope
//! (see `GameState::move_card`); abilities scoped "any" are registered once
//! when the card is created.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::EntityId;
use crate::error::{Result, RulesError};
use crate::events::EventName;
use crate::zones::LocationScope;

use super::ability::{AbilityId, AbilityKind, TriggeredAbility};

/// Registry for triggered abilities.
#[derive(Clone, Debug, Default)]
pub struct TriggerRegistry {
    /// Every ability ever added.
    abilities: FxHashMap<AbilityId, TriggeredAbility>,

    /// Registered listeners by event name and kind, in registration order.
    listeners: FxHashMap<(EventName, AbilityKind), Vec<AbilityId>>,

    registered: FxHashSet<AbilityId>,

    /// Next ability ID to allocate.
    next_id: u32,
}

impl TriggerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a card's ability and assign its id. The ability is
    /// not registered yet.
    pub fn add(&mut self, card: EntityId, mut ability: TriggeredAbility) -> Result<AbilityId> {
        if ability.when.is_empty() {
            return Err(RulesError::malformed(
                card.to_string(),
                format!("'{}' listens for no events", ability.title),
            ));
        }
        let id = AbilityId(self.next_id);
        self.next_id += 1;
        ability.id = id;
        ability.card = card;
        self.abilities.insert(id, ability);
        Ok(id)
    }

    /// Get an ability by ID.
    #[must_use]
    pub fn get(&self, id: AbilityId) -> Option<&TriggeredAbility> {
        self.abilities.get(&id)
    }

    pub fn ability(&self, id: AbilityId) -> Result<&TriggeredAbility> {
        self.get(id)
            .ok_or_else(|| RulesError::InvariantViolation(format!("{id} does not exist")))
    }

    pub fn scope_of(&self, id: AbilityId) -> Result<LocationScope> {
        Ok(self.ability(id)?.scope.clone())
    }

    /// Start listening. Registering twice has no effect.
    pub fn register(&mut self, id: AbilityId) -> Result<()> {
        if self.registered.contains(&id) {
            return Ok(());
        }
        let ability = self.ability(id)?;
        let kind = ability.kind;
        for name in ability.event_names() {
            self.listeners.entry((name, kind)).or_default().push(id);
        }
        self.registered.insert(id);
        Ok(())
    }

    /// Stop listening.
    pub fn unregister(&mut self, id: AbilityId) {
        if !self.registered.remove(&id) {
            return;
        }
        let mut empty = Vec::new();
        for (key, list) in self.listeners.iter_mut() {
            list.retain(|&a| a != id);
            if list.is_empty() {
                empty.push(*key);
            }
        }
        for key in empty {
            self.listeners.remove(&key);
        }
    }

    #[must_use]
    pub fn is_registered(&self, id: AbilityId) -> bool {
        self.registered.contains(&id)
    }

    /// Registered abilities of `kind` listening for `name`, in registration
    /// order.
    #[must_use]
    pub fn listeners(&self, name: EventName, kind: AbilityKind) -> &[AbilityId] {
        self.listeners
            .get(&(name, kind))
            .map_or(&[], Vec::as_slice)
    }

    /// Every ability carried by a card, in id order.
    #[must_use]
    pub fn abilities_of(&self, card: EntityId) -> Vec<AbilityId> {
        let mut ids: Vec<AbilityId> = self
            .abilities
            .values()
            .filter(|a| a.card == card)
            .map(|a| a.id)
            .collect();
        ids.sort();
        ids
    }

    /// Get total ability count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::TriggerCondition;

    fn consume() -> TriggeredAbility {
        TriggeredAbility::new("Consume")
            .with_kind(AbilityKind::ForcedReaction)
            .on(EventName::OnCardDestroyed, TriggerCondition::Always)
    }

    #[test]
    fn test_add_assigns_ids() {
        let mut registry = TriggerRegistry::new();
        let a = registry.add(EntityId(1), consume()).unwrap();
        let b = registry.add(EntityId(2), consume()).unwrap();

        assert_ne!(a, b);
        assert_eq!(registry.get(a).unwrap().card, EntityId(1));
        assert_eq!(registry.abilities_of(EntityId(2)), vec![b]);
        assert!(!registry.is_registered(a));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_add_rejects_ability_without_events() {
        let mut registry = TriggerRegistry::new();
        let err = registry.add(EntityId(1), TriggeredAbility::new("Nothing")).unwrap_err();
        assert!(matches!(err, RulesError::MalformedCard { .. }));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = TriggerRegistry::new();
        let id = registry.add(EntityId(1), consume()).unwrap();

        registry.register(id).unwrap();
        registry.register(id).unwrap();
        assert_eq!(
            registry.listeners(EventName::OnCardDestroyed, AbilityKind::ForcedReaction),
            &[id]
        );
        assert!(registry
            .listeners(EventName::OnCardDestroyed, AbilityKind::Reaction)
            .is_empty());

        registry.unregister(id);
        assert!(!registry.is_registered(id));
        assert!(registry
            .listeners(EventName::OnCardDestroyed, AbilityKind::ForcedReaction)
            .is_empty());
        assert!(registry.register(AbilityId(40)).is_err());
    }
}
