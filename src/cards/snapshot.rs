//! Card snapshots.
//!
//! A [`CardSnapshot`] is a plain value copy of a card at one moment: its
//! computed (not printed) stats, traits, tokens, controller, location,
//! neighbors and copies of the effects that applied to it. Abilities
//! that refer to "the card as it was" read the snapshot, so later changes to
//! the live card do not leak into them.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EntityId, GameState, PlayerId};
use crate::effects::{ActiveEffect, EffectHandle, EffectKind};
use crate::error::Result;
use crate::zones::Location;

use super::definition::CardType;
use super::tokens::Tokens;

/// An effect as it applied to a captured card. The amount is evaluated
/// against the card at capture time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSnapshot {
    pub handle: EffectHandle,
    pub source: Option<EntityId>,
    pub kind: EffectKind,
    pub amount: Option<i32>,
}

impl EffectSnapshot {
    fn capture(state: &GameState, active: &ActiveEffect, target: EntityId) -> Self {
        Self {
            handle: active.handle,
            source: active.source,
            kind: active.effect.kind,
            amount: active
                .effect
                .amount()
                .map(|a| a.evaluate(state, active.source, target)),
        }
    }
}

/// A card frozen at a point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub id: EntityId,
    pub stub: String,
    pub name: String,
    pub card_type: CardType,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub location: Location,
    pub tokens: Tokens,
    pub attack: i32,
    pub life: i32,
    pub recover: i32,
    pub armor: i32,
    pub battlefield: i32,
    pub spellboard: i32,
    pub traits: Vec<String>,
    /// Neighbors at capture time.
    pub neighbors: SmallVec<[EntityId; 2]>,
    pub parent: Option<EntityId>,
    pub upgrades: Vec<CardSnapshot>,
    /// Effects that applied to the card at capture time.
    pub effects: Vec<EffectSnapshot>,
}

impl CardSnapshot {
    /// Capture a card and, recursively, its upgrades.
    pub fn capture(state: &GameState, id: EntityId) -> Result<Self> {
        let card = state.card(id)?;
        let upgrades = card
            .upgrades
            .iter()
            .map(|&u| Self::capture(state, u))
            .collect::<Result<Vec<_>>>()?;
        let effects = state
            .effects
            .iter()
            .filter(|e| e.applies_to(state, id))
            .map(|e| EffectSnapshot::capture(state, e, id))
            .collect();

        Ok(Self {
            id,
            stub: card.stub().to_string(),
            name: state.card_name(id),
            card_type: state.card_type(id).unwrap_or(card.printed_type()),
            owner: card.owner,
            controller: card.controller,
            location: card.location,
            tokens: card.tokens.clone(),
            attack: state.attack(id),
            life: state.life(id),
            recover: state.recover(id),
            armor: state.armor(id),
            battlefield: state.battlefield(id),
            spellboard: state.spellboard(id),
            traits: state.traits(id),
            neighbors: state.neighbors(id),
            parent: card.parent,
            upgrades,
            effects,
        })
    }

    /// Whether an effect of `kind` applied to the card at capture time.
    #[must_use]
    pub fn had_effect(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    #[must_use]
    pub fn damage(&self) -> u32 {
        self.tokens.count(&super::TokenKind::Damage)
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.card_type.is_unit()
    }

    #[must_use]
    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.iter().any(|t| t.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cards::{Card, CardDefinition, TokenKind};
    use crate::core::GameConfig;
    use crate::effects::{Effect, EffectMatch, Stat};

    #[test]
    fn test_snapshot_is_independent_of_live_card() {
        let mut state = GameState::new(GameConfig::new(2));
        let def = Arc::new(
            CardDefinition::new("iron-worker", "Iron Worker", CardType::Ally)
                .with_attack(2)
                .with_life(2),
        );
        let left = state.alloc_entity();
        state.insert_card(Card::new(left, def.clone(), PlayerId(0), Location::PlayArea));
        let id = state.alloc_entity();
        state.insert_card(Card::new(id, def, PlayerId(0), Location::PlayArea));
        state.card_mut(id).unwrap().add_token(TokenKind::Damage, 1);
        let handle = state.effects.add(
            None,
            Effect::modify_stat(Stat::Attack, 2).with_target(EffectMatch::Card(id)),
        );

        let snapshot = CardSnapshot::capture(&state, id).unwrap();
        assert_eq!(snapshot.attack, 4);
        assert_eq!(snapshot.damage(), 1);
        assert_eq!(snapshot.neighbors.as_slice(), &[left]);
        assert_eq!(snapshot.effects.len(), 1);
        assert_eq!(snapshot.effects[0].handle, handle);

        state.effects.remove(handle);
        state.card_mut(id).unwrap().add_token(TokenKind::Damage, 1);
        state.move_card(id, Location::Discard, None, None).unwrap();

        assert_eq!(snapshot.attack, 4);
        assert_eq!(snapshot.damage(), 1);
        assert_eq!(snapshot.location, Location::PlayArea);
        assert_eq!(state.attack(id), 2);
    }

    #[test]
    fn test_snapshot_keeps_removed_effects() {
        let mut state = GameState::new(GameConfig::new(2));
        let def = Arc::new(
            CardDefinition::new("iron-worker", "Iron Worker", CardType::Ally)
                .with_attack(2)
                .with_life(2),
        );
        let source = state.alloc_entity();
        state.insert_card(Card::new(source, def.clone(), PlayerId(1), Location::PlayArea));
        let id = state.alloc_entity();
        state.insert_card(Card::new(id, def, PlayerId(0), Location::PlayArea));
        let handle = state.effects.add(
            Some(source),
            Effect::modify_stat(Stat::Armor, 3).with_target(EffectMatch::Card(id)),
        );

        let snapshot = CardSnapshot::capture(&state, id).unwrap();
        state.effects.remove(handle);
        assert!(state.effects.iter().all(|e| e.handle != handle));

        assert_eq!(
            snapshot.effects,
            vec![EffectSnapshot {
                handle,
                source: Some(source),
                kind: EffectKind::ModifyArmor,
                amount: Some(3),
            }]
        );
        assert!(snapshot.had_effect(EffectKind::ModifyArmor));
        assert!(!snapshot.had_effect(EffectKind::SetArmor));
        assert_eq!(snapshot.armor, 3);
    }
}
