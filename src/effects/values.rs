//! Derived card values.
//!
//! Every getter recomputes from printed data plus the live effects at call
//! time; nothing here is cached. Unknown card ids read as empty / zero.

use smallvec::SmallVec;

use crate::abilities::CardAction;
use crate::cards::CardType;
use crate::core::{EntityId, GameState, PlayerId};
use crate::zones::Location;

use super::effect::{EffectKind, EffectValue, Restriction, Stat};

/// Which end of a play area a flank check asks about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flank {
    Left,
    Right,
    Either,
}

impl GameState {
    #[must_use]
    pub fn stat(&self, id: EntityId, stat: Stat) -> i32 {
        self.effects.value_of(self, id, stat)
    }

    #[must_use]
    pub fn attack(&self, id: EntityId) -> i32 {
        self.stat(id, Stat::Attack)
    }

    #[must_use]
    pub fn life(&self, id: EntityId) -> i32 {
        self.stat(id, Stat::Life)
    }

    #[must_use]
    pub fn recover(&self, id: EntityId) -> i32 {
        self.stat(id, Stat::Recover)
    }

    #[must_use]
    pub fn armor(&self, id: EntityId) -> i32 {
        self.stat(id, Stat::Armor)
    }

    #[must_use]
    pub fn battlefield(&self, id: EntityId) -> i32 {
        self.stat(id, Stat::Battlefield)
    }

    #[must_use]
    pub fn spellboard(&self, id: EntityId) -> i32 {
        self.stat(id, Stat::Spellboard)
    }

    /// Whether any live effect of `kind` applies to the card.
    #[must_use]
    pub fn has_effect(&self, id: EntityId, kind: EffectKind) -> bool {
        self.effects.any_effect(self, id, kind)
    }

    /// Current name, following copy effects.
    #[must_use]
    pub fn card_name(&self, id: EntityId) -> String {
        self.printed_definition(id)
            .map(|d| d.name.clone())
            .unwrap_or_default()
    }

    /// Current type: the most recent type change, else the printed type of
    /// the card (or of the card it copies).
    #[must_use]
    pub fn card_type(&self, id: EntityId) -> Option<CardType> {
        let changed = self
            .effects
            .most_recent(self, id, EffectKind::ChangeType)
            .and_then(|e| match e.effect.value {
                EffectValue::CardType(t) => Some(t),
                _ => None,
            });
        changed.or_else(|| self.printed_definition(id).map(|d| d.card_type))
    }

    #[must_use]
    pub fn is_unit(&self, id: EntityId) -> bool {
        self.card_type(id).map_or(false, CardType::is_unit)
    }

    /// Printed traits plus added traits, deduplicated case-insensitively in
    /// first-seen order.
    #[must_use]
    pub fn traits(&self, id: EntityId) -> Vec<String> {
        let mut result: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !result.iter().any(|t| t.eq_ignore_ascii_case(name)) {
                result.push(name.to_string());
            }
        };
        if let Some(def) = self.printed_definition(id) {
            for t in &def.traits {
                push(t);
            }
        }
        for effect in self.effects.matching(self, id, EffectKind::AddTrait) {
            if let EffectValue::Name(name) = &effect.effect.value {
                push(name);
            }
        }
        result
    }

    #[must_use]
    pub fn has_trait(&self, id: EntityId, name: &str) -> bool {
        self.traits(id).iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    /// Summed value of a keyword, or 0 if a live effect removes it.
    #[must_use]
    pub fn keyword_value(&self, id: EntityId, name: &str) -> i32 {
        let name = name.to_lowercase();
        let removed = self
            .effects
            .matching(self, id, EffectKind::RemoveKeyword)
            .any(|e| matches!(&e.effect.value, EffectValue::Name(n) if *n == name));
        if removed {
            return 0;
        }
        self.effects
            .matching(self, id, EffectKind::AddKeyword)
            .filter_map(|e| match &e.effect.value {
                EffectValue::Keyword(k) if k.name == name => Some(k.value),
                _ => None,
            })
            .sum()
    }

    #[must_use]
    pub fn has_keyword(&self, id: EntityId, name: &str) -> bool {
        self.keyword_value(id, name) > 0
    }

    /// Whether the card's printed abilities are switched off.
    #[must_use]
    pub fn is_blank(&self, id: EntityId) -> bool {
        self.has_effect(id, EffectKind::Blank)
    }

    /// Whether no live `CardCannot` effect forbids `restriction`.
    #[must_use]
    pub fn allows(&self, id: EntityId, restriction: Restriction) -> bool {
        !self
            .effects
            .matching(self, id, EffectKind::CardCannot)
            .any(|e| matches!(e.effect.value, EffectValue::Restriction(r) if r == restriction))
    }

    /// Sum of live bonus-damage effects on the card.
    #[must_use]
    pub fn bonus_damage(&self, id: EntityId) -> i32 {
        self.effects.sum_amounts(self, id, EffectKind::BonusDamage)
    }

    /// Who should control the card: in play, the most recent take-control
    /// effect or the owner; elsewhere always the owner.
    #[must_use]
    pub fn modified_controller(&self, id: EntityId) -> Option<PlayerId> {
        let card = self.try_card(id)?;
        if !card.location.is_in_play() {
            return Some(card.owner);
        }
        let taken = self
            .effects
            .most_recent(self, id, EffectKind::TakeControl)
            .and_then(|e| match e.effect.value {
                EffectValue::Player(p) => Some(p),
                _ => None,
            });
        Some(taken.unwrap_or(card.owner))
    }

    /// Actions granted to the card by `GainAbility` effects.
    #[must_use]
    pub fn gained_actions(&self, id: EntityId) -> Vec<CardAction> {
        self.effects
            .matching(self, id, EffectKind::GainAbility)
            .filter_map(|e| match &e.effect.value {
                EffectValue::Action(action) => Some((**action).clone()),
                _ => None,
            })
            .collect()
    }

    /// Units on the same play-area board as the card, in order.
    fn board_units(&self, id: EntityId) -> SmallVec<[EntityId; 8]> {
        let Some((board, Location::PlayArea)) = self.zones.board_of(id) else {
            return SmallVec::new();
        };
        self.cards_in(board, Location::PlayArea)
            .iter()
            .copied()
            .filter(|&e| self.try_card(e).map_or(false, |c| c.printed_type().is_unit()))
            .collect()
    }

    /// Whether the unit is at the given end of its play area.
    #[must_use]
    pub fn is_on_flank(&self, id: EntityId, side: Flank) -> bool {
        if self.has_effect(id, EffectKind::ConsideredAsFlank) {
            return true;
        }
        let units = self.board_units(id);
        let left = units.first() == Some(&id);
        let right = units.last() == Some(&id);
        match side {
            Flank::Left => left,
            Flank::Right => right,
            Flank::Either => left || right,
        }
    }

    /// Whether the unit is in play but on neither flank.
    #[must_use]
    pub fn is_in_center(&self, id: EntityId) -> bool {
        let units = self.board_units(id);
        units.contains(&id) && !self.is_on_flank(id, Flank::Either)
    }

    /// Other ready spells with the same name on the owner's spellboard.
    #[must_use]
    pub fn focus(&self, id: EntityId) -> usize {
        let Some(card) = self.try_card(id) else {
            return 0;
        };
        if card.location != Location::Spellboard || card.printed_type() != CardType::ReadySpell {
            return 0;
        }
        let name = self.card_name(id);
        self.cards_in(card.owner, Location::Spellboard)
            .iter()
            .filter(|&&other| other != id && self.card_name(other) == name)
            .count()
    }

    /// Whether the card may guard: a Phoenixborn once per round, a unit only
    /// with a `CanGuard` effect. Exhausted cards never guard.
    #[must_use]
    pub fn can_guard(&self, id: EntityId) -> bool {
        let Some(card) = self.try_card(id) else {
            return false;
        };
        if card.is_exhausted() || !self.allows(id, Restriction::Guard) {
            return false;
        }
        match self.card_type(id) {
            Some(CardType::Phoenixborn) => !card.used_guard_this_round,
            Some(t) if t.is_unit() => {
                card.location == Location::PlayArea && self.has_effect(id, EffectKind::CanGuard)
            }
            _ => false,
        }
    }

    /// Whether the unit may block.
    #[must_use]
    pub fn can_block(&self, id: EntityId) -> bool {
        let Some(card) = self.try_card(id) else {
            return false;
        };
        self.is_unit(id)
            && card.location == Location::PlayArea
            && !card.is_exhausted()
            && self.allows(id, Restriction::Block)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cards::{Card, CardDefinition, Keyword};
    use crate::core::GameConfig;
    use crate::effects::{Effect, EffectMatch};

    fn setup() -> (GameState, EntityId, EntityId) {
        let mut state = GameState::new(GameConfig::new(2));
        let knight = Arc::new(
            CardDefinition::new("knight", "Knight", CardType::Ally)
                .with_attack(3)
                .with_life(4)
                .with_trait("Human"),
        );
        let wolf = Arc::new(
            CardDefinition::new("wolf", "Wolf", CardType::Conjuration)
                .with_attack(2)
                .with_life(1),
        );
        let a = state.alloc_entity();
        state.insert_card(Card::new(a, knight, PlayerId(0), Location::PlayArea));
        let b = state.alloc_entity();
        state.insert_card(Card::new(b, wolf, PlayerId(0), Location::PlayArea));
        (state, a, b)
    }

    #[test]
    fn test_set_then_modify_then_clamp() {
        let (mut state, knight, _) = setup();
        state.effects.add(None, Effect::set_stat(Stat::Attack, 1).with_target(EffectMatch::Card(knight)));
        state.effects.add(None, Effect::modify_stat(Stat::Attack, 2).with_target(EffectMatch::Card(knight)));
        assert_eq!(state.attack(knight), 3);

        state.effects.add(None, Effect::modify_stat(Stat::Attack, -10).with_target(EffectMatch::Card(knight)));
        assert_eq!(state.attack(knight), 0);
    }

    #[test]
    fn test_most_recent_set_wins() {
        let (mut state, knight, _) = setup();
        state.effects.add(None, Effect::set_stat(Stat::Life, 7).with_target(EffectMatch::Card(knight)));
        state.effects.add(None, Effect::set_stat(Stat::Life, 2).with_target(EffectMatch::Card(knight)));
        assert_eq!(state.life(knight), 2);
    }

    #[test]
    fn test_copy_card_changes_printed_values() {
        let (mut state, knight, wolf) = setup();
        let wolf_def = state.card(wolf).unwrap().definition.clone();
        state.effects.add(None, Effect::copy_card(wolf_def).with_target(EffectMatch::Card(knight)));

        assert_eq!(state.attack(knight), 2);
        assert_eq!(state.card_name(knight), "Wolf");
        assert_eq!(state.card_type(knight), Some(CardType::Conjuration));
        assert!(!state.has_trait(knight, "human"));
    }

    #[test]
    fn test_keywords_and_removal() {
        let (mut state, knight, _) = setup();
        state.effects.add(Some(knight), Effect::add_keyword(Keyword::new("overkill", 1)));
        state.effects.add(Some(knight), Effect::add_keyword(Keyword::new("overkill", 1)));
        assert_eq!(state.keyword_value(knight, "Overkill"), 2);

        state.effects.add(None, Effect::remove_keyword("overkill").with_target(EffectMatch::Card(knight)));
        assert_eq!(state.keyword_value(knight, "overkill"), 0);
        assert!(!state.has_keyword(knight, "overkill"));
    }

    #[test]
    fn test_traits_deduplicate() {
        let (mut state, knight, _) = setup();
        state.effects.add(None, Effect::add_trait("human").with_target(EffectMatch::Card(knight)));
        state.effects.add(None, Effect::add_trait("Dragon").with_target(EffectMatch::Card(knight)));
        assert_eq!(state.traits(knight), vec!["Human".to_string(), "Dragon".to_string()]);
    }

    #[test]
    fn test_armor_defaults_to_zero() {
        let (mut state, knight, _) = setup();
        assert_eq!(state.armor(knight), 0);
        state.effects.add(None, Effect::modify_stat(Stat::Armor, 2).with_target(EffectMatch::Card(knight)));
        assert_eq!(state.armor(knight), 2);
    }

    #[test]
    fn test_set_armor_ignores_modifiers() {
        let (mut state, knight, _) = setup();
        state.effects.add(None, Effect::set_stat(Stat::Armor, 1).with_target(EffectMatch::Card(knight)));
        state.effects.add(None, Effect::modify_stat(Stat::Armor, 2).with_target(EffectMatch::Card(knight)));
        assert_eq!(state.armor(knight), 1);

        // Other stats still add modifiers on top of a set value.
        state.effects.add(None, Effect::set_stat(Stat::Life, 1).with_target(EffectMatch::Card(knight)));
        state.effects.add(None, Effect::modify_stat(Stat::Life, 2).with_target(EffectMatch::Card(knight)));
        assert_eq!(state.life(knight), 3);
    }

    #[test]
    fn test_restrictions() {
        let (mut state, knight, _) = setup();
        assert!(state.allows(knight, Restriction::BeDestroyed));
        state.effects.add(
            None,
            Effect::card_cannot(Restriction::BeDestroyed).with_target(EffectMatch::Card(knight)),
        );
        assert!(!state.allows(knight, Restriction::BeDestroyed));
        assert!(state.allows(knight, Restriction::BeDamaged));
    }

    #[test]
    fn test_flank_and_center() {
        let (mut state, knight, wolf) = setup();
        assert!(state.is_on_flank(knight, Flank::Left));
        assert!(state.is_on_flank(wolf, Flank::Right));

        let def = state.card(knight).unwrap().definition.clone();
        let third = state.alloc_entity();
        state.insert_card(Card::new(third, def, PlayerId(0), Location::PlayArea));
        assert!(state.is_in_center(wolf));
        assert!(!state.is_in_center(knight));

        state.effects.add(
            None,
            Effect::flag(EffectKind::ConsideredAsFlank).with_target(EffectMatch::Card(wolf)),
        );
        assert!(state.is_on_flank(wolf, Flank::Left));
    }

    #[test]
    fn test_can_block_and_guard() {
        let (mut state, knight, wolf) = setup();
        assert!(state.can_block(knight));
        assert!(!state.can_guard(knight));

        state.effects.add(None, Effect::flag(EffectKind::CanGuard).with_target(EffectMatch::Card(wolf)));
        assert!(state.can_guard(wolf));

        state.card_mut(wolf).unwrap().exhaust();
        assert!(!state.can_guard(wolf));
        assert!(!state.can_block(wolf));
    }

    #[test]
    fn test_modified_controller() {
        let (mut state, knight, _) = setup();
        assert_eq!(state.modified_controller(knight), Some(PlayerId(0)));
        state.effects.add(None, Effect::take_control(PlayerId(1)).with_target(EffectMatch::Card(knight)));
        assert_eq!(state.modified_controller(knight), Some(PlayerId(1)));
    }
}
