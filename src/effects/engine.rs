//! The effect engine: the set of live effects and the queries over it.
//!
//! Effects are kept in registration order. Every registration takes a fresh,
//! strictly increasing handle, so "most recent" is simply "last matching".
//! A persistent effect that is unregistered and registered again (its source
//! left and re-entered scope) counts as newly registered.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{EntityId, GameState};

use super::effect::{Duration, Effect, EffectKind, EffectMatch, MatchFn, Relation, Stat};

/// Handle of a registered effect. Handles double as registration sequence
/// numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectHandle(pub u64);

impl std::fmt::Display for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}

/// A registered effect.
#[derive(Clone, Debug)]
pub struct ActiveEffect {
    pub handle: EffectHandle,
    /// The card that created the effect, if any.
    pub source: Option<EntityId>,
    pub effect: Effect,
}

impl ActiveEffect {
    /// Whether the effect is live and matches `entity`.
    #[must_use]
    pub fn applies_to(&self, state: &GameState, entity: EntityId) -> bool {
        if let Some(condition) = &self.effect.condition {
            if !(condition.0)(state, self.source) {
                return false;
            }
        }
        match &self.effect.target {
            EffectMatch::SelfCard => self.source == Some(entity),
            EffectMatch::Parent => self
                .source
                .and_then(|s| state.try_card(s))
                .and_then(|c| c.parent)
                == Some(entity),
            EffectMatch::Card(id) => *id == entity,
            EffectMatch::Cards(ids) => ids.contains(&entity),
            EffectMatch::Neighbors => self
                .source
                .map_or(false, |s| state.neighbors(s).contains(&entity)),
            EffectMatch::Units(relation) => self.matches_unit(state, *relation, entity),
            EffectMatch::Predicate(f) => self.evaluate_predicate(f, state, entity),
        }
    }

    fn matches_unit(&self, state: &GameState, relation: Relation, entity: EntityId) -> bool {
        let Some(card) = state.try_card(entity) else {
            return false;
        };
        if !card.printed_type().is_unit() || card.location != crate::zones::Location::PlayArea {
            return false;
        }
        let source_controller = self.source.and_then(|s| state.try_card(s)).map(|c| c.controller);
        match (relation, source_controller) {
            (Relation::Any, _) => true,
            (Relation::Controller, Some(p)) => card.controller == p,
            (Relation::Opponent, Some(p)) => card.controller != p,
            (_, None) => false,
        }
    }

    fn evaluate_predicate(&self, f: &MatchFn, state: &GameState, entity: EntityId) -> bool {
        match (f.0)(state, self.source, entity) {
            Ok(matches) => matches,
            Err(err) => {
                trace!(handle = %self.handle, %entity, error = %err, "effect match failed closed");
                false
            }
        }
    }
}

/// The registry of live effects.
#[derive(Clone, Debug, Default)]
pub struct EffectEngine {
    effects: Vec<ActiveEffect>,
    next_handle: u64,
}

impl EffectEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect.
    pub fn add(&mut self, source: Option<EntityId>, effect: Effect) -> EffectHandle {
        let handle = EffectHandle(self.next_handle);
        self.next_handle += 1;
        trace!(%handle, kind = ?effect.kind, ?source, "effect registered");
        self.effects.push(ActiveEffect {
            handle,
            source,
            effect,
        });
        handle
    }

    /// Unregister an effect. Returns it if it was registered.
    pub fn remove(&mut self, handle: EffectHandle) -> Option<ActiveEffect> {
        let index = self.effects.iter().position(|e| e.handle == handle)?;
        Some(self.effects.remove(index))
    }

    /// Unregister every effect matching `pred`, returning them.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&ActiveEffect) -> bool) -> Vec<ActiveEffect> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.effects.len());
        for effect in self.effects.drain(..) {
            if pred(&effect) {
                removed.push(effect);
            } else {
                kept.push(effect);
            }
        }
        self.effects = kept;
        removed
    }

    /// Unregister every lasting effect with the given duration.
    pub fn expire(&mut self, duration: Duration) -> usize {
        self.remove_where(|e| e.effect.duration == duration).len()
    }

    #[must_use]
    pub fn get(&self, handle: EffectHandle) -> Option<&ActiveEffect> {
        self.effects.iter().find(|e| e.handle == handle)
    }

    /// All registered effects, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Live effects of `kind` applying to `entity`, in registration order.
    pub fn matching<'a>(
        &'a self,
        state: &'a GameState,
        entity: EntityId,
        kind: EffectKind,
    ) -> impl Iterator<Item = &'a ActiveEffect> + 'a {
        self.effects
            .iter()
            .filter(move |e| e.effect.kind == kind && e.applies_to(state, entity))
    }

    /// Whether any live effect of `kind` applies to `entity`.
    #[must_use]
    pub fn any_effect(&self, state: &GameState, entity: EntityId, kind: EffectKind) -> bool {
        self.matching(state, entity, kind).next().is_some()
    }

    /// The most recently registered live effect of `kind` on `entity`.
    #[must_use]
    pub fn most_recent<'a>(
        &'a self,
        state: &'a GameState,
        entity: EntityId,
        kind: EffectKind,
    ) -> Option<&'a ActiveEffect> {
        self.matching(state, entity, kind).last()
    }

    /// Sum of the amount payloads of live effects of `kind` on `entity`.
    #[must_use]
    pub fn sum_amounts(&self, state: &GameState, entity: EntityId, kind: EffectKind) -> i32 {
        self.matching(state, entity, kind)
            .filter_map(|e| e.effect.amount().map(|a| a.evaluate(state, e.source, entity)))
            .sum()
    }

    /// The current value of a stat.
    ///
    /// Base is the printed value (of the copied card, if a copy effect is
    /// live), replaced by the most recent set effect if there is one. Every
    /// live modify effect is then added and the total floored at zero.
    ///
    /// Armor is the exception: a set effect is final and modify effects only
    /// count while no set effect is live.
    #[must_use]
    pub fn value_of(&self, state: &GameState, entity: EntityId, stat: Stat) -> i32 {
        let set = self
            .most_recent(state, entity, stat.set_kind())
            .map(|set| {
                set.effect
                    .amount()
                    .map_or(0, |a| a.evaluate(state, set.source, entity))
            });
        if let (Stat::Armor, Some(armor)) = (stat, set) {
            return armor.max(0);
        }
        let base = set.unwrap_or_else(|| state.printed_stat(entity, stat));
        let total = base + self.sum_amounts(state, entity, stat.modify_kind());
        total.max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;
    use crate::error::RulesError;
    use crate::effects::Amount;

    #[test]
    fn test_add_remove_handles_increase() {
        let mut engine = EffectEngine::new();
        let a = engine.add(None, Effect::modify_stat(Stat::Attack, 1));
        let b = engine.add(None, Effect::modify_stat(Stat::Attack, 1));
        assert!(b > a);
        assert_eq!(engine.len(), 2);
        assert!(engine.remove(a).is_some());
        assert!(engine.remove(a).is_none());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_expire_by_duration() {
        let mut engine = EffectEngine::new();
        engine.add(None, Effect::modify_stat(Stat::Life, 1).until_end_of_turn());
        engine.add(None, Effect::modify_stat(Stat::Life, 1).until_end_of_round());
        engine.add(None, Effect::modify_stat(Stat::Life, 1));

        assert_eq!(engine.expire(Duration::UntilEndOfTurn), 1);
        assert_eq!(engine.len(), 2);
        assert_eq!(engine.expire(Duration::UntilEndOfRound), 1);
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_failing_predicate_does_not_match() {
        let state = GameState::new(GameConfig::new(2));
        let mut engine = EffectEngine::new();
        engine.add(
            None,
            Effect::modify_stat(Stat::Attack, Amount::Fixed(5)).with_target(
                EffectMatch::predicate(|_, _, _| Err(RulesError::InvalidResponse("boom".into()))),
            ),
        );
        assert!(!engine.any_effect(&state, EntityId(1), EffectKind::ModifyAttack));
    }
}
