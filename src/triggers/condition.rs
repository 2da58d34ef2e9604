//! Trigger conditions.
//!
//! Conditions are composable predicates over the triggering event and the
//! ability's context. Most card text maps onto the declarative variants; the
//! `Custom` variant carries a closure for the rest.
//!
//! Conditions that ask about "the event's card" read the event's snapshot
//! when one was captured (destroyed and departed cards), so they see the
//! card as it was rather than as it is now.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::cards::CardType;
use crate::core::{EntityId, GameState, PlayerId};
use crate::effects::Relation;
use crate::events::{EventName, GameEvent};

/// Context for evaluating a trigger condition.
#[derive(Clone, Copy)]
pub struct TriggerContext<'a> {
    pub state: &'a GameState,
    pub event: &'a GameEvent,
    /// The player the ability would resolve for.
    pub player: PlayerId,
    /// The card carrying the ability.
    pub source: EntityId,
}

impl<'a> TriggerContext<'a> {
    pub fn new(state: &'a GameState, event: &'a GameEvent, player: PlayerId, source: EntityId) -> Self {
        Self {
            state,
            event,
            player,
            source,
        }
    }

    /// Controller of the event's card, from its snapshot if one exists.
    #[must_use]
    pub fn event_card_controller(&self) -> Option<PlayerId> {
        if let Some(clone) = &self.event.params.clone {
            return Some(clone.controller);
        }
        self.event
            .card()
            .and_then(|c| self.state.try_card(c))
            .map(|c| c.controller)
    }

    /// Type of the event's card, from its snapshot if one exists.
    #[must_use]
    pub fn event_card_type(&self) -> Option<CardType> {
        if let Some(clone) = &self.event.params.clone {
            return Some(clone.card_type);
        }
        self.event.card().and_then(|c| self.state.card_type(c))
    }
}

/// Closure condition.
#[derive(Clone)]
pub struct TriggerPredicate(pub Arc<dyn Fn(&TriggerContext<'_>) -> bool + Send + Sync>);

impl std::fmt::Debug for TriggerPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TriggerPredicate(..)")
    }
}

/// Condition for a trigger to fire.
#[derive(Clone, Debug, Default)]
pub enum TriggerCondition {
    /// Always fires.
    #[default]
    Always,
    /// Never fires.
    Never,
    /// The event's card is the ability's source.
    EventCardIsSource,
    /// The event's attacker is the ability's source.
    AttackerIsSource,
    /// The event's damage came from the ability's source.
    DamageSourceIsSource,
    /// The event's card is a unit.
    EventCardIsUnit,
    /// The event's card has one of these types.
    EventCardType(SmallVec<[CardType; 2]>),
    /// The event's card relates to the resolving player.
    EventCardControlledBy(Relation),
    /// The event is part of a destruction.
    TriggeredByDestroy,
    /// The event's amount is at least this much.
    AmountAtLeast(i32),
    /// All conditions must be true.
    All(Vec<TriggerCondition>),
    /// At least one condition must be true.
    Any(Vec<TriggerCondition>),
    /// Negate a condition.
    Not(Box<TriggerCondition>),
    Custom(TriggerPredicate),
}

impl TriggerCondition {
    pub fn custom(f: impl Fn(&TriggerContext<'_>) -> bool + Send + Sync + 'static) -> Self {
        TriggerCondition::Custom(TriggerPredicate(Arc::new(f)))
    }

    /// Evaluate the condition.
    #[must_use]
    pub fn evaluate(&self, ctx: &TriggerContext<'_>) -> bool {
        match self {
            TriggerCondition::Always => true,
            TriggerCondition::Never => false,
            TriggerCondition::EventCardIsSource => ctx.event.card() == Some(ctx.source),
            TriggerCondition::AttackerIsSource => ctx.event.params.attacker == Some(ctx.source),
            TriggerCondition::DamageSourceIsSource => {
                ctx.event.params.damage_source == Some(ctx.source)
            }
            TriggerCondition::EventCardIsUnit => {
                ctx.event_card_type().map_or(false, CardType::is_unit)
            }
            TriggerCondition::EventCardType(types) => ctx
                .event_card_type()
                .map_or(false, |t| types.contains(&t)),
            TriggerCondition::EventCardControlledBy(relation) => {
                match (relation, ctx.event_card_controller()) {
                    (Relation::Any, Some(_)) => true,
                    (Relation::Controller, Some(p)) => p == ctx.player,
                    (Relation::Opponent, Some(p)) => p != ctx.player,
                    (_, None) => false,
                }
            }
            TriggerCondition::TriggeredByDestroy => {
                ctx.event.name == EventName::OnCardDestroyed
                    || ctx.event.params.triggering_event == Some(EventName::OnCardDestroyed)
            }
            TriggerCondition::AmountAtLeast(n) => ctx.event.params.amount >= *n,
            TriggerCondition::All(conditions) => conditions.iter().all(|c| c.evaluate(ctx)),
            TriggerCondition::Any(conditions) => conditions.iter().any(|c| c.evaluate(ctx)),
            TriggerCondition::Not(inner) => !inner.evaluate(ctx),
            TriggerCondition::Custom(f) => (f.0)(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cards::{Card, CardDefinition, CardSnapshot};
    use crate::core::GameConfig;
    use crate::events::EventContext;
    use crate::zones::Location;

    fn state_with_card(owner: PlayerId) -> (GameState, EntityId) {
        let mut state = GameState::new(GameConfig::new(2));
        let def = Arc::new(CardDefinition::new("ally", "Ally", CardType::Ally).with_life(2));
        let id = state.alloc_entity();
        state.insert_card(Card::new(id, def, owner, Location::PlayArea));
        (state, id)
    }

    fn event(name: EventName, card: EntityId) -> GameEvent {
        GameEvent::new(name, EventContext::new(PlayerId(0))).with_card(card)
    }

    #[test]
    fn test_event_card_is_source() {
        let (state, id) = state_with_card(PlayerId(0));
        let ev = event(EventName::OnCardEntersPlay, id);
        let ctx = TriggerContext::new(&state, &ev, PlayerId(0), id);
        assert!(TriggerCondition::EventCardIsSource.evaluate(&ctx));

        let other = TriggerContext::new(&state, &ev, PlayerId(0), EntityId(77));
        assert!(!TriggerCondition::EventCardIsSource.evaluate(&other));
    }

    #[test]
    fn test_controller_relation_uses_snapshot() {
        let (state, id) = state_with_card(PlayerId(1));
        let mut ev = event(EventName::OnCardDestroyed, id);
        let ctx = TriggerContext::new(&state, &ev, PlayerId(0), EntityId(50));
        assert!(TriggerCondition::EventCardControlledBy(Relation::Opponent).evaluate(&ctx));

        // The snapshot says player 0 controlled it when it was destroyed.
        let mut snapshot = CardSnapshot::capture(&state, id).unwrap();
        snapshot.controller = PlayerId(0);
        ev.params.clone = Some(Box::new(snapshot));
        let ctx = TriggerContext::new(&state, &ev, PlayerId(0), EntityId(50));
        assert!(!TriggerCondition::EventCardControlledBy(Relation::Opponent).evaluate(&ctx));
        assert!(TriggerCondition::EventCardControlledBy(Relation::Controller).evaluate(&ctx));
    }

    #[test]
    fn test_combinators() {
        let (state, id) = state_with_card(PlayerId(0));
        let ev = event(EventName::OnDamageApplied, id).with_amount(3);
        let ctx = TriggerContext::new(&state, &ev, PlayerId(0), id);

        let both = TriggerCondition::All(vec![
            TriggerCondition::EventCardIsUnit,
            TriggerCondition::AmountAtLeast(3),
        ]);
        assert!(both.evaluate(&ctx));

        let either = TriggerCondition::Any(vec![
            TriggerCondition::Never,
            TriggerCondition::AmountAtLeast(4),
        ]);
        assert!(!either.evaluate(&ctx));
        assert!(TriggerCondition::Not(Box::new(either)).evaluate(&ctx));

        let custom = TriggerCondition::custom(|ctx| ctx.event.params.amount == 3);
        assert!(custom.evaluate(&ctx));
    }

    #[test]
    fn test_triggered_by_destroy() {
        let (state, id) = state_with_card(PlayerId(0));
        let mut ev = event(EventName::OnCardLeavesPlay, id);
        let ctx = TriggerContext::new(&state, &ev, PlayerId(0), id);
        assert!(!TriggerCondition::TriggeredByDestroy.evaluate(&ctx));

        ev.params.triggering_event = Some(EventName::OnCardDestroyed);
        let ctx = TriggerContext::new(&state, &ev, PlayerId(0), id);
        assert!(TriggerCondition::TriggeredByDestroy.evaluate(&ctx));
    }
}
