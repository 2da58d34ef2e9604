//! Damage.
//!
//! Dealing damage produces one `onDamageDealt` event per affected card: the
//! primary targets first, each followed by its neighbors (left, then right)
//! at the splash amount. When a dealt event executes it spawns the armor
//! step and the application step; see `pipeline::handlers`.

use crate::abilities::AbilityContext;
use crate::core::{EntityId, GameState};
use crate::effects::{AmountFn, Restriction};
use crate::error::Result;
use crate::events::{
    DamageType, EventArena, EventCondition, EventHandler, EventId, EventName, EventParams,
    GameEvent,
};
use crate::zones::Location;

use super::{ActionSetup, ActionTarget, UNITS_AND_PHOENIXBORN};

/// Properties of a damage action.
#[derive(Clone, Debug, Default)]
pub struct DamageProps {
    pub target: ActionTarget,
    /// Fixed amount for every target.
    pub amount: Option<i32>,
    /// Per-card amount, used when `amount` is unset. Defaults to 1.
    pub amount_for_card: Option<AmountFn>,
    /// Damage dealt to each neighbor of each target.
    pub splash: i32,
    /// Defaults to the context's source.
    pub damage_source: Option<EntityId>,
    pub damage_type: DamageType,
    pub ignore_armor: bool,
    pub bonus: bool,
    /// Purge rather than discard if the damage destroys the card.
    pub purge: bool,
    pub fight_event: Option<EventId>,
}

impl DamageProps {
    pub(super) fn setup(&self) -> ActionSetup {
        let mut msg = String::from("deal ");
        if let Some(amount) = self.amount {
            msg.push_str(&format!("{amount} "));
        }
        msg.push_str("damage to {0}");
        if self.splash > 0 {
            msg.push_str(&format!(" and {} to their neighbors", self.splash));
        }
        ActionSetup::new("damage", &UNITS_AND_PHOENIXBORN, msg)
    }

    /// Amount dealt to the primary target `card`. Bonus damage adds the
    /// damage source's live bonus-damage effects.
    #[must_use]
    pub fn amount_for(&self, state: &GameState, card: EntityId, ctx: &AbilityContext) -> i32 {
        let base = match (&self.amount, &self.amount_for_card) {
            (Some(amount), _) => *amount,
            (None, Some(f)) => (f.0)(state, ctx.source, card),
            (None, None) => 1,
        };
        if !self.bonus {
            return base;
        }
        base + self
            .damage_source
            .or(ctx.source)
            .map_or(0, |source| state.bonus_damage(source))
    }

    pub(super) fn can_affect(&self, state: &GameState, card: EntityId, ctx: &AbilityContext) -> bool {
        if self.amount_for(state, card, ctx) == 0 {
            return false;
        }
        state
            .try_card(card)
            .map_or(false, |c| c.location == Location::PlayArea)
            && state.allows(card, Restriction::BeDamaged)
    }

    pub(super) fn event_array(
        &self,
        state: &GameState,
        events: &mut EventArena,
        ctx: &AbilityContext,
    ) -> Result<Vec<EventId>> {
        let mut result = Vec::new();
        let targets: Vec<EntityId> = self
            .target
            .resolve(ctx, events)
            .into_iter()
            .filter(|&c| {
                state
                    .card_type(c)
                    .map_or(false, |t| UNITS_AND_PHOENIXBORN.contains(&t))
                    && self.can_affect(state, c, ctx)
            })
            .collect();

        for card in targets {
            let amount = self.amount_for(state, card, ctx);
            result.push(events.push(self.event(card, amount, ctx)));
            if self.splash > 0 {
                for neighbor in state.neighbors(card) {
                    result.push(events.push(self.event(neighbor, self.splash, ctx)));
                }
            }
        }
        Ok(result)
    }

    fn event(&self, card: EntityId, amount: i32, ctx: &AbilityContext) -> GameEvent {
        let params = EventParams {
            card: Some(card),
            amount: amount.max(0),
            damage_source: self.damage_source.or(ctx.source),
            damage_type: self.damage_type,
            ignore_armor: self.ignore_armor,
            bonus: self.bonus,
            purge: self.purge,
            fight_event: self.fight_event,
            ..EventParams::default()
        };
        GameEvent::new(EventName::OnDamageDealt, ctx.event_context())
            .with_params(params)
            .with_condition(EventCondition::CardIn(Location::PlayArea))
            .with_restriction(Restriction::BeDamaged)
            .with_handler(EventHandler::DealDamage)
    }
}

/// Properties of a damage prevention action. It reduces the damage of the
/// event that triggered the ability: an armor step gains extra prevention, a
/// pending damage event loses up to `amount`.
#[derive(Clone, Debug, Default)]
pub struct PreventProps {
    pub amount: i32,
}

impl PreventProps {
    pub(super) fn event_array(&self, events: &mut EventArena, ctx: &AbilityContext) -> Result<Vec<EventId>> {
        let Some(target) = ctx.event else {
            return Ok(Vec::new());
        };
        let card = events.get(target)?.card();
        let mut event = GameEvent::new(EventName::OnDamagePrevented, ctx.event_context())
            .with_amount(self.amount)
            .with_handler(EventHandler::PreventDamage { target })
            .without_game_state_check();
        event.params.card = card;
        Ok(vec![events.push(event)])
    }
}
