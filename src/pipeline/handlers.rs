//! Event handlers.
//!
//! Each [`EventHandler`] variant is executed here, exactly once per event.
//! A handler mutates the game state and may attach sub-events to the
//! running event; the window routes those after the handler returns.

use tracing::trace;

use crate::cards::{CardSnapshot, CardType, TokenKind};
use crate::core::{EntityId, GameState};
use crate::error::{Result, RulesError};
use crate::events::{
    EventArena, EventCondition, EventHandler, EventId, EventName, GameEvent,
};
use crate::effects::Restriction;
use crate::zones::Location;

/// Whether the event may still execute: its condition holds and no
/// restriction it names is in force on its card.
#[must_use]
pub(crate) fn can_execute(state: &GameState, event: &GameEvent) -> bool {
    let card = event.card().and_then(|c| state.try_card(c));
    let condition_holds = match event.condition {
        None => true,
        Some(EventCondition::AmountPositive) => event.params.amount > 0,
        Some(EventCondition::CardInPlay) => card.map_or(false, |c| c.location.is_in_play()),
        Some(EventCondition::CardIn(location)) => card.map_or(false, |c| c.location == location),
    };
    let allowed = match (event.restriction, event.card()) {
        (Some(restriction), Some(card)) => state.allows(card, restriction),
        _ => true,
    };
    condition_holds && allowed
}

fn event_card(event: &GameEvent) -> Result<EntityId> {
    event.card().ok_or_else(|| {
        RulesError::InvariantViolation(format!("{} {} has no card", event.name, event.id))
    })
}

/// Attach a new sub-event to `parent`.
fn spawn(events: &mut EventArena, parent: EventId, child: GameEvent) -> Result<EventId> {
    let id = events.push(child);
    events.add_sub_event(parent, id)?;
    Ok(id)
}

/// Execute an event's handler.
pub(crate) fn execute(state: &mut GameState, events: &mut EventArena, id: EventId) -> Result<()> {
    let event = events.get(id)?.clone();
    if event.executed {
        return Err(RulesError::InvariantViolation(format!("{id} executed twice")));
    }
    events.get_mut(id)?.executed = true;
    trace!(event = %id, name = %event.name, "executing event");

    match &event.handler {
        EventHandler::Noop => {}
        EventHandler::DealDamage => deal_damage(state, events, &event)?,
        EventHandler::PreventByArmor { dealt, applied } => {
            let prevention = (event.params.amount + event.params.extra_prevention).max(0);
            let dealt_amount = events.get(*dealt)?.params.amount;
            let prevented = prevention.min(dealt_amount);
            events.get_mut(id)?.params.prevented = prevented;
            let dealt = events.get_mut(*dealt)?;
            dealt.params.amount -= prevented;
            dealt.params.prevented += prevented;
            let applied = events.get_mut(*applied)?;
            applied.params.amount = (applied.params.amount - prevented).max(0);
            applied.params.prevented += prevented;
        }
        EventHandler::ApplyDamage { dealt } => apply_damage(state, events, &event, *dealt)?,
        EventHandler::PreventDamage { target } => {
            let amount = event.params.amount.max(0);
            let target = events.get_mut(*target)?;
            if target.is_pending() {
                if matches!(target.handler, EventHandler::PreventByArmor { .. }) {
                    target.params.extra_prevention += amount;
                } else {
                    let prevented = amount.min(target.params.amount);
                    target.params.amount -= prevented;
                    target.params.prevented += prevented;
                }
            }
        }
        EventHandler::Destroy => {
            let card = event_card(&event)?;
            let snapshot = CardSnapshot::capture(state, card)?;
            let c = state.card(card)?;
            let destination = if event.params.purge {
                Location::Purged
            } else if c.printed_type().is_conjured() {
                Location::Archives
            } else {
                Location::Discard
            };
            events.get_mut(id)?.params.clone = Some(Box::new(snapshot.clone()));

            let mut leave = GameEvent::new(EventName::OnCardLeavesPlay, event.context)
                .with_card(card)
                .with_handler(EventHandler::LeavePlay { destination });
            leave.params.triggering_event = Some(EventName::OnCardDestroyed);
            leave.params.destroy_event = Some(id);
            leave.params.clone = Some(Box::new(snapshot));
            spawn(events, id, leave)?;
        }
        EventHandler::LeavePlay { destination } => {
            let card = event_card(&event)?;
            if events.get(id)?.params.clone.is_none() {
                let snapshot = CardSnapshot::capture(state, card)?;
                events.get_mut(id)?.params.clone = Some(Box::new(snapshot));
            }
            leave_play(state, card, *destination)?;
        }
        EventHandler::PutIntoPlay { controller } => {
            let card = event_card(&event)?;
            state.card_mut(card)?.controller = *controller;
            state.move_card(card, Location::PlayArea, Some(*controller), None)?;
        }
        EventHandler::PlayCard { destination } => {
            let card = event_card(&event)?;
            let player = event.params.player.unwrap_or(event.context.player);
            if *destination == Location::PlayArea {
                let enters = GameEvent::new(EventName::OnCardEntersPlay, event.context)
                    .with_card(card)
                    .with_handler(EventHandler::PutIntoPlay { controller: player });
                spawn(events, id, enters)?;
            } else {
                state.move_card(card, *destination, Some(player), None)?;
            }
        }
        EventHandler::MoveCard {
            destination,
            position,
        } => {
            let card = event_card(&event)?;
            state.move_card(card, *destination, None, *position)?;
        }
        EventHandler::Exhaust => state.card_mut(event_card(&event)?)?.exhaust(),
        EventHandler::Ready => state.card_mut(event_card(&event)?)?.ready(),
        EventHandler::AddToken { kind, amount } => {
            state.card_mut(event_card(&event)?)?.add_token(kind.clone(), *amount);
        }
        EventHandler::RemoveToken { kind, amount } => {
            let card = state.card_mut(event_card(&event)?)?;
            let removed = match amount {
                Some(n) => card.remove_token(kind, *n),
                None => card.tokens.clear_kind(kind),
            };
            events.get_mut(id)?.params.amount = removed as i32;
        }
        EventHandler::ExhaustDice => {
            let player = event.params.player.unwrap_or(event.context.player);
            let p = state.player_mut(player)?;
            for &die in &event.params.dice {
                let d = p.die_mut(die).ok_or_else(|| {
                    RulesError::InvariantViolation(format!("{player} has no {die}"))
                })?;
                d.exhausted = true;
            }
        }
        EventHandler::SpendAction { main } => {
            let player = event.params.player.unwrap_or(event.context.player);
            let p = state.player_mut(player)?;
            if *main {
                p.main_actions = p.main_actions.saturating_sub(1);
            } else {
                p.side_actions = p.side_actions.saturating_sub(1);
            }
        }
        EventHandler::AttachUpgrade { parent } => {
            let upgrade = event_card(&event)?;
            let board = state.card(*parent)?.controller;
            state.move_card(upgrade, Location::PlayArea, Some(board), None)?;
            state.card_mut(upgrade)?.parent = Some(*parent);
            state.card_mut(*parent)?.upgrades.push(upgrade);
        }
    }
    Ok(())
}

fn deal_damage(state: &GameState, events: &mut EventArena, event: &GameEvent) -> Result<()> {
    let card = event_card(event)?;
    let amount = event.params.amount;
    let armor = state.armor(card);

    let mut applied = GameEvent::new(EventName::OnDamageApplied, event.context)
        .with_params(event.params.clone())
        .with_condition(EventCondition::AmountPositive)
        .with_restriction(Restriction::BeDamaged)
        .with_handler(EventHandler::ApplyDamage { dealt: event.id })
        .without_game_state_check();
    applied.params.card = Some(card);

    if event.params.ignore_armor {
        spawn(events, event.id, applied)?;
        return Ok(());
    }

    // The armor step runs in its own window before the damage is applied,
    // even at zero armor, so interrupts can add prevention.
    let applied = events.push(applied);
    let armor_event = GameEvent::new(EventName::OnDamagePreventedByArmor, event.context)
        .with_card(card)
        .with_amount(armor.max(0).min(amount))
        .with_handler(EventHandler::PreventByArmor {
            dealt: event.id,
            applied,
        })
        .with_reaction_window()
        .without_game_state_check();
    spawn(events, event.id, armor_event)?;
    events.add_sub_event(event.id, applied)?;
    Ok(())
}

fn apply_damage(
    state: &mut GameState,
    events: &mut EventArena,
    event: &GameEvent,
    dealt: EventId,
) -> Result<()> {
    let card = event_card(event)?;
    if state.card(card)?.location != Location::PlayArea {
        return Ok(());
    }
    let amount = event.params.amount.max(0) as u32;
    state.card_mut(card)?.add_token(TokenKind::Damage, amount);

    let c = state.card(card)?;
    let lethal = c.damage() as i32 >= state.life(card);
    let destroyable = !c.moribund
        && c.printed_type() != CardType::Phoenixborn
        && state.allows(card, Restriction::BeDestroyed);
    if !(lethal && destroyable) {
        return Ok(());
    }

    state.card_mut(card)?.moribund = true;
    let mut destroy = GameEvent::new(EventName::OnCardDestroyed, event.context)
        .with_card(card)
        .with_condition(EventCondition::CardInPlay)
        .with_restriction(Restriction::BeDestroyed)
        .with_handler(EventHandler::Destroy);
    destroy.params.damage_source = event.params.damage_source;
    destroy.params.purge = event.params.purge;
    destroy.params.fight_event = event.params.fight_event;
    let destroy = spawn(events, event.id, destroy)?;

    events.get_mut(dealt)?.params.destroy_event = Some(destroy);
    if let Some(fight) = event.params.fight_event {
        events.get_mut(fight)?.params.destroyed.push(card);
    }
    Ok(())
}

/// Take a card out of play: its upgrades go to their owners' piles, its
/// in-play state resets and it moves to its owner's `destination`.
fn leave_play(state: &mut GameState, card: EntityId, destination: Location) -> Result<()> {
    let upgrades = std::mem::take(&mut state.card_mut(card)?.upgrades);
    for upgrade in upgrades {
        let u = state.card_mut(upgrade)?;
        let pile = if u.printed_type().is_conjured() {
            Location::Archives
        } else {
            Location::Discard
        };
        let owner = u.owner;
        u.on_leaves_play();
        state.move_card(upgrade, pile, Some(owner), None)?;
    }

    if let Some(parent) = state.card(card)?.parent {
        if let Ok(p) = state.card_mut(parent) {
            p.upgrades.retain(|&u| u != card);
        }
    }

    let c = state.card_mut(card)?;
    let owner = c.owner;
    c.on_leaves_play();
    state.move_card(card, destination, Some(owner), None)?;
    Ok(())
}
