//! The game-state check run when a window closes.
//!
//! Brings derived state in line with the effects in force: controllers
//! follow take-control effects, effects tied to a card's presence end when
//! it leaves play, and lethally damaged cards are destroyed (or, for a
//! Phoenixborn, decide the game).

use tracing::{debug, info};

use crate::abilities::AbilityContext;
use crate::actions::{ActionTarget, GameAction};
use crate::cards::CardType;
use crate::core::GameState;
use crate::effects::{Duration, EffectMatch};
use crate::error::Result;
use crate::events::{EventArena, EventId};
use crate::zones::Location;

/// Run the check. Returns the destroy events it created; the caller opens a
/// fresh window for them.
pub(crate) fn check(
    state: &mut GameState,
    events: &mut EventArena,
    framework: &AbilityContext,
) -> Result<Vec<EventId>> {
    update_controllers(state)?;
    expire_while_in_play(state);
    lethal_damage(state, events, framework)
}

fn update_controllers(state: &mut GameState) -> Result<()> {
    for id in state.cards_in_play() {
        let Some(desired) = state.modified_controller(id) else {
            continue;
        };
        let card = state.card(id)?;
        if card.controller == desired {
            continue;
        }
        let location = card.location;
        debug!(card = %id, from = %card.controller, to = %desired, "control changed");
        state.card_mut(id)?.controller = desired;
        state.move_card(id, location, Some(desired), None)?;
    }
    Ok(())
}

fn expire_while_in_play(state: &mut GameState) {
    let in_play = |state: &GameState, id| {
        state
            .try_card(id)
            .map_or(false, |c| c.location.is_in_play())
    };
    let expired: Vec<_> = state
        .effects
        .iter()
        .filter(|e| e.effect.duration == Duration::WhileTargetInPlay)
        .filter(|e| match &e.effect.target {
            EffectMatch::Card(id) => !in_play(state, *id),
            EffectMatch::Cards(ids) => !ids.iter().any(|&id| in_play(state, id)),
            _ => false,
        })
        .map(|e| e.handle)
        .collect();
    for handle in expired {
        state.effects.remove(handle);
    }
}

fn lethal_damage(
    state: &mut GameState,
    events: &mut EventArena,
    framework: &AbilityContext,
) -> Result<Vec<EventId>> {
    let mut created = Vec::new();
    let mut doomed = Vec::new();
    for id in state.cards_in_play() {
        let card = state.card(id)?;
        if card.location != Location::PlayArea || card.moribund || card.damage() == 0 {
            continue;
        }
        if (card.damage() as i32) < state.life(id) {
            continue;
        }
        if card.printed_type() == CardType::Phoenixborn {
            if state.winner.is_none() {
                let loser = card.controller;
                let winner = loser.opponents(state.player_count()).first().copied();
                if let Some(winner) = winner {
                    info!(%winner, %loser, "phoenixborn destroyed");
                    state.winner = Some(winner);
                    state.log_message(format!("{} has been destroyed", state.card_name(id)));
                }
            }
            continue;
        }
        if state.is_unit(id) {
            doomed.push(id);
        }
    }

    for id in doomed {
        let destroy = GameAction::destroy().with_target(ActionTarget::Card(id));
        let ids = destroy.event_array(state, events, framework)?;
        if !ids.is_empty() {
            state.card_mut(id)?.moribund = true;
        }
        created.extend(ids);
    }
    Ok(created)
}
