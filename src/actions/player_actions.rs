//! Player resource actions: exhausting dice and spending actions.

use smallvec::SmallVec;

use crate::abilities::AbilityContext;
use crate::core::PlayerId;
use crate::dice::DieId;
use crate::events::{EventArena, EventHandler, EventId, EventName, GameEvent};

#[derive(Clone, Debug, Default)]
pub struct DieProps {
    pub dice: SmallVec<[DieId; 4]>,
    /// Whose dice; defaults to the acting player.
    pub player: Option<PlayerId>,
}

impl DieProps {
    pub(super) fn event_array(&self, events: &mut EventArena, ctx: &AbilityContext) -> Vec<EventId> {
        if self.dice.is_empty() {
            return Vec::new();
        }
        let mut event = GameEvent::new(EventName::OnDieExhausted, ctx.event_context())
            .with_player(self.player.unwrap_or(ctx.player))
            .with_amount(self.dice.len() as i32)
            .with_handler(EventHandler::ExhaustDice)
            .without_game_state_check();
        event.params.dice = self.dice.clone();
        vec![events.push(event)]
    }
}

#[derive(Clone, Debug, Default)]
pub struct SpendActionProps {
    /// Main action if set, side action otherwise.
    pub main: bool,
    pub player: Option<PlayerId>,
}

impl SpendActionProps {
    pub(super) fn event_array(&self, events: &mut EventArena, ctx: &AbilityContext) -> Vec<EventId> {
        let event = GameEvent::new(EventName::OnActionSpent, ctx.event_context())
            .with_player(self.player.unwrap_or(ctx.player))
            .with_handler(EventHandler::SpendAction { main: self.main })
            .without_game_state_check();
        vec![events.push(event)]
    }
}
