//! Card actions: destruction, movement, play, exhaustion, tokens and
//! upgrades.

use crate::abilities::AbilityContext;
use crate::cards::{CardType, TokenKind};
use crate::core::{EntityId, GameState, PlayerId};
use crate::effects::Restriction;
use crate::events::{EventArena, EventCondition, EventHandler, EventId, EventName, GameEvent};
use crate::zones::{Location, ZonePosition};

use super::{ActionTarget, GameAction};

/// Properties shared by actions that only need a target.
#[derive(Clone, Debug, Default)]
pub struct TargetProps {
    pub target: ActionTarget,
}

#[derive(Clone, Debug, Default)]
pub struct DestroyProps {
    pub target: ActionTarget,
    /// Purge the card instead of discarding it.
    pub purge: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PutIntoPlayProps {
    pub target: ActionTarget,
    /// Defaults to the acting player.
    pub controller: Option<PlayerId>,
}

#[derive(Clone, Debug)]
pub struct MoveProps {
    pub target: ActionTarget,
    pub destination: Location,
    pub position: Option<ZonePosition>,
}

impl Default for MoveProps {
    fn default() -> Self {
        Self {
            target: ActionTarget::Default,
            destination: Location::Hand,
            position: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TokenProps {
    pub target: ActionTarget,
    pub kind: TokenKind,
    pub amount: u32,
}

impl Default for TokenProps {
    fn default() -> Self {
        Self {
            target: ActionTarget::Default,
            kind: TokenKind::Damage,
            amount: 1,
        }
    }
}

impl TokenProps {
    #[must_use]
    pub fn status(amount: u32) -> Self {
        Self {
            kind: TokenKind::Status,
            amount,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct RemoveTokenProps {
    pub target: ActionTarget,
    pub kind: TokenKind,
    /// `None` removes every token of the kind.
    pub amount: Option<u32>,
}

impl Default for RemoveTokenProps {
    fn default() -> Self {
        Self {
            target: ActionTarget::Default,
            kind: TokenKind::Damage,
            amount: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AttachProps {
    /// The card receiving the upgrade.
    pub target: ActionTarget,
    /// Defaults to the context's source.
    pub upgrade: Option<EntityId>,
}

#[derive(Clone, Debug, Default)]
pub struct PlayProps {
    pub target: ActionTarget,
    /// Defaults to where the card's type is played to.
    pub destination: Option<Location>,
}

/// Where a card of this type goes when played from hand.
#[must_use]
pub fn play_destination(card_type: CardType) -> Location {
    match card_type {
        CardType::Ally | CardType::Conjuration => Location::PlayArea,
        CardType::ReadySpell => Location::Spellboard,
        CardType::Phoenixborn => Location::PlayArea,
        _ => Location::Discard,
    }
}

pub(super) fn can_affect(
    action: &GameAction,
    state: &GameState,
    card: EntityId,
    ctx: &AbilityContext,
) -> bool {
    let Some(c) = state.try_card(card) else {
        return false;
    };
    match action {
        GameAction::Destroy(_) => {
            c.location.is_in_play() && state.allows(card, Restriction::BeDestroyed)
        }
        GameAction::PutIntoPlay(_) => !c.location.is_in_play(),
        GameAction::MoveCard(p) => {
            c.location != p.destination && state.allows(card, Restriction::BeMoved)
        }
        GameAction::Discard(_) => {
            c.location != Location::Discard && state.allows(card, Restriction::BeMoved)
        }
        GameAction::Purge(_) => c.location != Location::Purged,
        GameAction::Exhaust(_) => {
            c.location.is_in_play()
                && !c.is_exhausted()
                && state.allows(card, Restriction::BeExhausted)
        }
        GameAction::Ready(_) => {
            c.location.is_in_play()
                && c.is_exhausted()
                && state.allows(card, Restriction::BeReadied)
        }
        GameAction::AddToken(p) | GameAction::AddStatusToken(p) => {
            c.location.is_in_play() && p.amount > 0 && state.allows(card, Restriction::ReceiveTokens)
        }
        GameAction::RemoveToken(p) => {
            c.tokens.has(&p.kind) && state.allows(card, Restriction::LoseTokens)
        }
        GameAction::AttachUpgrade(p) => {
            c.location == Location::PlayArea && p.upgrade.or(ctx.source) != Some(card)
        }
        GameAction::PlayCard(_) => c.location == Location::Hand,
        _ => false,
    }
}

pub(super) fn event_for(
    action: &GameAction,
    state: &GameState,
    events: &mut EventArena,
    card: EntityId,
    ctx: &AbilityContext,
) -> EventId {
    let base = |name: EventName| GameEvent::new(name, ctx.event_context()).with_card(card);
    let in_play = state
        .try_card(card)
        .map_or(false, |c| c.location.is_in_play());

    let event = match action {
        GameAction::Destroy(p) => {
            let mut event = base(EventName::OnCardDestroyed)
                .with_condition(EventCondition::CardInPlay)
                .with_restriction(Restriction::BeDestroyed)
                .with_handler(EventHandler::Destroy);
            event.params.purge = p.purge;
            event
        }
        GameAction::PutIntoPlay(p) => base(EventName::OnCardEntersPlay).with_handler(
            EventHandler::PutIntoPlay {
                controller: p.controller.unwrap_or(ctx.player),
            },
        ),
        GameAction::MoveCard(p) => {
            leave_or_move(base, in_play, EventName::OnMoveCard, p.destination, p.position)
        }
        GameAction::Discard(_) => {
            leave_or_move(base, in_play, EventName::OnCardDiscarded, Location::Discard, None)
        }
        GameAction::Purge(_) => {
            leave_or_move(base, in_play, EventName::OnCardPurged, Location::Purged, None)
        }
        GameAction::Exhaust(_) => base(EventName::OnCardExhausted)
            .with_condition(EventCondition::CardInPlay)
            .with_restriction(Restriction::BeExhausted)
            .with_handler(EventHandler::Exhaust),
        GameAction::Ready(_) => base(EventName::OnCardReadied)
            .with_condition(EventCondition::CardInPlay)
            .with_restriction(Restriction::BeReadied)
            .with_handler(EventHandler::Ready),
        GameAction::AddToken(p) | GameAction::AddStatusToken(p) => {
            let mut event = base(EventName::OnAddToken)
                .with_amount(p.amount as i32)
                .with_restriction(Restriction::ReceiveTokens)
                .with_handler(EventHandler::AddToken {
                    kind: p.kind.clone(),
                    amount: p.amount,
                });
            event.params.token = Some(p.kind.clone());
            event
        }
        GameAction::RemoveToken(p) => {
            let mut event = base(EventName::OnRemoveToken)
                .with_restriction(Restriction::LoseTokens)
                .with_handler(EventHandler::RemoveToken {
                    kind: p.kind.clone(),
                    amount: p.amount,
                });
            event.params.token = Some(p.kind.clone());
            event
        }
        GameAction::AttachUpgrade(p) => {
            let upgrade = p.upgrade.or(ctx.source).unwrap_or(card);
            GameEvent::new(EventName::OnUpgradeAttached, ctx.event_context())
                .with_card(upgrade)
                .with_handler(EventHandler::AttachUpgrade { parent: card })
        }
        GameAction::PlayCard(p) => {
            let destination = p.destination.unwrap_or_else(|| {
                state
                    .card_type(card)
                    .map_or(Location::Discard, play_destination)
            });
            base(EventName::OnCardPlayed)
                .with_player(ctx.player)
                .with_condition(EventCondition::CardIn(Location::Hand))
                .with_handler(EventHandler::PlayCard { destination })
        }
        _ => base(EventName::OnCardMoved),
    };
    events.push(event)
}

/// Cards leaving play go through the leave-play handler so their in-play
/// state is reset; others just move.
fn leave_or_move(
    base: impl Fn(EventName) -> GameEvent,
    in_play: bool,
    name: EventName,
    destination: Location,
    position: Option<ZonePosition>,
) -> GameEvent {
    if in_play && !destination.is_in_play() {
        let mut event = base(EventName::OnCardLeavesPlay)
            .with_restriction(Restriction::BeMoved)
            .with_handler(EventHandler::LeavePlay { destination });
        event.params.triggering_event = Some(name);
        event
    } else {
        base(name)
            .with_restriction(Restriction::BeMoved)
            .with_handler(EventHandler::MoveCard {
                destination,
                position,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::abilities::{AbilityRef, ContextId};
    use crate::cards::{Card, CardDefinition};
    use crate::core::GameConfig;
    use crate::effects::Effect;

    fn setup() -> (GameState, EntityId, EntityId) {
        let mut state = GameState::new(GameConfig::new(2));
        let wolf = Arc::new(
            CardDefinition::new("masked-wolf", "Masked Wolf", CardType::Conjuration)
                .with_attack(2)
                .with_life(1),
        );
        let in_play = state.alloc_entity();
        state.insert_card(Card::new(in_play, wolf.clone(), PlayerId(0), Location::PlayArea));
        let archived = state.alloc_entity();
        state.insert_card(Card::new(archived, wolf, PlayerId(0), Location::Archives));
        (state, in_play, archived)
    }

    fn ctx() -> AbilityContext {
        AbilityContext::new(ContextId(0), PlayerId(0), None, AbilityRef::Framework)
    }

    #[test]
    fn test_put_into_play_only_from_out_of_play() {
        let (state, in_play, archived) = setup();
        let action = GameAction::put_into_play();
        assert!(action.can_affect(&state, archived, &ctx()));
        assert!(!action.can_affect(&state, in_play, &ctx()));
    }

    #[test]
    fn test_exhaust_and_ready() {
        let (mut state, in_play, _) = setup();
        assert!(GameAction::exhaust().can_affect(&state, in_play, &ctx()));
        assert!(!GameAction::ready().can_affect(&state, in_play, &ctx()));

        state.card_mut(in_play).unwrap().exhaust();
        assert!(!GameAction::exhaust().can_affect(&state, in_play, &ctx()));
        assert!(GameAction::ready().can_affect(&state, in_play, &ctx()));
    }

    #[test]
    fn test_destroy_respects_restriction() {
        let (mut state, in_play, _) = setup();
        assert!(GameAction::destroy().can_affect(&state, in_play, &ctx()));
        state
            .effects
            .add(Some(in_play), Effect::card_cannot(Restriction::BeDestroyed));
        assert!(!GameAction::destroy().can_affect(&state, in_play, &ctx()));
    }

    #[test]
    fn test_discard_from_play_leaves_play() {
        let (state, in_play, archived) = setup();
        let mut events = EventArena::new();

        let id = event_for(&GameAction::discard(), &state, &mut events, in_play, &ctx());
        let event = events.get(id).unwrap();
        assert_eq!(event.name, EventName::OnCardLeavesPlay);
        assert_eq!(event.params.triggering_event, Some(EventName::OnCardDiscarded));

        let id = event_for(&GameAction::discard(), &state, &mut events, archived, &ctx());
        assert_eq!(events.get(id).unwrap().name, EventName::OnCardDiscarded);
    }

    #[test]
    fn test_play_destination() {
        assert_eq!(play_destination(CardType::Ally), Location::PlayArea);
        assert_eq!(play_destination(CardType::ReadySpell), Location::Spellboard);
        assert_eq!(play_destination(CardType::ActionSpell), Location::Discard);
    }
}
