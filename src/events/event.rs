//! Game events.
//!
//! A [`GameEvent`] is a pending or executed state change: a name drawn from
//! the closed [`EventName`] set, typed parameters, an optional precondition,
//! a handler and links to the events it spawned. Events live in an
//! [`EventArena`] for the lifetime of a game and are referred to by
//! [`EventId`], so parent/child links and a triggered ability's reference to
//! its triggering event stay valid after the event executes.
//!
//! Handlers are data ([`EventHandler`]), executed by the pipeline exactly
//! once.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::abilities::ContextId;
use crate::cards::{CardSnapshot, TokenKind};
use crate::core::{EntityId, PlayerId};
use crate::dice::DieId;
use crate::effects::Restriction;
use crate::error::{Result, RulesError};
use crate::zones::{Location, ZonePosition};

use super::window::WindowId;

/// Unique identifier for an event within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u32);

impl EventId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event({})", self.0)
    }
}

/// Every event name the rules emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    OnDamageDealt,
    OnDamagePreventedByArmor,
    OnDamageApplied,
    OnDamagePrevented,
    OnCardDestroyed,
    OnCardLeavesPlay,
    OnCardEntersPlay,
    OnCardPlayed,
    OnCardMoved,
    OnCardDiscarded,
    OnCardPurged,
    OnMoveCard,
    OnFight,
    OnCardExhausted,
    OnCardReadied,
    OnAddToken,
    OnRemoveToken,
    OnDieExhausted,
    OnActionSpent,
    OnUpgradeAttached,
    OnTurnEnded,
    OnRoundEnded,
}

impl EventName {
    pub const ALL: [EventName; 22] = [
        EventName::OnDamageDealt,
        EventName::OnDamagePreventedByArmor,
        EventName::OnDamageApplied,
        EventName::OnDamagePrevented,
        EventName::OnCardDestroyed,
        EventName::OnCardLeavesPlay,
        EventName::OnCardEntersPlay,
        EventName::OnCardPlayed,
        EventName::OnCardMoved,
        EventName::OnCardDiscarded,
        EventName::OnCardPurged,
        EventName::OnMoveCard,
        EventName::OnFight,
        EventName::OnCardExhausted,
        EventName::OnCardReadied,
        EventName::OnAddToken,
        EventName::OnRemoveToken,
        EventName::OnDieExhausted,
        EventName::OnActionSpent,
        EventName::OnUpgradeAttached,
        EventName::OnTurnEnded,
        EventName::OnRoundEnded,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::OnDamageDealt => "onDamageDealt",
            EventName::OnDamagePreventedByArmor => "onDamagePreventedByArmor",
            EventName::OnDamageApplied => "onDamageApplied",
            EventName::OnDamagePrevented => "onDamagePrevented",
            EventName::OnCardDestroyed => "onCardDestroyed",
            EventName::OnCardLeavesPlay => "onCardLeavesPlay",
            EventName::OnCardEntersPlay => "onCardEntersPlay",
            EventName::OnCardPlayed => "onCardPlayed",
            EventName::OnCardMoved => "onCardMoved",
            EventName::OnCardDiscarded => "onCardDiscarded",
            EventName::OnCardPurged => "onCardPurged",
            EventName::OnMoveCard => "onMoveCard",
            EventName::OnFight => "onFight",
            EventName::OnCardExhausted => "onCardExhausted",
            EventName::OnCardReadied => "onCardReadied",
            EventName::OnAddToken => "onAddToken",
            EventName::OnRemoveToken => "onRemoveToken",
            EventName::OnDieExhausted => "onDieExhausted",
            EventName::OnActionSpent => "onActionSpent",
            EventName::OnUpgradeAttached => "onUpgradeAttached",
            EventName::OnTurnEnded => "onTurnEnded",
            EventName::OnRoundEnded => "onRoundEnded",
        }
    }
}

impl std::str::FromStr for EventName {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self> {
        EventName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| RulesError::UnknownEvent(s.to_string()))
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of damage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageType {
    #[default]
    #[serde(rename = "card effect")]
    CardEffect,
    #[serde(rename = "attack")]
    Attack,
    #[serde(rename = "counter")]
    Counter,
}

/// Typed event parameters. Which fields are meaningful depends on the
/// event name.
#[derive(Clone, Debug, Default)]
pub struct EventParams {
    pub card: Option<EntityId>,
    pub player: Option<PlayerId>,
    pub amount: i32,
    pub damage_source: Option<EntityId>,
    pub damage_type: DamageType,
    pub ignore_armor: bool,
    pub bonus: bool,
    pub purge: bool,
    /// Damage prevented so far (armor and prevention effects).
    pub prevented: i32,
    /// Extra prevention added to an armor event by interrupts.
    pub extra_prevention: i32,
    pub fight_event: Option<EventId>,
    pub destroy_event: Option<EventId>,
    /// Cards destroyed as a result of this fight.
    pub destroyed: SmallVec<[EntityId; 2]>,
    pub attacker: Option<EntityId>,
    /// The card as it was when the event executed (destroy, leave play).
    pub clone: Option<Box<CardSnapshot>>,
    pub triggering_event: Option<EventName>,
    pub from: Option<Location>,
    pub to: Option<Location>,
    pub token: Option<TokenKind>,
    pub dice: SmallVec<[DieId; 4]>,
}

/// A precondition checked immediately before the handler runs. An event
/// whose condition fails is cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventCondition {
    AmountPositive,
    CardInPlay,
    CardIn(Location),
}

/// The state change an event performs when it executes.
#[derive(Clone, Debug, PartialEq)]
pub enum EventHandler {
    /// Marker events whose change already happened.
    Noop,
    /// Opens the armor step (or applies directly when armor is ignored).
    DealDamage,
    PreventByArmor { dealt: EventId, applied: EventId },
    ApplyDamage { dealt: EventId },
    PreventDamage { target: EventId },
    Destroy,
    LeavePlay { destination: Location },
    PutIntoPlay { controller: PlayerId },
    PlayCard { destination: Location },
    MoveCard { destination: Location, position: Option<ZonePosition> },
    Exhaust,
    Ready,
    AddToken { kind: TokenKind, amount: u32 },
    RemoveToken { kind: TokenKind, amount: Option<u32> },
    ExhaustDice,
    SpendAction { main: bool },
    AttachUpgrade { parent: EntityId },
}

/// Who caused an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub player: PlayerId,
    pub source: Option<EntityId>,
    pub ability: Option<ContextId>,
}

impl EventContext {
    #[must_use]
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            source: None,
            ability: None,
        }
    }
}

/// A game event.
#[derive(Clone, Debug)]
pub struct GameEvent {
    pub id: EventId,
    pub name: EventName,
    pub params: EventParams,
    pub condition: Option<EventCondition>,
    pub handler: EventHandler,
    /// A `CardCannot` restriction that, if in force on `params.card` when the
    /// event is about to execute, cancels it.
    pub restriction: Option<Restriction>,
    pub context: EventContext,
    pub parent: Option<EventId>,
    pub sub_events: SmallVec<[EventId; 4]>,
    /// The window the event belongs to.
    pub window: Option<WindowId>,
    /// Skip the game-state check after a window containing only such
    /// events.
    pub no_game_state_check: bool,
    /// Run this event in its own nested window as soon as it is spawned.
    pub open_reaction_window: bool,
    pub executed: bool,
    pub cancelled: bool,
}

impl GameEvent {
    /// Create an event with no handler. The id is assigned when the event is
    /// pushed into an arena.
    pub fn new(name: EventName, context: EventContext) -> Self {
        Self {
            id: EventId(u32::MAX),
            name,
            params: EventParams::default(),
            condition: None,
            handler: EventHandler::Noop,
            restriction: None,
            context,
            parent: None,
            sub_events: SmallVec::new(),
            window: None,
            no_game_state_check: false,
            open_reaction_window: false,
            executed: false,
            cancelled: false,
        }
    }

    #[must_use]
    pub fn with_card(mut self, card: EntityId) -> Self {
        self.params.card = Some(card);
        self
    }

    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.params.player = Some(player);
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: i32) -> Self {
        self.params.amount = amount;
        self
    }

    #[must_use]
    pub fn with_handler(mut self, handler: EventHandler) -> Self {
        self.handler = handler;
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: EventCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.restriction = Some(restriction);
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: EventParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn without_game_state_check(mut self) -> Self {
        self.no_game_state_check = true;
        self
    }

    #[must_use]
    pub fn with_reaction_window(mut self) -> Self {
        self.open_reaction_window = true;
        self
    }

    #[must_use]
    pub fn card(&self) -> Option<EntityId> {
        self.params.card
    }

    /// Neither cancelled nor already executed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.cancelled && !self.executed
    }
}

/// Storage for every event created in a game.
#[derive(Clone, Debug, Default)]
pub struct EventArena {
    events: Vec<GameEvent>,
    spawned: Vec<EventId>,
}

impl EventArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an event and assign its id.
    pub fn push(&mut self, mut event: GameEvent) -> EventId {
        let id = EventId(self.events.len() as u32);
        event.id = id;
        self.events.push(event);
        id
    }

    pub fn get(&self, id: EventId) -> Result<&GameEvent> {
        self.events
            .get(id.0 as usize)
            .ok_or_else(|| RulesError::InvariantViolation(format!("{id} does not exist")))
    }

    pub fn get_mut(&mut self, id: EventId) -> Result<&mut GameEvent> {
        self.events
            .get_mut(id.0 as usize)
            .ok_or_else(|| RulesError::InvariantViolation(format!("{id} does not exist")))
    }

    /// Attach `child` as a sub-event of `parent`. The pipeline routes
    /// spawned sub-events after the running handler returns.
    pub fn add_sub_event(&mut self, parent: EventId, child: EventId) -> Result<()> {
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.sub_events.push(child);
        self.spawned.push(child);
        Ok(())
    }

    /// Sub-events attached since the last call, in attachment order.
    pub fn take_spawned(&mut self) -> Vec<EventId> {
        std::mem::take(&mut self.spawned)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EventContext {
        EventContext::new(PlayerId(0))
    }

    #[test]
    fn test_event_name_round_trip() {
        for name in EventName::ALL {
            let parsed: EventName = name.as_str().parse().unwrap();
            assert_eq!(parsed, name);
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, format!("\"{}\"", name));
        }
    }

    #[test]
    fn test_unknown_event_name() {
        let err = "onCardDrawn".parse::<EventName>().unwrap_err();
        assert_eq!(err, RulesError::UnknownEvent("onCardDrawn".into()));
    }

    #[test]
    fn test_event_builder() {
        let event = GameEvent::new(EventName::OnDamageApplied, ctx())
            .with_card(EntityId(3))
            .with_amount(2)
            .with_condition(EventCondition::AmountPositive)
            .without_game_state_check();

        assert_eq!(event.card(), Some(EntityId(3)));
        assert_eq!(event.params.amount, 2);
        assert!(event.no_game_state_check);
        assert!(event.is_pending());
    }

    #[test]
    fn test_arena_sub_events() {
        let mut arena = EventArena::new();
        let parent = arena.push(GameEvent::new(EventName::OnDamageDealt, ctx()));
        let child = arena.push(GameEvent::new(EventName::OnDamageApplied, ctx()));

        arena.add_sub_event(parent, child).unwrap();

        assert_eq!(arena.get(child).unwrap().parent, Some(parent));
        assert_eq!(arena.get(parent).unwrap().sub_events.as_slice(), &[child]);
        assert_eq!(arena.take_spawned(), vec![child]);
        assert!(arena.take_spawned().is_empty());
        assert!(arena.get(EventId(99)).is_err());
    }
}
