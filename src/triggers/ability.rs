//! Triggered abilities.
//!
//! A [`TriggeredAbility`] maps event names to conditions. When an event with
//! one of those names reaches the matching stage of a window, the pipeline
//! asks [`TriggeredAbility::is_triggered_by_event`] and then
//! [`TriggeredAbility::meets_requirements`] for every player; each pass
//! becomes a choice offered to that player.

use serde::{Deserialize, Serialize};

use crate::abilities::{AbilityContext, AbilityLimit, AbilityPlan, Requirement, TargetSpec};
use crate::actions::GameAction;
use crate::cards::CardType;
use crate::core::{EntityId, GameState, PlayerId};
use crate::costs::Cost;
use crate::effects::EffectKind;
use crate::error::Result;
use crate::events::{EventName, GameEvent};
use crate::zones::{Location, LocationScope};

use super::condition::{TriggerCondition, TriggerContext};

/// Unique identifier for a triggered ability instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbilityId(pub u32);

impl AbilityId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for AbilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ability({})", self.0)
    }
}

/// When a triggered ability is offered and whether it may be declined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    Reaction,
    ForcedReaction,
    Interrupt,
    ForcedInterrupt,
}

impl AbilityKind {
    #[must_use]
    pub fn is_forced(self) -> bool {
        matches!(self, AbilityKind::ForcedReaction | AbilityKind::ForcedInterrupt)
    }
}

/// A reaction or interrupt declared by card text.
///
/// ```
/// use ashes_rules::actions::GameAction;
/// use ashes_rules::events::EventName;
/// use ashes_rules::triggers::{TriggerCondition, TriggeredAbility};
///
/// let consume = TriggeredAbility::new("Consume")
///     .on(EventName::OnCardDestroyed, TriggerCondition::EventCardIsUnit)
///     .with_action(GameAction::add_status_token());
/// assert_eq!(consume.when.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct TriggeredAbility {
    /// Assigned when the ability is added to the registry.
    pub id: AbilityId,
    /// The card carrying the ability; assigned with the id.
    pub card: EntityId,
    pub kind: AbilityKind,
    pub title: String,
    pub when: Vec<(EventName, TriggerCondition)>,
    pub scope: LocationScope,
    /// Every player may trigger it, not just the controller.
    pub any_player: bool,
    /// Only the controller's opponents may trigger it.
    pub triggered_by_opponent: bool,
    /// Resolve without a prompt when it is the only choice.
    pub auto_resolve: bool,
    /// Only fires on `onCardPlayed` as a play ability.
    pub play: bool,
    /// Only fires on `onFight` as a fight ability.
    pub fight: bool,
    pub costs: Vec<Cost>,
    pub target: Option<TargetSpec>,
    pub actions: Vec<GameAction>,
    pub limit: Option<AbilityLimit>,
    pub max: Option<u32>,
}

impl TriggeredAbility {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: AbilityId(u32::MAX),
            card: EntityId(u32::MAX),
            kind: AbilityKind::Reaction,
            title: title.into(),
            when: Vec::new(),
            scope: LocationScope::default(),
            any_player: false,
            triggered_by_opponent: false,
            auto_resolve: false,
            play: false,
            fight: false,
            costs: Vec::new(),
            target: None,
            actions: Vec::new(),
            limit: None,
            max: None,
        }
    }

    /// Listen for an event.
    #[must_use]
    pub fn on(mut self, name: EventName, condition: TriggerCondition) -> Self {
        self.when.push((name, condition));
        self
    }

    /// Listen for an event given by its wire name. Unknown names fail with
    /// `UnknownEvent` when the card is set up.
    pub fn on_named(self, name: &str, condition: TriggerCondition) -> Result<Self> {
        Ok(self.on(name.parse()?, condition))
    }

    #[must_use]
    pub fn with_kind(mut self, kind: AbilityKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn in_location(mut self, location: Location) -> Self {
        self.scope = LocationScope::only(location);
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: LocationScope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn any_player(mut self) -> Self {
        self.any_player = true;
        self
    }

    #[must_use]
    pub fn triggered_by_opponent(mut self) -> Self {
        self.triggered_by_opponent = true;
        self
    }

    #[must_use]
    pub fn auto_resolve(mut self) -> Self {
        self.auto_resolve = true;
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.costs.push(cost);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: GameAction) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: AbilityLimit) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }

    /// Event names the ability listens for, without repeats.
    #[must_use]
    pub fn event_names(&self) -> Vec<EventName> {
        let mut names: Vec<EventName> = Vec::new();
        for (name, _) in &self.when {
            if !names.contains(name) {
                names.push(*name);
            }
        }
        names
    }

    /// Whether the event fires the ability for `player`.
    #[must_use]
    pub fn is_triggered_by_event(&self, state: &GameState, event: &GameEvent, player: PlayerId) -> bool {
        let ctx = TriggerContext::new(state, event, player, self.card);
        let fires = self
            .when
            .iter()
            .any(|(name, condition)| *name == event.name && condition.evaluate(&ctx));
        if !fires {
            return false;
        }
        if self.play || self.fight {
            if (event.name == EventName::OnCardPlayed && !self.play)
                || (event.name == EventName::OnFight && !self.fight)
            {
                return false;
            }
        }
        true
    }

    /// Whether `player` may resolve the ability right now.
    pub fn meets_requirements(&self, state: &GameState, ctx: &AbilityContext) -> std::result::Result<(), Requirement> {
        let Some(card) = state.try_card(self.card) else {
            return Err(Requirement::Location);
        };
        if state.is_blank(self.card) {
            return Err(Requirement::Blank);
        }
        if !self.player_may_trigger(state, ctx.player) {
            return Err(Requirement::Player);
        }
        if !self.scope.includes(card.location) {
            return Err(Requirement::Location);
        }
        AbilityPlan::for_triggered(self).check(state, ctx)
    }

    fn player_may_trigger(&self, state: &GameState, player: PlayerId) -> bool {
        let Some(card) = state.try_card(self.card) else {
            return false;
        };
        if self.any_player {
            return true;
        }
        if self.triggered_by_opponent {
            return player != card.controller;
        }
        player == card.controller
            || state.has_effect(self.card, EffectKind::CanBeTriggeredByOpponent)
            || (card.printed_type() == CardType::ReactionSpell
                && card.owner == player
                && card.location == Location::Hand)
    }
}
