//! Game actions.
//!
//! A [`GameAction`] is a stateless operator over the current game state:
//! it is parameterized by a properties struct (whose `Default` supplies the
//! default properties), describes itself through [`GameAction::setup`],
//! answers [`GameAction::can_affect`] for candidate cards and turns itself
//! into a list of events with [`GameAction::event_array`].
//!
//! `can_affect` has no side effects and is asked again at every stage that
//! needs it (target selection, event creation, and through event conditions
//! right before execution), since the state may change in between.
//!
//! ## Actions
//!
//! - [`damage`]: damage with splash, armor prevention and damage prevention
//! - [`card_actions`]: destroy, movement, play, exhaustion and tokens
//! - [`player_actions`]: dice and action spending

pub mod card_actions;
pub mod damage;
pub mod player_actions;

use smallvec::SmallVec;

use crate::abilities::AbilityContext;
use crate::cards::CardType;
use crate::core::{EntityId, GameState};
use crate::error::Result;
use crate::events::{EventArena, EventId};

pub use card_actions::{
    AttachProps, DestroyProps, MoveProps, PlayProps, PutIntoPlayProps, RemoveTokenProps,
    TargetProps, TokenProps,
};
pub use damage::{DamageProps, PreventProps};
pub use player_actions::{DieProps, SpendActionProps};

/// Which cards an action applies to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ActionTarget {
    /// The context's chosen targets, or its source if nothing was chosen.
    #[default]
    Default,
    Chosen,
    Source,
    Card(EntityId),
    Cards(SmallVec<[EntityId; 2]>),
    /// The card of the event that triggered the ability.
    EventCard,
}

impl ActionTarget {
    /// Resolve to concrete cards. Legality is not checked here.
    pub fn resolve(&self, ctx: &AbilityContext, events: &EventArena) -> SmallVec<[EntityId; 2]> {
        match self {
            ActionTarget::Default if !ctx.targets.is_empty() => ctx.targets.clone(),
            ActionTarget::Default | ActionTarget::Source => ctx.source.into_iter().collect(),
            ActionTarget::Chosen => ctx.targets.clone(),
            ActionTarget::Card(id) => SmallVec::from_elem(*id, 1),
            ActionTarget::Cards(ids) => ids.clone(),
            ActionTarget::EventCard => ctx
                .event
                .and_then(|e| events.get(e).ok())
                .and_then(|e| e.card())
                .into_iter()
                .collect(),
        }
    }

    /// Whether the target is picked by the player through a target prompt.
    #[must_use]
    pub fn uses_chosen_targets(&self) -> bool {
        matches!(self, ActionTarget::Default | ActionTarget::Chosen)
    }
}

/// What `setup` derives from an action's properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionSetup {
    pub name: &'static str,
    /// Card types the action may affect; empty means any.
    pub target_types: SmallVec<[CardType; 4]>,
    /// Log message; `{0}` stands for the affected cards.
    pub effect_msg: String,
}

impl ActionSetup {
    fn new(name: &'static str, target_types: &[CardType], effect_msg: impl Into<String>) -> Self {
        Self {
            name,
            target_types: target_types.iter().copied().collect(),
            effect_msg: effect_msg.into(),
        }
    }

    /// Whether the card's current type is one the action may affect.
    #[must_use]
    pub fn accepts_type(&self, state: &GameState, card: EntityId) -> bool {
        self.target_types.is_empty()
            || state
                .card_type(card)
                .map_or(false, |t| self.target_types.contains(&t))
    }
}

const UNITS_AND_PHOENIXBORN: [CardType; 3] =
    [CardType::Ally, CardType::Conjuration, CardType::Phoenixborn];

/// The closed vocabulary of game actions.
#[derive(Clone, Debug)]
pub enum GameAction {
    DealDamage(DamageProps),
    Destroy(DestroyProps),
    PutIntoPlay(PutIntoPlayProps),
    MoveCard(MoveProps),
    Discard(TargetProps),
    Purge(TargetProps),
    Exhaust(TargetProps),
    Ready(TargetProps),
    AddToken(TokenProps),
    RemoveToken(RemoveTokenProps),
    AddStatusToken(TokenProps),
    ExhaustDie(DieProps),
    PreventDamage(PreventProps),
    AttachUpgrade(AttachProps),
    PlayCard(PlayProps),
    SpendAction(SpendActionProps),
    /// Every step's events, in order.
    Sequence(Vec<GameAction>),
}

impl GameAction {
    pub fn deal_damage(amount: i32) -> Self {
        GameAction::DealDamage(DamageProps {
            amount: Some(amount),
            ..DamageProps::default()
        })
    }

    pub fn destroy() -> Self {
        GameAction::Destroy(DestroyProps::default())
    }

    pub fn put_into_play() -> Self {
        GameAction::PutIntoPlay(PutIntoPlayProps::default())
    }

    pub fn exhaust() -> Self {
        GameAction::Exhaust(TargetProps::default())
    }

    pub fn ready() -> Self {
        GameAction::Ready(TargetProps::default())
    }

    pub fn discard() -> Self {
        GameAction::Discard(TargetProps::default())
    }

    pub fn purge() -> Self {
        GameAction::Purge(TargetProps::default())
    }

    pub fn add_status_token() -> Self {
        GameAction::AddStatusToken(TokenProps::status(1))
    }

    /// Retarget an action.
    #[must_use]
    pub fn with_target(mut self, target: ActionTarget) -> Self {
        match &mut self {
            GameAction::DealDamage(p) => p.target = target,
            GameAction::Destroy(p) => p.target = target,
            GameAction::PutIntoPlay(p) => p.target = target,
            GameAction::MoveCard(p) => p.target = target,
            GameAction::Discard(p)
            | GameAction::Purge(p)
            | GameAction::Exhaust(p)
            | GameAction::Ready(p) => p.target = target,
            GameAction::AddToken(p) | GameAction::AddStatusToken(p) => p.target = target,
            GameAction::RemoveToken(p) => p.target = target,
            GameAction::AttachUpgrade(p) => p.target = target,
            GameAction::PlayCard(p) => p.target = target,
            GameAction::ExhaustDie(_)
            | GameAction::PreventDamage(_)
            | GameAction::SpendAction(_) => {}
            GameAction::Sequence(steps) => {
                *steps = std::mem::take(steps)
                    .into_iter()
                    .map(|s| s.with_target(target.clone()))
                    .collect();
            }
        }
        self
    }

    /// The card target of the action, if it targets cards.
    #[must_use]
    pub fn target(&self) -> Option<&ActionTarget> {
        match self {
            GameAction::DealDamage(p) => Some(&p.target),
            GameAction::Destroy(p) => Some(&p.target),
            GameAction::PutIntoPlay(p) => Some(&p.target),
            GameAction::MoveCard(p) => Some(&p.target),
            GameAction::Discard(p)
            | GameAction::Purge(p)
            | GameAction::Exhaust(p)
            | GameAction::Ready(p) => Some(&p.target),
            GameAction::AddToken(p) | GameAction::AddStatusToken(p) => Some(&p.target),
            GameAction::RemoveToken(p) => Some(&p.target),
            GameAction::AttachUpgrade(p) => Some(&p.target),
            GameAction::PlayCard(p) => Some(&p.target),
            GameAction::ExhaustDie(_)
            | GameAction::PreventDamage(_)
            | GameAction::SpendAction(_)
            | GameAction::Sequence(_) => None,
        }
    }

    /// Name, target types and log message derived from the properties.
    #[must_use]
    pub fn setup(&self) -> ActionSetup {
        match self {
            GameAction::DealDamage(p) => p.setup(),
            GameAction::Destroy(_) => {
                ActionSetup::new("destroy", &UNITS_AND_PHOENIXBORN, "destroy {0}")
            }
            GameAction::PutIntoPlay(_) => ActionSetup::new(
                "putIntoPlay",
                &[CardType::Ally, CardType::Conjuration],
                "put {0} into play",
            ),
            GameAction::MoveCard(p) => {
                ActionSetup::new("moveCard", &[], format!("move {{0}} to {}", p.destination))
            }
            GameAction::Discard(_) => ActionSetup::new("discard", &[], "discard {0}"),
            GameAction::Purge(_) => ActionSetup::new("purge", &[], "purge {0}"),
            GameAction::Exhaust(_) => ActionSetup::new("exhaust", &[], "exhaust {0}"),
            GameAction::Ready(_) => ActionSetup::new("ready", &[], "ready {0}"),
            GameAction::AddToken(p) => ActionSetup::new(
                "addToken",
                &[],
                format!("place {} {} token on {{0}}", p.amount, p.kind),
            ),
            GameAction::AddStatusToken(p) => ActionSetup::new(
                "addStatusToken",
                &[],
                format!("place {} status token on {{0}}", p.amount),
            ),
            GameAction::RemoveToken(p) => ActionSetup::new(
                "removeToken",
                &[],
                format!("remove {} token from {{0}}", p.kind),
            ),
            GameAction::ExhaustDie(_) => ActionSetup::new("exhaustDie", &[], "exhaust dice"),
            GameAction::PreventDamage(p) => ActionSetup::new(
                "preventDamage",
                &[],
                format!("prevent {} damage", p.amount),
            ),
            GameAction::AttachUpgrade(_) => ActionSetup::new(
                "attach",
                &[CardType::Ally, CardType::Conjuration, CardType::Phoenixborn],
                "attach an upgrade to {0}",
            ),
            GameAction::PlayCard(_) => ActionSetup::new("play", &[], "play {0}"),
            GameAction::SpendAction(p) => ActionSetup::new(
                "spendAction",
                &[],
                if p.main { "spend a main action" } else { "spend a side action" },
            ),
            GameAction::Sequence(_) => ActionSetup::new("sequence", &[], "resolve a sequence"),
        }
    }

    /// Whether the action can affect `card` right now.
    #[must_use]
    pub fn can_affect(&self, state: &GameState, card: EntityId, ctx: &AbilityContext) -> bool {
        if state.try_card(card).is_none() || !self.setup().accepts_type(state, card) {
            return false;
        }
        match self {
            GameAction::DealDamage(p) => p.can_affect(state, card, ctx),
            GameAction::Sequence(steps) => steps.iter().any(|s| s.can_affect(state, card, ctx)),
            GameAction::ExhaustDie(_)
            | GameAction::PreventDamage(_)
            | GameAction::SpendAction(_) => false,
            _ => card_actions::can_affect(self, state, card, ctx),
        }
    }

    /// Resolved targets the action can currently affect.
    pub fn legal_targets(
        &self,
        state: &GameState,
        ctx: &AbilityContext,
        events: &EventArena,
    ) -> SmallVec<[EntityId; 2]> {
        match self.target() {
            Some(target) => target
                .resolve(ctx, events)
                .into_iter()
                .filter(|&c| self.can_affect(state, c, ctx))
                .collect(),
            None => SmallVec::new(),
        }
    }

    /// Whether resolving the action would do anything.
    #[must_use]
    pub fn has_legal_target(
        &self,
        state: &GameState,
        ctx: &AbilityContext,
        events: &EventArena,
    ) -> bool {
        match self {
            GameAction::ExhaustDie(p) => !p.dice.is_empty(),
            GameAction::PreventDamage(_) => ctx.event.is_some(),
            GameAction::SpendAction(_) => true,
            GameAction::Sequence(steps) => steps.iter().any(|s| s.has_legal_target(state, ctx, events)),
            _ => !self.legal_targets(state, ctx, events).is_empty(),
        }
    }

    /// Materialize the action as events stored in `events`.
    ///
    /// The returned ids are the top-level events, in resolution order.
    pub fn event_array(
        &self,
        state: &GameState,
        events: &mut EventArena,
        ctx: &AbilityContext,
    ) -> Result<Vec<EventId>> {
        match self {
            GameAction::DealDamage(p) => p.event_array(state, events, ctx),
            GameAction::PreventDamage(p) => p.event_array(events, ctx),
            GameAction::ExhaustDie(p) => Ok(p.event_array(events, ctx)),
            GameAction::SpendAction(p) => Ok(p.event_array(events, ctx)),
            GameAction::Sequence(steps) => {
                let mut result = Vec::new();
                for step in steps {
                    result.extend(step.event_array(state, events, ctx)?);
                }
                Ok(result)
            }
            _ => {
                let targets = self.legal_targets(state, ctx, events);
                Ok(targets
                    .into_iter()
                    .map(|card| card_actions::event_for(self, state, events, card, ctx))
                    .collect())
            }
        }
    }

    /// The log message with the affected cards filled in.
    #[must_use]
    pub fn effect_message(&self, state: &GameState, targets: &[EntityId]) -> String {
        let names: Vec<String> = targets.iter().map(|&t| state.card_name(t)).collect();
        self.setup().effect_msg.replace("{0}", &names.join(", "))
    }
}
