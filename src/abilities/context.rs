//! Ability execution context.
//!
//! Every ability resolution carries an explicit [`AbilityContext`]: who is
//! acting, the source card, the ability being resolved, the triggering
//! event, chosen targets and the committed cost payment. Game actions read
//! it; nothing reaches for ambient game state.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::actions::GameAction;
use crate::cards::{CardDefinition, CardSnapshot};
use crate::core::{EntityId, GameState, PlayerId};
use crate::costs::{can_pay_all, Cost};
use crate::dice::DieId;
use crate::events::{EventContext, EventId};
use crate::triggers::{AbilityId, TriggeredAbility};

use super::card_action::{BaseAction, CardAction, TargetSpec};
use super::limit::{AbilityLimit, UsageKey};

/// Unique identifier for an ability resolution within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(pub u32);

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Context({})", self.0)
    }
}

/// Which ability a context resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbilityRef {
    Triggered(AbilityId),
    /// One of the card's own actions, by index.
    Action { card: EntityId, index: usize },
    /// An action granted by a `GainAbility` effect, by index.
    Gained { card: EntityId, index: usize },
    Base(BaseAction),
    /// Rules-driven resolution with no printed ability behind it.
    Framework,
}

/// The payment fixed by cost resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommittedCosts {
    pub dice: SmallVec<[DieId; 4]>,
    pub exhaust_source: bool,
    pub main_action: bool,
    pub side_action: bool,
}

/// What resolving the ability involves, copied out of its definition when
/// the context is created.
#[derive(Clone, Debug, Default)]
pub struct AbilityPlan {
    pub title: String,
    pub costs: Vec<Cost>,
    pub target: Option<TargetSpec>,
    pub actions: Vec<GameAction>,
    pub limit: Option<(UsageKey, AbilityLimit)>,
    pub max: Option<u32>,
}

impl AbilityPlan {
    #[must_use]
    pub fn for_triggered(ability: &TriggeredAbility) -> Self {
        Self {
            title: ability.title.clone(),
            costs: ability.costs.clone(),
            target: ability.target.clone(),
            actions: ability.actions.clone(),
            limit: ability
                .limit
                .map(|limit| (UsageKey::Triggered(ability.id), limit)),
            max: ability.max,
        }
    }

    #[must_use]
    pub fn for_action(action: &CardAction, card: EntityId) -> Self {
        Self {
            title: action.title.clone(),
            costs: action.costs.clone(),
            target: action.target.clone(),
            actions: action.actions.clone(),
            limit: action.limit.map(|limit| {
                (
                    UsageKey::Action {
                        card,
                        title: action.title.clone(),
                    },
                    limit,
                )
            }),
            max: action.max,
        }
    }

    #[must_use]
    pub fn for_base(base: BaseAction, definition: &CardDefinition, card: EntityId) -> Self {
        Self {
            title: base.title().to_string(),
            costs: base.costs(definition),
            target: base.target(),
            actions: base.actions(card),
            limit: None,
            max: None,
        }
    }
}

/// The first requirement an ability fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    Blank,
    Player,
    Location,
    Limit,
    Max,
    Cost,
    Target,
    Room,
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Requirement::Blank => "the card is blank",
            Requirement::Player => "the player cannot use it",
            Requirement::Location => "the card is not in a legal location",
            Requirement::Limit => "the ability was used too often",
            Requirement::Max => "abilities with this title were used too often",
            Requirement::Cost => "the cost cannot be paid",
            Requirement::Target => "there is no legal target",
            Requirement::Room => "there is no room for the card",
        };
        f.write_str(text)
    }
}

impl AbilityPlan {
    /// Limits, costs and targets. Player and location rules differ per
    /// ability family and are checked by the caller first.
    pub fn check(&self, state: &GameState, ctx: &AbilityContext) -> Result<(), Requirement> {
        if let Some((key, limit)) = &self.limit {
            if state.usage.is_at_limit(key, limit) {
                return Err(Requirement::Limit);
            }
        }
        if let Some(max) = self.max {
            if state.usage.title_uses(ctx.player, &self.title) >= max {
                return Err(Requirement::Max);
            }
        }
        if !can_pay_all(&self.costs, state, ctx.player, ctx.source) {
            return Err(Requirement::Cost);
        }
        if let Some(target) = &self.target {
            if !target.optional && target.legal_targets(state, ctx, &self.actions).is_empty() {
                return Err(Requirement::Target);
            }
        }
        Ok(())
    }
}

/// Execution context of one ability resolution.
#[derive(Clone, Debug)]
pub struct AbilityContext {
    pub id: ContextId,
    pub player: PlayerId,
    pub source: Option<EntityId>,
    pub ability: AbilityRef,
    /// The event that triggered the ability.
    pub event: Option<EventId>,
    pub targets: SmallVec<[EntityId; 2]>,
    pub costs: CommittedCosts,
    /// The source as it was when resolution started.
    pub snapshot: Option<Box<CardSnapshot>>,
    pub cancelled: bool,
    pub plan: AbilityPlan,
}

impl AbilityContext {
    pub fn new(id: ContextId, player: PlayerId, source: Option<EntityId>, ability: AbilityRef) -> Self {
        Self {
            id,
            player,
            source,
            ability,
            event: None,
            targets: SmallVec::new(),
            costs: CommittedCosts::default(),
            snapshot: None,
            cancelled: false,
            plan: AbilityPlan::default(),
        }
    }

    #[must_use]
    pub fn with_event(mut self, event: EventId) -> Self {
        self.event = Some(event);
        self
    }

    #[must_use]
    pub fn with_plan(mut self, plan: AbilityPlan) -> Self {
        self.plan = plan;
        self
    }

    /// The context stamped on events this ability creates.
    #[must_use]
    pub fn event_context(&self) -> EventContext {
        EventContext {
            player: self.player,
            source: self.source,
            ability: Some(self.id),
        }
    }
}
