//! Ability costs.
//!
//! A cost is checked cheaply with [`Cost::can_pay`] before an ability is
//! offered, resolved (interactively for dice) into a committed payment on
//! the ability's context, and finally paid through ordinary game actions
//! ([`Cost::pay_action`]) whose events run before the ability's own.
//!
//! Only dice costs prompt the player. See [`dice_cost`] for the selection
//! protocol.

pub mod dice_cost;

use smallvec::SmallVec;

use crate::abilities::CommittedCosts;
use crate::actions::{ActionTarget, DieProps, GameAction, SpendActionProps, TargetProps};
use crate::core::{EntityId, GameState, PlayerId};
use crate::dice::{can_match, DiceRequirement, Die};
use crate::effects::Restriction;

pub use dice_cost::{DiceSelection, SelectionOutcome};

/// The closed set of costs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cost {
    /// Exhaust dice matching the requirement list.
    Dice(Vec<DiceRequirement>),
    /// Exhaust the ability's source card.
    Exhaust,
    MainAction,
    SideAction,
}

impl Cost {
    pub fn dice<R: Into<DiceRequirement>>(requirements: impl IntoIterator<Item = R>) -> Self {
        Cost::Dice(requirements.into_iter().map(Into::into).collect())
    }

    /// Whether the player could pay the cost right now.
    #[must_use]
    pub fn can_pay(&self, state: &GameState, player: PlayerId, source: Option<EntityId>) -> bool {
        let Ok(p) = state.player(player) else {
            return false;
        };
        match self {
            Cost::Dice(requirements) => {
                let ready: Vec<Die> = p.available_dice().cloned().collect();
                can_match(&ready, requirements)
            }
            Cost::Exhaust => source.and_then(|s| state.try_card(s)).map_or(false, |c| {
                !c.is_exhausted() && state.allows(c.id, Restriction::BeExhausted)
            }),
            Cost::MainAction => p.main_actions > 0,
            Cost::SideAction => p.side_actions > 0,
        }
    }

    /// Whether resolving the cost needs a player decision.
    #[must_use]
    pub fn prompts_player(&self) -> bool {
        matches!(self, Cost::Dice(_))
    }

    /// Record a non-interactive cost on the committed payment.
    pub fn commit(&self, committed: &mut CommittedCosts) {
        match self {
            Cost::Dice(_) => {}
            Cost::Exhaust => committed.exhaust_source = true,
            Cost::MainAction => committed.main_action = true,
            Cost::SideAction => committed.side_action = true,
        }
    }

    /// The game action that pays this cost from a committed payment.
    #[must_use]
    pub fn pay_action(&self, committed: &CommittedCosts) -> Option<GameAction> {
        match self {
            Cost::Dice(_) if !committed.dice.is_empty() => Some(GameAction::ExhaustDie(DieProps {
                dice: committed.dice.iter().copied().collect::<SmallVec<_>>(),
                player: None,
            })),
            Cost::Dice(_) => None,
            Cost::Exhaust => committed.exhaust_source.then(|| {
                GameAction::Exhaust(TargetProps {
                    target: ActionTarget::Source,
                })
            }),
            Cost::MainAction => committed.main_action.then(|| {
                GameAction::SpendAction(SpendActionProps {
                    main: true,
                    player: None,
                })
            }),
            Cost::SideAction => committed.side_action.then(|| {
                GameAction::SpendAction(SpendActionProps {
                    main: false,
                    player: None,
                })
            }),
        }
    }
}

/// Whether every cost in the list could be paid.
#[must_use]
pub fn can_pay_all(costs: &[Cost], state: &GameState, player: PlayerId, source: Option<EntityId>) -> bool {
    costs.iter().all(|c| c.can_pay(state, player, source))
}
