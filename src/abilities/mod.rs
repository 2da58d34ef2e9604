//! Ability framework.
//!
//! Cards declare their behavior through an [`AbilityBuilder`]: triggered
//! abilities (reactions and interrupts, see `crate::triggers`), activated
//! [`CardAction`]s and persistent effects. Every resolution runs against an
//! explicit [`AbilityContext`].
//!
//! ## Key Types
//!
//! - [`AbilityBuilder`] / [`CardAbilities`]: declaration and per-card storage
//! - [`CardAction`] / [`BaseAction`]: activated abilities and the play and
//!   discard actions every hand card has
//! - [`TargetSpec`]: which cards an ability may target
//! - [`AbilityContext`] / [`AbilityPlan`]: the execution context and what the
//!   resolution involves (costs, target, actions, limits)
//! - [`AbilityUsage`]: per-instance and per-title use counters

pub mod builder;
pub mod card_action;
pub mod context;
pub mod limit;

pub use builder::{AbilityBuilder, CardAbilities, PersistentEffect};
pub use card_action::{BaseAction, CardAction, CardPredicate, TargetPlayer, TargetSpec};
pub use context::{
    AbilityContext, AbilityPlan, AbilityRef, CommittedCosts, ContextId, Requirement,
};
pub use limit::{AbilityLimit, AbilityUsage, LimitPeriod, UsageKey};
