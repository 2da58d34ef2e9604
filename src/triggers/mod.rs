//! Triggered abilities and their registry.
//!
//! Reactions and interrupts bind a map of event names to conditions. The
//! pipeline consults the [`TriggerRegistry`] at each window stage, asking
//! every registered ability of the stage's kinds whether it fires for each
//! event and whether its requirements are met.
//!
//! ## Key Components
//!
//! - [`TriggeredAbility`]: the declarative definition (kind, event map,
//!   scope, player rules, costs, target and actions)
//! - [`TriggerCondition`]: composable predicates over the triggering event
//! - [`TriggerRegistry`]: ownership of every ability plus the index of the
//!   registered ones by event name and kind
//!
//! ## Example Usage
//!
//! ```
//! use ashes_rules::core::EntityId;
//! use ashes_rules::events::EventName;
//! use ashes_rules::triggers::{AbilityKind, TriggerCondition, TriggerRegistry, TriggeredAbility};
//!
//! let mut registry = TriggerRegistry::new();
//! let consume = TriggeredAbility::new("Consume")
//!     .with_kind(AbilityKind::ForcedReaction)
//!     .on(EventName::OnCardDestroyed, TriggerCondition::EventCardIsUnit);
//!
//! let id = registry.add(EntityId(3), consume).unwrap();
//! registry.register(id).unwrap();
//! assert_eq!(
//!     registry.listeners(EventName::OnCardDestroyed, AbilityKind::ForcedReaction),
//!     &[id]
//! );
//! ```

mod ability;
mod condition;
mod registry;

pub use ability::{AbilityId, AbilityKind, TriggeredAbility};
pub use condition::{TriggerCondition, TriggerContext, TriggerPredicate};
pub use registry::TriggerRegistry;
