//! # ashes-rules
//!
//! The rules-resolution core of an Ashes-style dice and card game server.
//!
//! A card's printed text is a script: its setup function declares the
//! triggered abilities, activated actions and persistent effects the card
//! carries. Player requests and ability effects turn into [`GameEvent`]s,
//! events resolve in trigger windows that offer interrupts and reactions,
//! and derived values (attack, life, controller, keywords) are always
//! computed from the printed card plus the effects in force.
//!
//! ## Design Principles
//!
//! 1. **Derived, not stored**: nothing an effect can change is cached on the
//!    card. Getters on [`GameState`] recompute from the effect engine.
//!
//! 2. **Resumable resolution**: a decision a player has to make suspends the
//!    [`Pipeline`] with a [`Prompt`]. The answer resumes it from exactly
//!    where it stopped.
//!
//! 3. **Fail closed**: a broken invariant marks the game corrupted and
//!    every further request is refused.
//!
//! ## Modules
//!
//! - `core`: entity ids, players, configuration, RNG, the game log and state
//! - `zones`: locations and the per-player boards
//! - `dice`: dice, magic types and cost requirements
//! - `cards`: definitions, instances, tokens, snapshots and summaries
//! - `effects`: the layered effect engine and derived values
//! - `events`: game events and trigger windows
//! - `triggers`: triggered abilities and their registry
//! - `abilities`: the setup builder, activated actions and ability contexts
//! - `costs`: ability costs and interactive dice selection
//! - `actions`: game actions and the events they create
//! - `pipeline`: the resumable resolution pipeline and player prompts
//! - `game`: the game facade driven by a server
//! - `games`: card catalogs

pub mod error;
pub mod core;
pub mod zones;
pub mod dice;
pub mod cards;
pub mod effects;
pub mod events;
pub mod triggers;
pub mod abilities;
pub mod costs;
pub mod actions;
pub mod pipeline;
pub mod game;
pub mod games;

// Re-export commonly used types
pub use crate::error::{Result, RulesError};

pub use crate::core::{
    EntityId, PlayerId, PlayerMap,
    GameRng,
    GameConfig, PlayerOptions,
    GameLog, LogEntry,
    GameState,
};

pub use crate::zones::{Location, LocationScope};

pub use crate::dice::{Die, DieId, DieLevel, Magic, DiceCount, DiceRequirement};

pub use crate::cards::{
    Card, CardDefinition, CardRegistry, CardSnapshot, CardSummary, CardType,
    Keyword, StatValue, TokenKind,
};

pub use crate::effects::{Amount, Duration, Effect, EffectKind, EffectMatch, Restriction, Stat};

pub use crate::events::{EventName, GameEvent};

pub use crate::triggers::{
    AbilityId, AbilityKind, TriggerCondition, TriggerRegistry, TriggeredAbility,
};

pub use crate::abilities::{AbilityBuilder, CardAction, TargetPlayer, TargetSpec};

pub use crate::costs::Cost;

pub use crate::actions::GameAction;

pub use crate::pipeline::{Pipeline, Prompt, PromptResponse, ResolutionStatus};

pub use crate::game::Game;
