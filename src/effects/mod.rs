//! Effect engine for layered card values.
//!
//! Card stats, keywords, traits, type, controller and restrictions are never
//! stored as current values. They are computed on every read from the
//! card's printed data plus the live effects that match it.
//!
//! ## Key Components
//!
//! - [`Effect`]: a typed modification (kind, payload, match, duration)
//! - [`EffectEngine`]: the registry of live effects and the queries over it
//! - `values`: the derived getters on `GameState` (`attack`, `life`, ...)
//!
//! ## Value algorithm
//!
//! For a numeric stat: start from the printed value (of the copied card if a
//! copy effect is live), replace it with the most recent set effect if any,
//! add every modify effect, then floor at zero.

pub mod effect;
pub mod engine;
pub mod values;

pub use effect::{
    Amount, AmountFn, ConditionFn, Duration, Effect, EffectKind, EffectMatch, EffectValue,
    MatchFn, Relation, Restriction, Stat,
};
pub use engine::{ActiveEffect, EffectEngine, EffectHandle};
pub use values::Flank;
