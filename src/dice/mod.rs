//! Magic dice: the resource players spend to pay costs.
//!
//! ## Key Components
//!
//! - [`Die`]: one die with a magic type, a rolled face and an exhausted flag
//! - [`DiceCount`] / [`DiceRequirement`]: what a cost asks for
//! - [`can_match`], [`matches_exactly`], [`can_extend`], [`match_dice`]:
//!   assignment of dice to requirement slots

mod die;
mod requirement;

pub use die::{Die, DieId, DieLevel, Magic};
pub use requirement::{
    can_extend, can_match, match_dice, matches_exactly, required_count, DiceCount,
    DiceRequirement,
};
