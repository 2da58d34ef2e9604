//! Ability use limits.
//!
//! `limit` counts uses of one ability instance (one card's copy of it) and
//! resets with its period. `max` counts uses of every ability sharing a
//! title for one player and resets at the end of the round.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::triggers::AbilityId;

/// When a use counter resets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitPeriod {
    Turn,
    Round,
}

/// Maximum uses of an ability instance per period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityLimit {
    pub max: u32,
    pub period: LimitPeriod,
}

impl AbilityLimit {
    #[must_use]
    pub const fn per_round(max: u32) -> Self {
        Self {
            max,
            period: LimitPeriod::Round,
        }
    }

    #[must_use]
    pub const fn per_turn(max: u32) -> Self {
        Self {
            max,
            period: LimitPeriod::Turn,
        }
    }
}

/// Identifies one ability instance for use counting.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageKey {
    Triggered(AbilityId),
    Action { card: EntityId, title: String },
}

/// Use counters for every limited ability in a game.
#[derive(Clone, Debug, Default)]
pub struct AbilityUsage {
    uses: FxHashMap<UsageKey, (u32, LimitPeriod)>,
    titles: FxHashMap<(PlayerId, String), u32>,
}

impl AbilityUsage {
    #[must_use]
    pub fn uses(&self, key: &UsageKey) -> u32 {
        self.uses.get(key).map_or(0, |(n, _)| *n)
    }

    #[must_use]
    pub fn is_at_limit(&self, key: &UsageKey, limit: &AbilityLimit) -> bool {
        self.uses(key) >= limit.max
    }

    pub fn record(&mut self, key: UsageKey, limit: &AbilityLimit) {
        let entry = self.uses.entry(key).or_insert((0, limit.period));
        entry.0 += 1;
    }

    #[must_use]
    pub fn title_uses(&self, player: PlayerId, title: &str) -> u32 {
        self.titles
            .get(&(player, title.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn record_title(&mut self, player: PlayerId, title: &str) {
        *self.titles.entry((player, title.to_string())).or_insert(0) += 1;
    }

    /// Clear the counters of a period. Round resets also clear the
    /// per-title counters.
    pub fn reset(&mut self, period: LimitPeriod) {
        self.uses.retain(|_, (_, p)| *p != period);
        if period == LimitPeriod::Round {
            self.titles.clear();
        }
    }
}
