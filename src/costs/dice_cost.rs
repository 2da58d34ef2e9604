//! Interactive dice payment.
//!
//! A [`DiceSelection`] is the state of one dice prompt. It starts from the
//! dice that can be picked automatically (non-basic, non-parallel entries,
//! lowest faces first) and commits straight away if those already cover the
//! whole requirement. Otherwise the player adds dice one at a time; after
//! each pick the selection is checked again and it commits as soon as it is
//! an exact payment.
//!
//! Dice costs are exact-count: confirming a selection that is not an exact
//! payment re-prompts instead of committing, and a pick that could never be
//! part of a payment (too many dice, or a die that fits no remaining slot)
//! is rejected.

use crate::dice::{
    can_extend, match_dice, matches_exactly, required_count, DiceRequirement, Die, DieId,
};

/// Result of feeding a player decision into a selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The payment is fixed.
    Committed(Vec<DieId>),
    /// Prompt again with the updated selection.
    Continue,
    /// The decision was refused; prompt again with the selection unchanged.
    Rejected(String),
    /// The player backed out.
    Cancelled,
}

/// The in-progress selection of a dice payment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiceSelection {
    requirement: Vec<DiceRequirement>,
    chosen: Vec<DieId>,
    can_cancel: bool,
}

impl DiceSelection {
    /// Start a selection against `pool`. The outcome is `Committed` when the
    /// automatic picks already pay the whole requirement, `Continue`
    /// otherwise.
    pub fn begin(
        pool: &[Die],
        requirement: Vec<DiceRequirement>,
        can_cancel: bool,
    ) -> (Self, SelectionOutcome) {
        let chosen = match_dice(pool, &requirement);
        let selection = Self {
            requirement,
            chosen,
            can_cancel,
        };
        let outcome = if selection.chosen.len() == required_count(&selection.requirement)
            && selection.is_exact(pool)
        {
            SelectionOutcome::Committed(selection.chosen.clone())
        } else {
            SelectionOutcome::Continue
        };
        (selection, outcome)
    }

    #[must_use]
    pub fn requirement(&self) -> &[DiceRequirement] {
        &self.requirement
    }

    #[must_use]
    pub fn chosen(&self) -> &[DieId] {
        &self.chosen
    }

    #[must_use]
    pub fn can_cancel(&self) -> bool {
        self.can_cancel
    }

    fn dice_for(pool: &[Die], ids: &[DieId]) -> Vec<Die> {
        ids.iter()
            .filter_map(|id| pool.iter().find(|d| d.id == *id))
            .cloned()
            .collect()
    }

    fn is_exact(&self, pool: &[Die]) -> bool {
        matches_exactly(&Self::dice_for(pool, &self.chosen), &self.requirement)
    }

    /// Dice the player may add: ready, not chosen, and still extendable to
    /// a payment.
    #[must_use]
    pub fn selectable(&self, pool: &[Die]) -> Vec<DieId> {
        let current = Self::dice_for(pool, &self.chosen);
        pool.iter()
            .filter(|d| !d.exhausted && !self.chosen.contains(&d.id))
            .filter(|d| {
                let mut extended = current.clone();
                extended.push((*d).clone());
                can_extend(&extended, &self.requirement)
            })
            .map(|d| d.id)
            .collect()
    }

    /// Whether "Done" would commit right now.
    #[must_use]
    pub fn can_finish(&self, pool: &[Die]) -> bool {
        self.is_exact(pool)
    }

    /// Add a die to the selection.
    pub fn select(&mut self, pool: &[Die], die: DieId) -> SelectionOutcome {
        let Some(found) = pool.iter().find(|d| d.id == die) else {
            return SelectionOutcome::Rejected(format!("{die} is not in the pool"));
        };
        if found.exhausted || self.chosen.contains(&die) {
            return SelectionOutcome::Rejected(format!("{die} is not available"));
        }
        if self.chosen.len() >= required_count(&self.requirement) {
            return SelectionOutcome::Rejected("too many dice selected".to_string());
        }
        let mut extended = Self::dice_for(pool, &self.chosen);
        extended.push(found.clone());
        if !can_extend(&extended, &self.requirement) {
            return SelectionOutcome::Rejected(format!("{die} does not fit the cost"));
        }

        self.chosen.push(die);
        if self.is_exact(pool) {
            SelectionOutcome::Committed(self.chosen.clone())
        } else {
            SelectionOutcome::Continue
        }
    }

    /// The player confirms the current selection.
    pub fn done(&self, pool: &[Die]) -> SelectionOutcome {
        if self.is_exact(pool) {
            SelectionOutcome::Committed(self.chosen.clone())
        } else {
            SelectionOutcome::Continue
        }
    }

    /// The player backs out.
    pub fn cancel(&self) -> SelectionOutcome {
        if self.can_cancel {
            SelectionOutcome::Cancelled
        } else {
            SelectionOutcome::Rejected("this cost cannot be cancelled".to_string())
        }
    }
}
