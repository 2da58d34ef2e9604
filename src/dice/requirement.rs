//! Dice requirements and matching.
//!
//! A requirement list is a sequence of `DiceRequirement`s. Each entry is
//! either an exact `DiceCount` or a set of parallel alternatives of which
//! any one may be paid. Matching flattens a requirement list into slots
//! (one per die) and assigns dice to slots with an augmenting-path
//! bipartite matching, trying every combination of parallel alternatives.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::die::{Die, DieId, DieLevel, Magic};

/// A count of dice at a given level, optionally of a given magic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceCount {
    pub count: u8,
    pub level: DieLevel,
    pub magic: Option<Magic>,
}

impl DiceCount {
    pub const fn new(count: u8, level: DieLevel, magic: Option<Magic>) -> Self {
        Self { count, level, magic }
    }

    /// Any `count` dice.
    pub const fn basic(count: u8) -> Self {
        Self::new(count, DieLevel::Basic, None)
    }

    /// `count` class-or-better faces of `magic`.
    pub const fn class(count: u8, magic: Magic) -> Self {
        Self::new(count, DieLevel::Class, Some(magic))
    }

    /// `count` power faces of `magic`.
    pub const fn power(count: u8, magic: Magic) -> Self {
        Self::new(count, DieLevel::Power, Some(magic))
    }
}

/// One entry of a requirement list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiceRequirement {
    Exact(DiceCount),
    /// Any one of the alternatives satisfies this entry.
    Parallel(SmallVec<[DiceCount; 2]>),
}

impl From<DiceCount> for DiceRequirement {
    fn from(count: DiceCount) -> Self {
        DiceRequirement::Exact(count)
    }
}

type Slot = (DieLevel, Option<Magic>);

/// Number of dice a requirement list consumes.
///
/// For parallel entries the first alternative's count is used; alternatives
/// are expected to agree on count.
#[must_use]
pub fn required_count(requirements: &[DiceRequirement]) -> usize {
    requirements
        .iter()
        .map(|req| match req {
            DiceRequirement::Exact(c) => c.count as usize,
            DiceRequirement::Parallel(alts) => alts.first().map_or(0, |c| c.count as usize),
        })
        .sum()
}

/// Every flattened slot list, one per combination of parallel alternatives.
fn alternatives(requirements: &[DiceRequirement]) -> Vec<Vec<Slot>> {
    let mut combos: Vec<Vec<Slot>> = vec![Vec::new()];
    for req in requirements {
        let options: SmallVec<[DiceCount; 2]> = match req {
            DiceRequirement::Exact(c) => smallvec::smallvec![*c],
            DiceRequirement::Parallel(alts) => alts.clone(),
        };
        let mut next = Vec::with_capacity(combos.len() * options.len().max(1));
        for combo in &combos {
            for option in &options {
                let mut extended = combo.clone();
                extended.extend(std::iter::repeat((option.level, option.magic)).take(option.count as usize));
                next.push(extended);
            }
        }
        combos = next;
    }
    combos
}

/// Try to assign `slot` a die, re-routing earlier assignments if needed.
fn augment(
    slot: usize,
    slots: &[Slot],
    dice: &[&Die],
    seen: &mut [bool],
    owner: &mut [Option<usize>],
) -> bool {
    let (level, magic) = slots[slot];
    for (d, die) in dice.iter().enumerate() {
        if seen[d] || !die.satisfies(level, magic) {
            continue;
        }
        seen[d] = true;
        let free = match owner[d] {
            None => true,
            Some(other) => augment(other, slots, dice, seen, owner),
        };
        if free {
            owner[d] = Some(slot);
            return true;
        }
    }
    false
}

/// Maximum matching between slots and dice. Returns die index -> slot.
fn assign(dice: &[&Die], slots: &[Slot]) -> Vec<Option<usize>> {
    let mut owner = vec![None; dice.len()];
    for slot in 0..slots.len() {
        let mut seen = vec![false; dice.len()];
        augment(slot, slots, dice, &mut seen, &mut owner);
    }
    owner
}

fn matched(owner: &[Option<usize>]) -> usize {
    owner.iter().filter(|o| o.is_some()).count()
}

/// Whether the dice can pay every slot of some alternative.
#[must_use]
pub fn can_match(dice: &[Die], requirements: &[DiceRequirement]) -> bool {
    let refs: Vec<&Die> = dice.iter().collect();
    alternatives(requirements)
        .iter()
        .any(|slots| matched(&assign(&refs, slots)) == slots.len())
}

/// Whether the dice are exactly a payment: the right count, and every die
/// fills a slot.
#[must_use]
pub fn matches_exactly(dice: &[Die], requirements: &[DiceRequirement]) -> bool {
    dice.len() == required_count(requirements) && can_match(dice, requirements)
}

/// Whether every die in a partial selection can be placed in a distinct slot
/// of some alternative, so the selection can still grow into a payment.
#[must_use]
pub fn can_extend(selection: &[Die], requirements: &[DiceRequirement]) -> bool {
    if selection.len() > required_count(requirements) {
        return false;
    }
    let refs: Vec<&Die> = selection.iter().collect();
    alternatives(requirements)
        .iter()
        .any(|slots| matched(&assign(&refs, slots)) == selection.len())
}

/// Auto-select dice for the non-basic, non-parallel entries of a
/// requirement list. Lower faces are preferred so power faces are kept for
/// later. Exhausted dice are never chosen. The result may be partial.
#[must_use]
pub fn match_dice(pool: &[Die], requirements: &[DiceRequirement]) -> Vec<DieId> {
    let slots: Vec<Slot> = requirements
        .iter()
        .filter_map(|req| match req {
            DiceRequirement::Exact(c) if c.level != DieLevel::Basic => Some(*c),
            _ => None,
        })
        .flat_map(|c| std::iter::repeat((c.level, c.magic)).take(c.count as usize))
        .collect();
    if slots.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<&Die> = pool.iter().filter(|d| !d.exhausted).collect();
    candidates.sort_by_key(|d| d.level);

    let owner = assign(&candidates, &slots);
    let mut by_slot: Vec<(usize, DieId)> = owner
        .iter()
        .enumerate()
        .filter_map(|(d, slot)| slot.map(|s| (s, candidates[d].id)))
        .collect();
    by_slot.sort_by_key(|(slot, _)| *slot);
    by_slot.into_iter().map(|(_, id)| id).collect()
}
