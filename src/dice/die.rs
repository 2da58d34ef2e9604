//! Individual dice and their faces.

use serde::{Deserialize, Serialize};

use crate::core::GameRng;

/// Unique identifier for a die within a player's pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DieId(pub u16);

impl DieId {
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for DieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Die({})", self.0)
    }
}

/// The magic type of a die.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Magic {
    Ceremonial,
    Charm,
    Illusion,
    Natural,
    Divine,
    Sympathy,
    Time,
    Astral,
    Artifice,
    Rage,
}

impl Magic {
    pub const ALL: [Magic; 10] = [
        Magic::Ceremonial,
        Magic::Charm,
        Magic::Illusion,
        Magic::Natural,
        Magic::Divine,
        Magic::Sympathy,
        Magic::Time,
        Magic::Astral,
        Magic::Artifice,
        Magic::Rage,
    ];
}

/// The face a die shows. Power faces also count as class faces of the same
/// magic, and every face counts as basic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DieLevel {
    Basic,
    Class,
    Power,
}

impl DieLevel {
    /// Roll a face: one power, two class and three basic sides.
    pub fn roll(rng: &mut GameRng) -> Self {
        match rng.roll_d6() {
            1 => DieLevel::Power,
            2 | 3 => DieLevel::Class,
            _ => DieLevel::Basic,
        }
    }
}

/// A single die in a player's pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Die {
    pub id: DieId,
    pub magic: Magic,
    pub level: DieLevel,
    pub exhausted: bool,
}

impl Die {
    pub fn new(id: DieId, magic: Magic, level: DieLevel) -> Self {
        Self {
            id,
            magic,
            level,
            exhausted: false,
        }
    }

    /// Whether this die can pay for one slot of the given level and magic.
    ///
    /// A basic slot accepts any face (of the named magic, if one is given).
    #[must_use]
    pub fn satisfies(&self, level: DieLevel, magic: Option<Magic>) -> bool {
        if let Some(magic) = magic {
            if self.magic != magic {
                return false;
            }
        }
        self.level >= level
    }

    /// Roll a fresh face and clear exhaustion.
    pub fn reroll(&mut self, rng: &mut GameRng) {
        self.level = DieLevel::roll(rng);
        self.exhausted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_die_satisfies() {
        let power = Die::new(DieId::new(0), Magic::Illusion, DieLevel::Power);
        let class = Die::new(DieId::new(1), Magic::Illusion, DieLevel::Class);
        let basic = Die::new(DieId::new(2), Magic::Charm, DieLevel::Basic);

        assert!(power.satisfies(DieLevel::Class, Some(Magic::Illusion)));
        assert!(power.satisfies(DieLevel::Power, Some(Magic::Illusion)));
        assert!(!class.satisfies(DieLevel::Power, Some(Magic::Illusion)));
        assert!(!class.satisfies(DieLevel::Class, Some(Magic::Charm)));
        assert!(basic.satisfies(DieLevel::Basic, None));
        assert!(!basic.satisfies(DieLevel::Basic, Some(Magic::Illusion)));
    }

    #[test]
    fn test_roll_distribution_covers_faces() {
        let mut rng = GameRng::new(11);
        let mut seen = [false; 3];
        for _ in 0..200 {
            match DieLevel::roll(&mut rng) {
                DieLevel::Basic => seen[0] = true,
                DieLevel::Class => seen[1] = true,
                DieLevel::Power => seen[2] = true,
            }
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_magic_serialization() {
        let json = serde_json::to_string(&Magic::Illusion).unwrap();
        assert_eq!(json, "\"illusion\"");
        let level: DieLevel = serde_json::from_str("\"power\"").unwrap();
        assert_eq!(level, DieLevel::Power);
    }
}
