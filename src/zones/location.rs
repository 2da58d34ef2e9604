//! The fixed set of card locations.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Where a card currently is.
///
/// Each location is kept per player: a card sits in one player's hand, one
/// player's play area, and so on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "deck")]
    Draw,
    #[serde(rename = "hand")]
    Hand,
    #[serde(rename = "play area")]
    PlayArea,
    #[serde(rename = "spellboard")]
    Spellboard,
    #[serde(rename = "discard")]
    Discard,
    /// The conjuration pile.
    #[serde(rename = "archives")]
    Archives,
    #[serde(rename = "purged")]
    Purged,
    /// Attached beneath another card.
    #[serde(rename = "grafted")]
    Grafted,
    /// Action spells while they resolve.
    #[serde(rename = "being played")]
    BeingPlayed,
}

impl Location {
    /// Locations whose cards are "in play" for effects and game-state checks.
    #[must_use]
    pub fn is_in_play(self) -> bool {
        matches!(self, Location::PlayArea | Location::Spellboard)
    }

    /// Locations whose contents only the owner can see.
    #[must_use]
    pub fn is_hidden(self) -> bool {
        matches!(self, Location::Draw | Location::Hand)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Location::Draw => "deck",
            Location::Hand => "hand",
            Location::PlayArea => "play area",
            Location::Spellboard => "spellboard",
            Location::Discard => "discard",
            Location::Archives => "archives",
            Location::Purged => "purged",
            Location::Grafted => "grafted",
            Location::BeingPlayed => "being played",
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of locations in which an ability or persistent effect is live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationScope {
    /// Live everywhere; registered once when the card is created.
    Any,
    In(SmallVec<[Location; 2]>),
}

impl LocationScope {
    #[must_use]
    pub fn only(location: Location) -> Self {
        LocationScope::In(smallvec::smallvec![location])
    }

    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, LocationScope::Any)
    }

    #[must_use]
    pub fn includes(&self, location: Location) -> bool {
        match self {
            LocationScope::Any => true,
            LocationScope::In(locations) => locations.contains(&location),
        }
    }
}

impl Default for LocationScope {
    fn default() -> Self {
        LocationScope::only(Location::PlayArea)
    }
}

impl From<Location> for LocationScope {
    fn from(location: Location) -> Self {
        LocationScope::only(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_scope() {
        let scope = LocationScope::In(smallvec::smallvec![Location::PlayArea, Location::Spellboard]);
        assert!(scope.includes(Location::Spellboard));
        assert!(!scope.includes(Location::Hand));
        assert!(LocationScope::Any.includes(Location::Discard));
        assert_eq!(LocationScope::default(), LocationScope::only(Location::PlayArea));
    }

    #[test]
    fn test_in_play_locations() {
        assert!(Location::PlayArea.is_in_play());
        assert!(Location::Spellboard.is_in_play());
        assert!(!Location::Hand.is_in_play());
        assert!(!Location::BeingPlayed.is_in_play());
    }

    #[test]
    fn test_location_names_match_serde() {
        for location in [Location::PlayArea, Location::BeingPlayed, Location::Archives] {
            let json = serde_json::to_string(&location).unwrap();
            assert_eq!(json, format!("\"{}\"", location));
        }
    }
}
