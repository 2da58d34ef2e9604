//! Card definitions: static card data.
//!
//! `CardDefinition` holds the printed properties of a card: its stub, name,
//! type, printed stats, keywords, traits, play cost and the setup function
//! that declares its abilities. Per-game state (tokens, location, controller)
//! lives on [`Card`](super::Card).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::abilities::AbilityBuilder;
use crate::dice::DiceRequirement;
use crate::error::{Result, RulesError};

/// The printed type of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Phoenixborn,
    Ally,
    Conjuration,
    #[serde(rename = "Action Spell")]
    ActionSpell,
    #[serde(rename = "Reaction Spell")]
    ReactionSpell,
    #[serde(rename = "Ready Spell")]
    ReadySpell,
    #[serde(rename = "Alteration Spell")]
    AlterationSpell,
    #[serde(rename = "Conjured Alteration Spell")]
    ConjuredAlterationSpell,
}

impl CardType {
    /// Types that occupy a play-area slot and take part in combat.
    pub const UNITS: [CardType; 2] = [CardType::Ally, CardType::Conjuration];

    #[must_use]
    pub fn is_unit(self) -> bool {
        Self::UNITS.contains(&self)
    }

    #[must_use]
    pub fn is_spell(self) -> bool {
        matches!(
            self,
            CardType::ActionSpell
                | CardType::ReactionSpell
                | CardType::ReadySpell
                | CardType::AlterationSpell
                | CardType::ConjuredAlterationSpell
        )
    }

    /// Conjured cards return to the archives rather than the discard.
    #[must_use]
    pub fn is_conjured(self) -> bool {
        matches!(self, CardType::Conjuration | CardType::ConjuredAlterationSpell)
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CardType::Phoenixborn => "Phoenixborn",
            CardType::Ally => "Ally",
            CardType::Conjuration => "Conjuration",
            CardType::ActionSpell => "Action Spell",
            CardType::ReactionSpell => "Reaction Spell",
            CardType::ReadySpell => "Ready Spell",
            CardType::AlterationSpell => "Alteration Spell",
            CardType::ConjuredAlterationSpell => "Conjured Alteration Spell",
        };
        f.write_str(name)
    }
}

/// A printed stat: a number, or the variable marker `X`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StatRepr", try_from = "StatRepr")]
pub enum StatValue {
    Fixed(i32),
    /// Printed as `X`; its value comes from an effect. Counts as 0 when
    /// read as a printed number.
    Variable,
}

impl StatValue {
    #[must_use]
    pub fn printed(self) -> i32 {
        match self {
            StatValue::Fixed(v) => v,
            StatValue::Variable => 0,
        }
    }
}

impl Default for StatValue {
    fn default() -> Self {
        StatValue::Fixed(0)
    }
}

impl From<i32> for StatValue {
    fn from(v: i32) -> Self {
        StatValue::Fixed(v)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StatRepr {
    Number(i32),
    Text(String),
}

impl From<StatValue> for StatRepr {
    fn from(v: StatValue) -> Self {
        match v {
            StatValue::Fixed(n) => StatRepr::Number(n),
            StatValue::Variable => StatRepr::Text("X".into()),
        }
    }
}

impl TryFrom<StatRepr> for StatValue {
    type Error = String;

    fn try_from(repr: StatRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            StatRepr::Number(n) => Ok(StatValue::Fixed(n)),
            StatRepr::Text(t) if t.eq_ignore_ascii_case("x") => Ok(StatValue::Variable),
            StatRepr::Text(t) => t
                .parse::<i32>()
                .map(StatValue::Fixed)
                .map_err(|_| format!("invalid stat value '{t}'")),
        }
    }
}

/// Printed stats block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintedStats {
    pub attack: StatValue,
    pub life: StatValue,
    pub recover: StatValue,
    pub battlefield: StatValue,
    pub spellboard: StatValue,
}

/// A keyword with an optional numeric value (`overkill:1`, `terrifying`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keyword {
    pub name: String,
    pub value: i32,
}

impl Keyword {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into().to_lowercase(),
            value,
        }
    }

    /// Parse `name` or `name:value`. A bare keyword has value 1.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let (name, value) = match text.split_once(':') {
            Some((name, value)) => {
                let value = value.trim().parse::<i32>().map_err(|_| {
                    RulesError::malformed(text, format!("invalid keyword value '{value}'"))
                })?;
                (name.trim(), value)
            }
            None => (text, 1),
        };
        if name.is_empty() {
            return Err(RulesError::malformed(text, "empty keyword"));
        }
        Ok(Self::new(name, value))
    }
}

/// The setup function that declares a card's abilities.
#[derive(Clone)]
pub struct CardSetup(pub Arc<dyn Fn(&mut AbilityBuilder) -> Result<()> + Send + Sync>);

impl std::fmt::Debug for CardSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CardSetup(..)")
    }
}

/// Static definition of a card.
///
/// ```
/// use ashes_rules::cards::{CardDefinition, CardType};
///
/// let card = CardDefinition::new("iron-worker", "Iron Worker", CardType::Ally)
///     .with_attack(2)
///     .with_life(2)
///     .with_recover(0)
///     .with_trait("Human");
/// assert_eq!(card.stats.attack.printed(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct CardDefinition {
    /// Catalog key, unique per card.
    pub stub: String,
    pub name: String,
    pub card_type: CardType,
    pub stats: PrintedStats,
    pub keywords: Vec<Keyword>,
    pub traits: Vec<String>,
    /// Dice paid to play the card from hand.
    pub cost: Vec<DiceRequirement>,
    pub setup: Option<CardSetup>,
}

impl CardDefinition {
    /// Create a new card definition with no stats or abilities.
    #[must_use]
    pub fn new(stub: impl Into<String>, name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            stub: stub.into(),
            name: name.into(),
            card_type,
            stats: PrintedStats::default(),
            keywords: Vec::new(),
            traits: Vec::new(),
            cost: Vec::new(),
            setup: None,
        }
    }

    #[must_use]
    pub fn with_attack(mut self, attack: impl Into<StatValue>) -> Self {
        self.stats.attack = attack.into();
        self
    }

    #[must_use]
    pub fn with_life(mut self, life: impl Into<StatValue>) -> Self {
        self.stats.life = life.into();
        self
    }

    #[must_use]
    pub fn with_recover(mut self, recover: impl Into<StatValue>) -> Self {
        self.stats.recover = recover.into();
        self
    }

    #[must_use]
    pub fn with_battlefield(mut self, battlefield: impl Into<StatValue>) -> Self {
        self.stats.battlefield = battlefield.into();
        self
    }

    #[must_use]
    pub fn with_spellboard(mut self, spellboard: impl Into<StatValue>) -> Self {
        self.stats.spellboard = spellboard.into();
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.push(keyword);
        self
    }

    #[must_use]
    pub fn with_trait(mut self, name: impl Into<String>) -> Self {
        self.traits.push(name.into());
        self
    }

    #[must_use]
    pub fn with_cost(mut self, requirement: impl Into<DiceRequirement>) -> Self {
        self.cost.push(requirement.into());
        self
    }

    #[must_use]
    pub fn with_setup(
        mut self,
        setup: impl Fn(&mut AbilityBuilder) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.setup = Some(CardSetup(Arc::new(setup)));
        self
    }

    /// Whether the printed traits include `name` (case-insensitive).
    #[must_use]
    pub fn has_printed_trait(&self, name: &str) -> bool {
        self.traits.iter().any(|t| t.eq_ignore_ascii_case(name))
    }
}
