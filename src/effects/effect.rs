//! Effect vocabulary.
//!
//! An [`Effect`] is a typed modification applied to the cards it matches: a
//! kind from the closed [`EffectKind`] set, a payload, a match rule, an
//! optional condition and a duration.
//!
//! ## Durations
//!
//! - `Persistent`: live while its source card is in one of the locations of
//!   the declaring ability's scope. The card's movement registers and
//!   unregisters it.
//! - `UntilEndOfTurn` / `UntilEndOfRound`: lasting effects removed by turn or
//!   round housekeeping.
//! - `WhileTargetInPlay`: a lasting effect removed by the game-state check
//!   once none of its pinned targets is in play.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::abilities::CardAction;
use crate::cards::{CardDefinition, CardType, Keyword, TokenKind};
use crate::core::{EntityId, GameState, PlayerId};
use crate::error::Result;

/// A numeric card stat computed from printed value and effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Attack,
    Life,
    Recover,
    Armor,
    Battlefield,
    Spellboard,
}

impl Stat {
    /// The effect kind that replaces this stat's base value.
    #[must_use]
    pub fn set_kind(self) -> EffectKind {
        match self {
            Stat::Attack => EffectKind::SetAttack,
            Stat::Life => EffectKind::SetLife,
            Stat::Recover => EffectKind::SetRecover,
            Stat::Armor => EffectKind::SetArmor,
            Stat::Battlefield => EffectKind::SetBattlefield,
            Stat::Spellboard => EffectKind::SetSpellboard,
        }
    }

    /// The effect kind that adds to this stat.
    #[must_use]
    pub fn modify_kind(self) -> EffectKind {
        match self {
            Stat::Attack => EffectKind::ModifyAttack,
            Stat::Life => EffectKind::ModifyLife,
            Stat::Recover => EffectKind::ModifyRecover,
            Stat::Armor => EffectKind::ModifyArmor,
            Stat::Battlefield => EffectKind::ModifyBattlefield,
            Stat::Spellboard => EffectKind::ModifySpellboard,
        }
    }
}

/// Every kind of effect the engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    SetAttack,
    ModifyAttack,
    SetLife,
    ModifyLife,
    SetRecover,
    ModifyRecover,
    SetArmor,
    ModifyArmor,
    SetBattlefield,
    ModifyBattlefield,
    SetSpellboard,
    ModifySpellboard,
    AddKeyword,
    RemoveKeyword,
    AddTrait,
    GainAbility,
    CardCannot,
    TakeControl,
    CopyCard,
    ChangeType,
    Blank,
    CanBeTriggeredByOpponent,
    DoesNotReady,
    CanGuard,
    ConsideredAsFlank,
    BonusDamage,
    CanPlayAsUpgrade,
}

/// Things a `CardCannot` effect can forbid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Restriction {
    BeDamaged,
    BeDestroyed,
    BeExhausted,
    BeReadied,
    ReceiveTokens,
    LoseTokens,
    BeMoved,
    Guard,
    Block,
    BeTargeted,
}

/// Computes an amount from the state, the effect source and the target.
#[derive(Clone)]
pub struct AmountFn(pub Arc<dyn Fn(&GameState, Option<EntityId>, EntityId) -> i32 + Send + Sync>);

impl std::fmt::Debug for AmountFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AmountFn(..)")
    }
}

/// The numeric payload of an effect.
#[derive(Clone, Debug)]
pub enum Amount {
    Fixed(i32),
    /// The source card's current count of a token kind.
    SourceTokens(TokenKind),
    Computed(AmountFn),
}

impl Amount {
    pub fn computed(
        f: impl Fn(&GameState, Option<EntityId>, EntityId) -> i32 + Send + Sync + 'static,
    ) -> Self {
        Amount::Computed(AmountFn(Arc::new(f)))
    }

    /// Evaluate the amount for one target card.
    #[must_use]
    pub fn evaluate(&self, state: &GameState, source: Option<EntityId>, target: EntityId) -> i32 {
        match self {
            Amount::Fixed(n) => *n,
            Amount::SourceTokens(kind) => source
                .and_then(|s| state.try_card(s))
                .map_or(0, |c| c.tokens.count(kind) as i32),
            Amount::Computed(f) => (f.0)(state, source, target),
        }
    }
}

impl From<i32> for Amount {
    fn from(n: i32) -> Self {
        Amount::Fixed(n)
    }
}

/// Controller relation between a matched card and the effect's source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Controller,
    Opponent,
    Any,
}

/// A fallible match predicate: `(state, source, candidate)`.
///
/// An `Err` result is treated as "does not match".
#[derive(Clone)]
pub struct MatchFn(pub Arc<dyn Fn(&GameState, Option<EntityId>, EntityId) -> Result<bool> + Send + Sync>);

impl std::fmt::Debug for MatchFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MatchFn(..)")
    }
}

/// Which cards an effect applies to.
///
/// Matching reads printed types and stored controllers only, so that
/// evaluating a match never recurses into the effect engine.
#[derive(Clone, Debug)]
pub enum EffectMatch {
    /// The effect's source card.
    SelfCard,
    /// The card the source upgrade is attached to.
    Parent,
    Card(EntityId),
    Cards(SmallVec<[EntityId; 2]>),
    /// The source's current neighbors.
    Neighbors,
    /// Units in play whose controller relates to the source's controller.
    Units(Relation),
    Predicate(MatchFn),
}

impl EffectMatch {
    pub fn predicate(
        f: impl Fn(&GameState, Option<EntityId>, EntityId) -> Result<bool> + Send + Sync + 'static,
    ) -> Self {
        EffectMatch::Predicate(MatchFn(Arc::new(f)))
    }
}

/// Condition on the whole effect: `(state, source)`.
#[derive(Clone)]
pub struct ConditionFn(pub Arc<dyn Fn(&GameState, Option<EntityId>) -> bool + Send + Sync>);

impl std::fmt::Debug for ConditionFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConditionFn(..)")
    }
}

/// How long an effect lasts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Duration {
    #[default]
    Persistent,
    UntilEndOfTurn,
    UntilEndOfRound,
    WhileTargetInPlay,
}

/// The payload of an effect.
#[derive(Clone, Debug)]
pub enum EffectValue {
    /// Flag effects (`Blank`, `CanGuard`, ...).
    Flag,
    Amount(Amount),
    Keyword(Keyword),
    /// A keyword or trait name to remove / add.
    Name(String),
    Restriction(Restriction),
    Player(PlayerId),
    Copy(Arc<CardDefinition>),
    CardType(CardType),
    Action(Box<CardAction>),
}

/// A typed modification.
///
/// ```
/// use ashes_rules::effects::{Effect, EffectMatch, Relation, Stat};
///
/// // +1 attack to every unit its controller controls, while in play
/// let effect = Effect::modify_stat(Stat::Attack, 1)
///     .with_target(EffectMatch::Units(Relation::Controller));
/// assert!(matches!(effect.target, EffectMatch::Units(Relation::Controller)));
/// ```
#[derive(Clone, Debug)]
pub struct Effect {
    pub kind: EffectKind,
    pub value: EffectValue,
    pub target: EffectMatch,
    pub condition: Option<ConditionFn>,
    pub duration: Duration,
}

impl Effect {
    /// A persistent effect of `kind` on the source card.
    pub fn new(kind: EffectKind, value: EffectValue) -> Self {
        Self {
            kind,
            value,
            target: EffectMatch::SelfCard,
            condition: None,
            duration: Duration::Persistent,
        }
    }

    pub fn set_stat(stat: Stat, amount: impl Into<Amount>) -> Self {
        Self::new(stat.set_kind(), EffectValue::Amount(amount.into()))
    }

    pub fn modify_stat(stat: Stat, amount: impl Into<Amount>) -> Self {
        Self::new(stat.modify_kind(), EffectValue::Amount(amount.into()))
    }

    pub fn add_keyword(keyword: Keyword) -> Self {
        Self::new(EffectKind::AddKeyword, EffectValue::Keyword(keyword))
    }

    pub fn remove_keyword(name: impl Into<String>) -> Self {
        Self::new(
            EffectKind::RemoveKeyword,
            EffectValue::Name(name.into().to_lowercase()),
        )
    }

    pub fn add_trait(name: impl Into<String>) -> Self {
        Self::new(EffectKind::AddTrait, EffectValue::Name(name.into()))
    }

    pub fn card_cannot(restriction: Restriction) -> Self {
        Self::new(EffectKind::CardCannot, EffectValue::Restriction(restriction))
    }

    pub fn take_control(player: PlayerId) -> Self {
        Self::new(EffectKind::TakeControl, EffectValue::Player(player))
    }

    pub fn copy_card(definition: Arc<CardDefinition>) -> Self {
        Self::new(EffectKind::CopyCard, EffectValue::Copy(definition))
    }

    pub fn change_type(card_type: CardType) -> Self {
        Self::new(EffectKind::ChangeType, EffectValue::CardType(card_type))
    }

    pub fn gain_ability(action: CardAction) -> Self {
        Self::new(EffectKind::GainAbility, EffectValue::Action(Box::new(action)))
    }

    pub fn bonus_damage(amount: impl Into<Amount>) -> Self {
        Self::new(EffectKind::BonusDamage, EffectValue::Amount(amount.into()))
    }

    /// A payload-free effect such as `Blank` or `CanGuard`.
    pub fn flag(kind: EffectKind) -> Self {
        Self::new(kind, EffectValue::Flag)
    }

    #[must_use]
    pub fn with_target(mut self, target: EffectMatch) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_condition(
        mut self,
        condition: impl Fn(&GameState, Option<EntityId>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.condition = Some(ConditionFn(Arc::new(condition)));
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn until_end_of_turn(self) -> Self {
        self.with_duration(Duration::UntilEndOfTurn)
    }

    #[must_use]
    pub fn until_end_of_round(self) -> Self {
        self.with_duration(Duration::UntilEndOfRound)
    }

    #[must_use]
    pub fn while_target_in_play(self) -> Self {
        self.with_duration(Duration::WhileTargetInPlay)
    }

    /// The amount payload, if this effect carries one.
    #[must_use]
    pub fn amount(&self) -> Option<&Amount> {
        match &self.value {
            EffectValue::Amount(a) => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_kinds() {
        assert_eq!(Stat::Attack.set_kind(), EffectKind::SetAttack);
        assert_eq!(Stat::Armor.modify_kind(), EffectKind::ModifyArmor);
    }

    #[test]
    fn test_effect_builders() {
        let effect = Effect::modify_stat(Stat::Life, 2)
            .with_target(EffectMatch::Card(EntityId(3)))
            .until_end_of_round();

        assert_eq!(effect.kind, EffectKind::ModifyLife);
        assert_eq!(effect.duration, Duration::UntilEndOfRound);
        assert!(matches!(effect.amount(), Some(Amount::Fixed(2))));

        let blank = Effect::flag(EffectKind::Blank);
        assert!(blank.amount().is_none());
        assert!(matches!(blank.target, EffectMatch::SelfCard));
    }

    #[test]
    fn test_remove_keyword_lowercases() {
        let effect = Effect::remove_keyword("Overkill");
        assert!(matches!(effect.value, EffectValue::Name(ref n) if n == "overkill"));
    }
}
