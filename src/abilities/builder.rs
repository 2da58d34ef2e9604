//! The ability builder handed to each card's setup function.
//!
//! A card definition declares its abilities by calling the builder from its
//! setup closure. The builder validates what it is given and collects
//! triggered abilities, activated actions and persistent effects; the game
//! then takes ownership of them when the card instance is created.
//!
//! Every structural problem (a reaction with no events, an action with no
//! effect, a persistent effect with a lasting duration) is reported as
//! `MalformedCard`, so a broken card fails to load instead of misbehaving
//! in play.

use crate::cards::CardDefinition;
use crate::core::EntityId;
use crate::effects::{Duration, Effect, EffectHandle};
use crate::error::{Result, RulesError};
use crate::events::EventName;
use crate::triggers::{AbilityId, AbilityKind, TriggerCondition, TriggeredAbility};
use crate::zones::LocationScope;

use super::card_action::CardAction;

/// A persistent effect declared by a card, live while the card is in one of
/// the scope's locations.
#[derive(Clone, Debug)]
pub struct PersistentEffect {
    pub effect: Effect,
    pub scope: LocationScope,
    /// Set while the effect is live in the engine.
    pub handle: Option<EffectHandle>,
}

/// The abilities a card instance carries.
#[derive(Clone, Debug, Default)]
pub struct CardAbilities {
    /// Triggered abilities, owned by the registry.
    pub triggered: Vec<AbilityId>,
    pub actions: Vec<CardAction>,
    pub persistent: Vec<PersistentEffect>,
}

/// Collects the abilities a card declares.
///
/// ```
/// use ashes_rules::abilities::AbilityBuilder;
/// use ashes_rules::actions::GameAction;
/// use ashes_rules::cards::{CardDefinition, CardType};
/// use ashes_rules::core::EntityId;
/// use ashes_rules::triggers::TriggeredAbility;
///
/// let def = CardDefinition::new("anchornaut", "Anchornaut", CardType::Ally)
///     .with_setup(|builder| {
///         builder.destroyed(TriggeredAbility::new("Throw").with_action(GameAction::discard()))
///     });
/// let builder = AbilityBuilder::build(EntityId(0), &def).unwrap();
/// assert_eq!(builder.triggered().len(), 1);
/// ```
#[derive(Debug)]
pub struct AbilityBuilder {
    card: EntityId,
    stub: String,
    triggered: Vec<TriggeredAbility>,
    actions: Vec<CardAction>,
    persistent: Vec<PersistentEffect>,
}

impl AbilityBuilder {
    pub fn new(card: EntityId, stub: impl Into<String>) -> Self {
        Self {
            card,
            stub: stub.into(),
            triggered: Vec::new(),
            actions: Vec::new(),
            persistent: Vec::new(),
        }
    }

    /// Declare everything a definition prints: its keywords first, then
    /// whatever its setup function adds.
    pub fn build(card: EntityId, definition: &CardDefinition) -> Result<Self> {
        let mut builder = Self::new(card, definition.stub.clone());
        for keyword in &definition.keywords {
            builder.persistent_effect_in(Effect::add_keyword(keyword.clone()), LocationScope::Any)?;
        }
        if let Some(setup) = &definition.setup {
            (setup.0)(&mut builder)?;
        }
        Ok(builder)
    }

    /// The card being set up.
    #[must_use]
    pub fn card(&self) -> EntityId {
        self.card
    }

    fn malformed(&self, reason: impl Into<String>) -> RulesError {
        RulesError::malformed(self.stub.clone(), reason)
    }

    /// A persistent effect live while the card is in play.
    pub fn persistent_effect(&mut self, effect: Effect) -> Result<()> {
        self.persistent_effect_in(effect, LocationScope::default())
    }

    pub fn persistent_effect_in(&mut self, effect: Effect, scope: LocationScope) -> Result<()> {
        if effect.duration != Duration::Persistent {
            return Err(self.malformed(format!(
                "persistent {:?} effect declared with duration {:?}",
                effect.kind, effect.duration
            )));
        }
        self.persistent.push(PersistentEffect {
            effect,
            scope,
            handle: None,
        });
        Ok(())
    }

    fn triggered_ability(&mut self, ability: TriggeredAbility, kind: AbilityKind) -> Result<()> {
        if ability.when.is_empty() {
            return Err(self.malformed(format!("'{}' listens for no events", ability.title)));
        }
        if ability.actions.is_empty() {
            return Err(self.malformed(format!("'{}' has no effect", ability.title)));
        }
        self.triggered.push(ability.with_kind(kind));
        Ok(())
    }

    pub fn reaction(&mut self, ability: TriggeredAbility) -> Result<()> {
        self.triggered_ability(ability, AbilityKind::Reaction)
    }

    pub fn forced_reaction(&mut self, ability: TriggeredAbility) -> Result<()> {
        self.triggered_ability(ability, AbilityKind::ForcedReaction)
    }

    pub fn interrupt(&mut self, ability: TriggeredAbility) -> Result<()> {
        self.triggered_ability(ability, AbilityKind::Interrupt)
    }

    pub fn forced_interrupt(&mut self, ability: TriggeredAbility) -> Result<()> {
        self.triggered_ability(ability, AbilityKind::ForcedInterrupt)
    }

    /// A reaction to this card being played. It fires wherever the card
    /// ends up.
    pub fn play(&mut self, mut ability: TriggeredAbility) -> Result<()> {
        ability.play = true;
        let ability = ability
            .on(EventName::OnCardPlayed, TriggerCondition::EventCardIsSource)
            .with_scope(LocationScope::Any);
        self.reaction(ability)
    }

    /// A reaction to this card attacking.
    pub fn fight(&mut self, mut ability: TriggeredAbility) -> Result<()> {
        ability.fight = true;
        self.reaction(ability.on(EventName::OnFight, TriggerCondition::AttackerIsSource))
    }

    /// A forced interrupt before this card is destroyed.
    pub fn destroyed(&mut self, ability: TriggeredAbility) -> Result<()> {
        self.forced_interrupt(ability.on(EventName::OnCardDestroyed, TriggerCondition::EventCardIsSource))
    }

    /// A forced reaction to this card entering play.
    pub fn enters_play(&mut self, ability: TriggeredAbility) -> Result<()> {
        self.forced_reaction(ability.on(EventName::OnCardEntersPlay, TriggerCondition::EventCardIsSource))
    }

    /// A forced interrupt before this card leaves play.
    pub fn leaves_play(&mut self, ability: TriggeredAbility) -> Result<()> {
        self.forced_interrupt(ability.on(EventName::OnCardLeavesPlay, TriggerCondition::EventCardIsSource))
    }

    /// A forced interrupt before this card's attack resolves.
    pub fn before_fight(&mut self, mut ability: TriggeredAbility) -> Result<()> {
        ability.fight = true;
        self.forced_interrupt(ability.on(EventName::OnFight, TriggerCondition::AttackerIsSource))
    }

    /// An activated ability.
    pub fn action(&mut self, action: CardAction) -> Result<()> {
        if action.actions.is_empty() {
            return Err(self.malformed(format!("action '{}' has no effect", action.title)));
        }
        self.actions.push(action);
        Ok(())
    }

    #[must_use]
    pub fn triggered(&self) -> &[TriggeredAbility] {
        &self.triggered
    }

    #[must_use]
    pub fn actions(&self) -> &[CardAction] {
        &self.actions
    }

    #[must_use]
    pub fn persistent(&self) -> &[PersistentEffect] {
        &self.persistent
    }

    /// Hand over the collected abilities.
    #[must_use]
    pub fn into_parts(self) -> (Vec<TriggeredAbility>, Vec<CardAction>, Vec<PersistentEffect>) {
        (self.triggered, self.actions, self.persistent)
    }
}
