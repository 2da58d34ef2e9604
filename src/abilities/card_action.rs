//! Activated abilities.
//!
//! A [`CardAction`] is an ability a player starts by using a card: its
//! costs, the locations it can be used from, an optional target spec and the
//! game actions it performs. Cards in hand also offer the [`BaseAction`]s
//! every card of their type has (play it, discard it).

use std::sync::Arc;

use smallvec::{smallvec, SmallVec};

use crate::actions::{ActionTarget, AttachProps, GameAction, PlayProps, TargetProps};
use crate::cards::{CardDefinition, CardType};
use crate::core::{EntityId, GameState, PlayerId};
use crate::costs::Cost;
use crate::effects::{EffectKind, Restriction};
use crate::zones::{Location, LocationScope};

use super::context::AbilityContext;
use super::limit::AbilityLimit;

/// Whose cards a target spec looks at, relative to the acting player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetPlayer {
    Own,
    Opponent,
    #[default]
    Any,
}

/// Extra filter on target candidates.
#[derive(Clone)]
pub struct CardPredicate(pub Arc<dyn Fn(&GameState, EntityId) -> bool + Send + Sync>);

impl std::fmt::Debug for CardPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CardPredicate(..)")
    }
}

/// Which cards an ability may target.
#[derive(Clone, Debug)]
pub struct TargetSpec {
    pub player: TargetPlayer,
    /// Empty means any type.
    pub card_types: SmallVec<[CardType; 4]>,
    pub locations: SmallVec<[Location; 2]>,
    pub condition: Option<CardPredicate>,
    /// The ability may resolve without a target.
    pub optional: bool,
}

impl Default for TargetSpec {
    fn default() -> Self {
        Self {
            player: TargetPlayer::Any,
            card_types: SmallVec::new(),
            locations: smallvec![Location::PlayArea],
            condition: None,
            optional: false,
        }
    }
}

impl TargetSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_player(mut self, player: TargetPlayer) -> Self {
        self.player = player;
        self
    }

    #[must_use]
    pub fn with_card_type(mut self, card_type: CardType) -> Self {
        self.card_types.push(card_type);
        self
    }

    /// Replace the searched locations.
    #[must_use]
    pub fn in_location(mut self, location: Location) -> Self {
        self.locations = smallvec![location];
        self
    }

    #[must_use]
    pub fn with_condition(
        mut self,
        condition: impl Fn(&GameState, EntityId) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.condition = Some(CardPredicate(Arc::new(condition)));
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Cards matching the spec, board by board in turn order from `player`.
    #[must_use]
    pub fn candidates(&self, state: &GameState, player: PlayerId) -> Vec<EntityId> {
        let boards = player.turn_order(state.player_count()).filter(|&p| match self.player {
            TargetPlayer::Own => p == player,
            TargetPlayer::Opponent => p != player,
            TargetPlayer::Any => true,
        });
        let mut result = Vec::new();
        for board in boards {
            for &location in &self.locations {
                for &card in state.cards_in(board, location) {
                    if self.accepts(state, card) {
                        result.push(card);
                    }
                }
            }
        }
        result
    }

    fn accepts(&self, state: &GameState, card: EntityId) -> bool {
        let type_ok = self.card_types.is_empty()
            || state
                .card_type(card)
                .map_or(false, |t| self.card_types.contains(&t));
        type_ok
            && state.allows(card, Restriction::BeTargeted)
            && self.condition.as_ref().map_or(true, |c| (c.0)(state, card))
    }

    /// Candidates at least one of the ability's chosen-target actions could
    /// affect.
    #[must_use]
    pub fn legal_targets(
        &self,
        state: &GameState,
        ctx: &AbilityContext,
        actions: &[GameAction],
    ) -> Vec<EntityId> {
        let targeted: Vec<&GameAction> = actions
            .iter()
            .filter(|a| a.target().map_or(false, ActionTarget::uses_chosen_targets))
            .collect();
        self.candidates(state, ctx.player)
            .into_iter()
            .filter(|&card| {
                if targeted.is_empty() {
                    return true;
                }
                let mut trial = ctx.clone();
                trial.targets = smallvec![card];
                targeted.iter().any(|a| a.can_affect(state, card, &trial))
            })
            .collect()
    }
}

/// An activated ability printed on (or granted to) a card.
///
/// ```
/// use ashes_rules::abilities::{CardAction, TargetSpec};
/// use ashes_rules::actions::GameAction;
/// use ashes_rules::costs::Cost;
/// use ashes_rules::zones::Location;
///
/// let action = CardAction::new("Summon False Demon")
///     .with_cost(Cost::SideAction)
///     .with_cost(Cost::Exhaust)
///     .in_location(Location::Spellboard)
///     .with_target(TargetSpec::new().in_location(Location::Archives))
///     .with_action(GameAction::put_into_play());
/// assert_eq!(action.costs.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct CardAction {
    pub title: String,
    pub costs: Vec<Cost>,
    pub scope: LocationScope,
    pub target: Option<TargetSpec>,
    pub actions: Vec<GameAction>,
    pub limit: Option<AbilityLimit>,
    /// Uses per player per round of every ability with this title.
    pub max: Option<u32>,
}

impl CardAction {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            costs: Vec::new(),
            scope: LocationScope::default(),
            target: None,
            actions: Vec::new(),
            limit: None,
            max: None,
        }
    }

    #[must_use]
    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.costs.push(cost);
        self
    }

    #[must_use]
    pub fn in_location(mut self, location: Location) -> Self {
        self.scope = LocationScope::only(location);
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: LocationScope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: GameAction) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: AbilityLimit) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }
}

/// Actions every card in hand offers according to its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BaseAction {
    PlayAlly,
    PlayReadySpell,
    PlayActionSpell,
    PlayAsUpgrade,
    Discard,
}

impl BaseAction {
    /// The base actions of a card, in menu order.
    #[must_use]
    pub fn for_card(state: &GameState, card: EntityId) -> Vec<BaseAction> {
        let Some(c) = state.try_card(card) else {
            return Vec::new();
        };
        if c.location != Location::Hand {
            return Vec::new();
        }
        let mut result = Vec::new();
        match state.card_type(card) {
            Some(CardType::Ally) => result.push(BaseAction::PlayAlly),
            Some(CardType::ReadySpell) => result.push(BaseAction::PlayReadySpell),
            Some(CardType::ActionSpell) => result.push(BaseAction::PlayActionSpell),
            _ => {}
        }
        if state.card_type(card) == Some(CardType::AlterationSpell)
            || state.has_effect(card, EffectKind::CanPlayAsUpgrade)
        {
            result.push(BaseAction::PlayAsUpgrade);
        }
        result.push(BaseAction::Discard);
        result
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            BaseAction::PlayAlly => "Play this ally",
            BaseAction::PlayReadySpell => "Play this ready spell",
            BaseAction::PlayActionSpell => "Play this action",
            BaseAction::PlayAsUpgrade => "Play this as an upgrade",
            BaseAction::Discard => "Discard this card",
        }
    }

    /// Playing a card spends a main action and its printed dice cost.
    #[must_use]
    pub fn costs(self, definition: &CardDefinition) -> Vec<Cost> {
        match self {
            BaseAction::Discard => Vec::new(),
            _ => {
                let mut costs = vec![Cost::MainAction];
                if !definition.cost.is_empty() {
                    costs.push(Cost::Dice(definition.cost.clone()));
                }
                costs
            }
        }
    }

    #[must_use]
    pub fn target(self) -> Option<TargetSpec> {
        match self {
            BaseAction::PlayAsUpgrade => Some(
                TargetSpec::new()
                    .with_card_type(CardType::Ally)
                    .with_card_type(CardType::Conjuration)
                    .with_card_type(CardType::Phoenixborn),
            ),
            _ => None,
        }
    }

    #[must_use]
    pub fn actions(self, card: EntityId) -> Vec<GameAction> {
        match self {
            BaseAction::PlayAsUpgrade => vec![GameAction::AttachUpgrade(AttachProps {
                target: ActionTarget::Chosen,
                upgrade: Some(card),
            })],
            BaseAction::Discard => vec![GameAction::Discard(TargetProps {
                target: ActionTarget::Source,
            })],
            _ => vec![GameAction::PlayCard(PlayProps {
                target: ActionTarget::Source,
                destination: None,
            })],
        }
    }

    /// Board-space checks against the player's Phoenixborn.
    #[must_use]
    pub fn has_room(self, state: &GameState, card: EntityId, player: PlayerId) -> bool {
        let Some(phoenixborn) = state
            .cards_in(player, Location::PlayArea)
            .iter()
            .copied()
            .find(|&c| state.card_type(c) == Some(CardType::Phoenixborn))
        else {
            return true;
        };
        match self {
            BaseAction::PlayAlly => {
                let units = state
                    .cards_in(player, Location::PlayArea)
                    .iter()
                    .filter(|&&c| state.is_unit(c))
                    .count();
                (units as i32) < state.battlefield(phoenixborn)
            }
            BaseAction::PlayReadySpell => {
                let name = state.card_name(card);
                let board = state.cards_in(player, Location::Spellboard);
                let mut names: Vec<String> = board.iter().map(|&c| state.card_name(c)).collect();
                if names.contains(&name) {
                    return true;
                }
                names.sort();
                names.dedup();
                (names.len() as i32) < state.spellboard(phoenixborn)
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{AbilityRef, ContextId};
    use crate::cards::Card;
    use crate::core::GameConfig;
    use crate::effects::Effect;

    fn setup() -> (GameState, Vec<EntityId>) {
        let mut state = GameState::new(GameConfig::new(2));
        let wolf = Arc::new(
            CardDefinition::new("masked-wolf", "Masked Wolf", CardType::Conjuration)
                .with_attack(2)
                .with_life(1),
        );
        let ally = Arc::new(CardDefinition::new("ally", "Anchornaut", CardType::Ally).with_life(1));
        let mut ids = Vec::new();
        for (def, owner, location) in [
            (wolf.clone(), PlayerId(0), Location::Archives),
            (wolf, PlayerId(1), Location::Archives),
            (ally.clone(), PlayerId(0), Location::PlayArea),
            (ally, PlayerId(0), Location::Hand),
        ] {
            let id = state.alloc_entity();
            state.insert_card(Card::new(id, def, owner, location));
            ids.push(id);
        }
        (state, ids)
    }

    #[test]
    fn test_candidates_by_player_and_location() {
        let (state, ids) = setup();
        let spec = TargetSpec::new()
            .with_player(TargetPlayer::Own)
            .with_card_type(CardType::Conjuration)
            .in_location(Location::Archives);
        assert_eq!(spec.candidates(&state, PlayerId(0)), vec![ids[0]]);

        let any = TargetSpec::new().in_location(Location::Archives);
        assert_eq!(any.candidates(&state, PlayerId(1)), vec![ids[1], ids[0]]);
    }

    #[test]
    fn test_condition_and_targeting_restriction() {
        let (mut state, ids) = setup();
        let spec = TargetSpec::new().with_condition(|s, c| s.card_name(c) == "Anchornaut");
        assert_eq!(spec.candidates(&state, PlayerId(0)), vec![ids[2]]);

        state
            .effects
            .add(Some(ids[2]), Effect::card_cannot(Restriction::BeTargeted));
        assert!(spec.candidates(&state, PlayerId(0)).is_empty());
    }

    #[test]
    fn test_legal_targets_filters_by_action() {
        let (state, _) = setup();
        let ctx = AbilityContext::new(ContextId(0), PlayerId(0), None, AbilityRef::Framework);
        let spec = TargetSpec::new().in_location(Location::Archives);

        let put = [GameAction::put_into_play()];
        assert_eq!(spec.legal_targets(&state, &ctx, &put).len(), 2);

        let exhaust = [GameAction::exhaust()];
        assert!(spec.legal_targets(&state, &ctx, &exhaust).is_empty());
    }

    #[test]
    fn test_base_actions_for_hand_cards() {
        let (state, ids) = setup();
        assert_eq!(
            BaseAction::for_card(&state, ids[3]),
            vec![BaseAction::PlayAlly, BaseAction::Discard]
        );
        assert!(BaseAction::for_card(&state, ids[2]).is_empty());

        let def = CardDefinition::new("ally", "Anchornaut", CardType::Ally)
            .with_cost(crate::dice::DiceCount::basic(1));
        assert_eq!(BaseAction::PlayAlly.costs(&def).len(), 2);
        assert!(BaseAction::Discard.costs(&def).is_empty());
    }
}
