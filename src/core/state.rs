//! Game state.
//!
//! `GameState` owns everything the rules read and write outside of the
//! resolution pipeline: players and their dice, card instances, boards, the
//! effect engine, the triggered-ability registry, ability usage counters and
//! the game log.
//!
//! ## Location changes
//!
//! [`GameState::move_card`] is the only way a card's location changes. It
//! keeps the boards, the card's ability registrations and its persistent
//! effects in step with the new location, and records a [`LocationChange`]
//! that the pipeline turns into an `onCardMoved` event. Moving a card to the
//! location it is already in does nothing and records nothing.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::abilities::AbilityUsage;
use crate::cards::{Card, CardDefinition};
use crate::dice::{Die, DieId, DieLevel, Magic};
use crate::effects::{EffectEngine, EffectKind, EffectValue, Stat};
use crate::error::{Result, RulesError};
use crate::triggers::TriggerRegistry;
use crate::zones::{Location, ZoneManager, ZonePosition};

use super::config::GameConfig;
use super::entity::EntityId;
use super::log::GameLog;
use super::player::{Player, PlayerId, PlayerMap};
use super::rng::GameRng;

/// A recorded location transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocationChange {
    pub card: EntityId,
    pub from: Location,
    pub to: Location,
}

/// Complete rules state of a game.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub players: PlayerMap<Player>,
    cards: FxHashMap<EntityId, Card>,
    pub zones: ZoneManager,
    pub effects: EffectEngine,
    pub triggers: TriggerRegistry,
    pub usage: AbilityUsage,
    pub active_player: PlayerId,
    pub round: u32,
    pub turn: u32,
    pub rng: GameRng,
    pub log: GameLog,
    pub winner: Option<PlayerId>,
    next_entity: u32,
    moves: Vec<LocationChange>,
}

impl GameState {
    /// Create an empty game state.
    ///
    /// # Panics
    ///
    /// Panics if `config.player_count` is 0 or greater than 255.
    pub fn new(config: GameConfig) -> Self {
        let options = config.player_options();
        let players = PlayerMap::new(config.player_count, |p| {
            Player::new(p, format!("Player {}", p.0), options.clone())
        });
        Self {
            rng: GameRng::new(config.seed),
            active_player: config.first_player,
            config,
            players,
            cards: FxHashMap::default(),
            zones: ZoneManager::new(),
            effects: EffectEngine::new(),
            triggers: TriggerRegistry::new(),
            usage: AbilityUsage::default(),
            round: 1,
            turn: 1,
            log: GameLog::new(),
            winner: None,
            next_entity: 0,
            moves: Vec::new(),
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    pub fn player(&self, player: PlayerId) -> Result<&Player> {
        self.players
            .try_get(player)
            .ok_or(RulesError::PlayerNotFound(player))
    }

    pub fn player_mut(&mut self, player: PlayerId) -> Result<&mut Player> {
        self.players
            .try_get_mut(player)
            .ok_or(RulesError::PlayerNotFound(player))
    }

    /// Players in turn order starting from the active player.
    pub fn turn_order(&self) -> impl Iterator<Item = PlayerId> {
        self.active_player.turn_order(self.player_count())
    }

    /// Allocate a new entity ID.
    pub fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    /// Track a newly created card and place it on its owner's board.
    pub(crate) fn insert_card(&mut self, card: Card) {
        self.zones.add(card.id, (card.owner, card.location), None);
        self.cards.insert(card.id, card);
    }

    pub fn card(&self, id: EntityId) -> Result<&Card> {
        self.cards.get(&id).ok_or(RulesError::CardNotFound(id))
    }

    pub fn card_mut(&mut self, id: EntityId) -> Result<&mut Card> {
        self.cards.get_mut(&id).ok_or(RulesError::CardNotFound(id))
    }

    #[must_use]
    pub fn try_card(&self, id: EntityId) -> Option<&Card> {
        self.cards.get(&id)
    }

    /// All card instances (unordered).
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// Cards on a player's board for a location, in order.
    #[must_use]
    pub fn cards_in(&self, player: PlayerId, location: Location) -> &[EntityId] {
        self.zones.cards(player, location)
    }

    /// Every card in play: each player's play area then spellboard, in seat
    /// order.
    #[must_use]
    pub fn cards_in_play(&self) -> Vec<EntityId> {
        let mut result = Vec::new();
        for player in self.players.player_ids() {
            result.extend_from_slice(self.cards_in(player, Location::PlayArea));
            result.extend_from_slice(self.cards_in(player, Location::Spellboard));
        }
        result
    }

    /// The units directly left and right of a unit in the play area.
    ///
    /// Non-units and cards outside the play area have no neighbors.
    #[must_use]
    pub fn neighbors(&self, id: EntityId) -> SmallVec<[EntityId; 2]> {
        let mut result = SmallVec::new();
        let Some(card) = self.try_card(id) else {
            return result;
        };
        if card.location != Location::PlayArea || !card.printed_type().is_unit() {
            return result;
        }
        let Some((board, _)) = self.zones.board_of(id) else {
            return result;
        };
        let units: Vec<EntityId> = self
            .cards_in(board, Location::PlayArea)
            .iter()
            .copied()
            .filter(|&e| self.try_card(e).map_or(false, |c| c.printed_type().is_unit()))
            .collect();
        if let Some(index) = units.iter().position(|&e| e == id) {
            if index > 0 {
                result.push(units[index - 1]);
            }
            if let Some(&right) = units.get(index + 1) {
                result.push(right);
            }
        }
        result
    }

    /// The definition whose printed values apply: the most recently copied
    /// card, or the card's own.
    #[must_use]
    pub fn printed_definition(&self, id: EntityId) -> Option<Arc<CardDefinition>> {
        let card = self.try_card(id)?;
        let copied = self
            .effects
            .most_recent(self, id, EffectKind::CopyCard)
            .and_then(|e| match &e.effect.value {
                EffectValue::Copy(def) => Some(def.clone()),
                _ => None,
            });
        Some(copied.unwrap_or_else(|| card.definition.clone()))
    }

    /// Printed value of a stat (armor is never printed).
    #[must_use]
    pub fn printed_stat(&self, id: EntityId, stat: Stat) -> i32 {
        let Some(def) = self.printed_definition(id) else {
            return 0;
        };
        match stat {
            Stat::Attack => def.stats.attack.printed(),
            Stat::Life => def.stats.life.printed(),
            Stat::Recover => def.stats.recover.printed(),
            Stat::Battlefield => def.stats.battlefield.printed(),
            Stat::Spellboard => def.stats.spellboard.printed(),
            Stat::Armor => 0,
        }
    }

    /// Move a card to a location.
    ///
    /// `board` names whose board receives the card; by default the
    /// controller's for in-play locations and the owner's otherwise. Returns
    /// `true` if the card's location changed.
    pub fn move_card(
        &mut self,
        id: EntityId,
        to: Location,
        board: Option<PlayerId>,
        position: Option<ZonePosition>,
    ) -> Result<bool> {
        let card = self.card(id)?;
        let from = card.location;
        let player = board.unwrap_or(if to.is_in_play() {
            card.controller
        } else {
            card.owner
        });

        if self.zones.move_to(id, (player, to), position).is_none() {
            self.zones.add(id, (player, to), position);
        }
        if from == to {
            return Ok(false);
        }

        let card = self.card_mut(id)?;
        card.location = to;
        card.facedown = to.is_hidden();
        self.sync_registrations(id, Some(from))?;
        self.moves.push(LocationChange { card: id, from, to });
        debug!(card = %id, %from, %to, "card moved");
        Ok(true)
    }

    /// Bring the card's triggered-ability registrations and persistent
    /// effects in line with its current location.
    ///
    /// `from` is `None` when the card was just created.
    pub(crate) fn sync_registrations(&mut self, id: EntityId, from: Option<Location>) -> Result<()> {
        let card = self.card(id)?;
        let to = card.location;
        let triggered = card.abilities.triggered.clone();

        for ability in triggered {
            let scope = self.triggers.scope_of(ability)?;
            let was_live = match from {
                Some(from) => scope.includes(from),
                None => false,
            };
            let is_live = scope.includes(to);
            if scope.is_any() {
                if from.is_none() {
                    self.triggers.register(ability)?;
                }
                continue;
            }
            if is_live && !was_live {
                self.triggers.register(ability)?;
            } else if was_live && !is_live {
                self.triggers.unregister(ability);
            }
        }

        let slots = self.card(id)?.abilities.persistent.len();
        for index in 0..slots {
            let (is_live, handle) = {
                let slot = &self.card(id)?.abilities.persistent[index];
                (slot.scope.includes(to), slot.handle)
            };
            match (is_live, handle) {
                (true, None) => {
                    let effect = self.card(id)?.abilities.persistent[index].effect.clone();
                    let handle = self.effects.add(Some(id), effect);
                    self.card_mut(id)?.abilities.persistent[index].handle = Some(handle);
                }
                (false, Some(handle)) => {
                    self.effects.remove(handle);
                    self.card_mut(id)?.abilities.persistent[index].handle = None;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Drain the recorded location changes.
    pub fn take_moves(&mut self) -> Vec<LocationChange> {
        std::mem::take(&mut self.moves)
    }

    /// Roll a fresh dice pool for a player.
    ///
    /// The pool cycles through the magic types in order; a real deck's dice
    /// pool composition is supplied with [`GameState::set_dice_pool`].
    pub fn roll_dice(&mut self, player: PlayerId) -> Result<()> {
        let count = self.config.dice_per_player;
        let mut dice = std::mem::take(&mut self.player_mut(player)?.dice);
        if dice.is_empty() {
            dice = (0..count)
                .map(|i| Die::new(DieId(i as u16), Magic::ALL[i % Magic::ALL.len()], DieLevel::Basic))
                .collect();
        }
        for die in &mut dice {
            die.reroll(&mut self.rng);
        }
        self.player_mut(player)?.dice = dice;
        Ok(())
    }

    /// Replace a player's dice pool with dice of the given magic types, all
    /// showing power faces and ready.
    pub fn set_dice_pool(&mut self, player: PlayerId, magics: &[Magic]) -> Result<()> {
        let dice = magics
            .iter()
            .enumerate()
            .map(|(i, &magic)| Die::new(DieId(i as u16), magic, DieLevel::Power))
            .collect();
        self.player_mut(player)?.dice = dice;
        Ok(())
    }

    /// Append a line to the game log.
    pub fn log_message(&mut self, message: impl Into<String>) {
        let round = self.round;
        self.log.push(round, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardType;

    fn state_with_units(count: usize) -> (GameState, Vec<EntityId>) {
        let mut state = GameState::new(GameConfig::new(2));
        let def = Arc::new(
            CardDefinition::new("ally", "Ally", CardType::Ally)
                .with_attack(1)
                .with_life(2),
        );
        let ids = (0..count)
            .map(|_| {
                let id = state.alloc_entity();
                state.insert_card(Card::new(id, def.clone(), PlayerId(0), Location::PlayArea));
                id
            })
            .collect();
        (state, ids)
    }

    #[test]
    fn test_alloc_entity_monotonic() {
        let mut state = GameState::new(GameConfig::new(2));
        let a = state.alloc_entity();
        let b = state.alloc_entity();
        assert_eq!(b.raw(), a.raw() + 1);
    }

    #[test]
    fn test_neighbors_by_board_order() {
        let (state, ids) = state_with_units(3);
        assert_eq!(state.neighbors(ids[0]).as_slice(), &[ids[1]]);
        assert_eq!(state.neighbors(ids[1]).as_slice(), &[ids[0], ids[2]]);
        assert_eq!(state.neighbors(ids[2]).as_slice(), &[ids[1]]);
    }

    #[test]
    fn test_move_card_records_change_once() {
        let (mut state, ids) = state_with_units(1);

        assert!(state.move_card(ids[0], Location::Discard, None, None).unwrap());
        assert!(!state.move_card(ids[0], Location::Discard, None, None).unwrap());

        let moves = state.take_moves();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].from, Location::PlayArea);
        assert_eq!(moves[0].to, Location::Discard);
        assert_eq!(state.card(ids[0]).unwrap().location, Location::Discard);
        assert!(state.take_moves().is_empty());
    }

    #[test]
    fn test_move_to_hand_is_facedown() {
        let (mut state, ids) = state_with_units(1);
        state.move_card(ids[0], Location::Hand, None, None).unwrap();
        assert!(state.card(ids[0]).unwrap().facedown);
        assert_eq!(state.cards_in(PlayerId(0), Location::Hand), &[ids[0]]);
    }

    #[test]
    fn test_missing_card_and_player() {
        let mut state = GameState::new(GameConfig::new(2));
        assert_eq!(
            state.card(EntityId(99)).unwrap_err(),
            RulesError::CardNotFound(EntityId(99))
        );
        assert!(state.player(PlayerId(5)).is_err());
        assert!(state.move_card(EntityId(1), Location::Hand, None, None).is_err());
    }

    #[test]
    fn test_roll_dice_is_deterministic() {
        let mut a = GameState::new(GameConfig::new(2).with_seed(5));
        let mut b = GameState::new(GameConfig::new(2).with_seed(5));
        a.roll_dice(PlayerId(0)).unwrap();
        b.roll_dice(PlayerId(0)).unwrap();
        assert_eq!(a.players[PlayerId(0)].dice, b.players[PlayerId(0)].dice);
        assert_eq!(a.players[PlayerId(0)].dice.len(), 10);
    }
}
