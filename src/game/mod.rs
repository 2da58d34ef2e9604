//! The game instance: state, resolution pipeline and catalog.
//!
//! [`Game`] is the entry point for the session layer. It creates cards from
//! the catalog, accepts player requests (use a card, answer a prompt, end the
//! turn or round) and drives the pipeline until it completes or waits for a
//! decision.
//!
//! An internal fault flags the game as corrupted. From then on every request
//! fails with `Corrupted`.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::abilities::{
    AbilityBuilder, AbilityContext, AbilityPlan, AbilityRef, BaseAction, ContextId, LimitPeriod,
};
use crate::actions::GameAction;
use crate::cards::{Card, CardRegistry, CardSummary, TokenKind};
use crate::core::{EntityId, GameConfig, GameState, PlayerId};
use crate::effects::{Duration, EffectKind};
use crate::error::{Result, RulesError};
use crate::events::{EventContext, EventName, GameEvent};
use crate::pipeline::{Pipeline, Prompt, PromptResponse, ResolutionStatus};
use crate::zones::Location;

/// A running game.
#[derive(Clone, Debug)]
pub struct Game {
    state: GameState,
    pipeline: Pipeline,
    catalog: Arc<CardRegistry>,
    corrupted: Option<String>,
}

impl Game {
    /// Create a game and roll every player's dice.
    pub fn new(config: GameConfig, catalog: Arc<CardRegistry>) -> Result<Self> {
        config.validate()?;
        let mut state = GameState::new(config);
        for player in PlayerId::all(state.player_count()) {
            state.roll_dice(player)?;
        }
        Ok(Self {
            state,
            pipeline: Pipeline::new(),
            catalog,
            corrupted: None,
        })
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for setup and tests. Changes made here bypass the
    /// event pipeline.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    #[must_use]
    pub fn catalog(&self) -> &CardRegistry {
        &self.catalog
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.state.winner
    }

    #[must_use]
    pub fn is_corrupted(&self) -> bool {
        self.corrupted.is_some()
    }

    /// The prompt resolution is waiting on.
    #[must_use]
    pub fn prompt(&self) -> Option<&Prompt> {
        self.pipeline.prompt()
    }

    fn ensure_usable(&self) -> Result<()> {
        match &self.corrupted {
            Some(reason) => Err(RulesError::Corrupted(reason.clone())),
            None => Ok(()),
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        self.ensure_usable()?;
        if self.pipeline.is_idle() {
            Ok(())
        } else {
            Err(RulesError::IllegalAction(
                "another resolution is in progress".to_string(),
            ))
        }
    }

    /// Flag the game as corrupted if `result` carries an internal fault.
    fn checked<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_fatal() && self.corrupted.is_none() {
                error!(error = %err, "game corrupted");
                self.corrupted = Some(err.to_string());
                self.pipeline.clear();
            }
        }
        result
    }

    fn advance(&mut self) -> Result<ResolutionStatus> {
        let result = self.pipeline.run(&mut self.state);
        self.checked(result)
    }

    // ===== Cards =====

    /// Instantiate a catalog card for `owner` in `location`.
    pub fn create_card(&mut self, owner: PlayerId, stub: &str, location: Location) -> Result<EntityId> {
        self.ensure_usable()?;
        self.state.player(owner)?;
        let definition = self.catalog.require(stub)?;
        let id = self.state.alloc_entity();
        let (triggered, actions, persistent) = AbilityBuilder::build(id, &definition)?.into_parts();

        let mut card = Card::new(id, definition, owner, location);
        for ability in triggered {
            let ability = self.state.triggers.add(id, ability)?;
            card.abilities.triggered.push(ability);
        }
        card.abilities.actions = actions;
        card.abilities.persistent = persistent;
        self.state.insert_card(card);
        let result = self.state.sync_registrations(id, None);
        self.checked(result)?;
        debug!(card = %id, %stub, %owner, %location, "card created");
        Ok(id)
    }

    /// The actions `player` may take with `card` right now, as menu titles
    /// and the abilities they resolve.
    pub fn legal_actions(&self, player: PlayerId, card: EntityId) -> Result<Vec<(String, AbilityRef)>> {
        let state = &self.state;
        let c = state.card(card)?;
        if player != state.active_player || c.controller != player {
            return Ok(Vec::new());
        }
        let passes = |ability: AbilityRef, plan: AbilityPlan| {
            let ctx = AbilityContext::new(ContextId(u32::MAX), player, Some(card), ability).with_plan(plan);
            ctx.plan.check(state, &ctx).is_ok()
        };

        let mut result = Vec::new();
        for base in BaseAction::for_card(state, card) {
            if !base.has_room(state, card, player) {
                continue;
            }
            let plan = AbilityPlan::for_base(base, &c.definition, card);
            if passes(AbilityRef::Base(base), plan) {
                result.push((base.title().to_string(), AbilityRef::Base(base)));
            }
        }
        if !state.is_blank(card) {
            for (index, action) in c.abilities.actions.iter().enumerate() {
                if action.scope.includes(c.location)
                    && passes(AbilityRef::Action { card, index }, AbilityPlan::for_action(action, card))
                {
                    result.push((action.title.clone(), AbilityRef::Action { card, index }));
                }
            }
        }
        for (index, action) in state.gained_actions(card).iter().enumerate() {
            if action.scope.includes(c.location)
                && passes(AbilityRef::Gained { card, index }, AbilityPlan::for_action(action, card))
            {
                result.push((action.title.clone(), AbilityRef::Gained { card, index }));
            }
        }
        Ok(result)
    }

    /// What `viewer` may know about `card`.
    pub fn summary(&self, viewer: PlayerId, card: EntityId) -> Result<CardSummary> {
        let titles = |id: EntityId| -> Vec<String> {
            self.legal_actions(viewer, id)
                .map(|actions| actions.into_iter().map(|(title, _)| title).collect())
                .unwrap_or_default()
        };
        CardSummary::build(&self.state, viewer, card, &titles)
    }

    // ===== Player requests =====

    /// Use a card: resolve its single legal action directly, or offer a
    /// menu of them.
    pub fn use_card(&mut self, player: PlayerId, card: EntityId) -> Result<ResolutionStatus> {
        self.ensure_idle()?;
        let options = self.legal_actions(player, card)?;
        let name = self.state.card_name(card);
        if options.is_empty() {
            warn!(%player, %card, "card has no legal action");
            return Err(RulesError::IllegalAction(format!("{name} has no legal action")));
        }

        let confirm = self.state.player(player)?.options.confirm_one_click;
        if options.len() == 1 && !confirm {
            let ability = options[0].1;
            let result = self
                .pipeline
                .start_ability(&self.state, player, Some(card), ability, None);
            self.checked(result)?;
        } else {
            let title = if self.state.card(card)?.location.is_in_play() {
                "Choose an ability:".to_string()
            } else {
                format!("Play {name}:")
            };
            self.pipeline.open_menu(player, card, title, options);
        }
        self.advance()
    }

    /// Resolve a rules-driven game action.
    pub fn perform(
        &mut self,
        player: PlayerId,
        source: Option<EntityId>,
        action: GameAction,
    ) -> Result<ResolutionStatus> {
        self.ensure_idle()?;
        self.pipeline.resolve_action(player, source, action);
        self.advance()
    }

    /// Resolve a batch of events in one window.
    pub fn open_event_window(&mut self, events: Vec<GameEvent>) -> Result<ResolutionStatus> {
        self.ensure_idle()?;
        self.pipeline.open_event_window(events);
        self.advance()
    }

    /// Answer the pending prompt and continue resolution.
    pub fn respond(&mut self, player: PlayerId, response: PromptResponse) -> Result<ResolutionStatus> {
        self.ensure_usable()?;
        if let Err(err) = self.pipeline.respond(player, response) {
            warn!(%player, ?response, error = %err, "response refused");
            return Err(err);
        }
        self.advance()
    }

    // ===== Turn and round =====

    /// End the active player's turn.
    pub fn end_turn(&mut self) -> Result<ResolutionStatus> {
        self.ensure_idle()?;
        let ended = self.state.active_player;
        let expired = self.state.effects.expire(Duration::UntilEndOfTurn);
        self.state.usage.reset(LimitPeriod::Turn);

        let next = ended.next(self.state.player_count());
        self.state.player_mut(next)?.reset_actions();
        self.state.active_player = next;
        self.state.turn += 1;
        debug!(%ended, %next, expired, "turn ended");

        self.pipeline.open_event_window(vec![
            GameEvent::new(EventName::OnTurnEnded, EventContext::new(ended)).with_player(ended)
        ]);
        self.advance()
    }

    /// End the round: expire lasting effects, reset limits, recover units,
    /// roll fresh dice and hand the first turn back to the first player.
    pub fn end_round(&mut self) -> Result<ResolutionStatus> {
        self.ensure_idle()?;
        let state = &mut self.state;
        let expired = state.effects.expire(Duration::UntilEndOfRound)
            + state.effects.expire(Duration::UntilEndOfTurn);
        state.usage.reset(LimitPeriod::Round);
        state.usage.reset(LimitPeriod::Turn);

        for id in state.cards_in_play() {
            let recover = state.recover(id).max(0) as u32;
            let is_unit = state.is_unit(id);
            let stays_exhausted = state.has_effect(id, EffectKind::DoesNotReady);
            let card = state.card_mut(id)?;
            card.used_guard_this_round = false;
            if is_unit && recover > 0 {
                card.remove_token(&TokenKind::Damage, recover);
            }
            if !stays_exhausted {
                card.un_exhaust();
            }
        }

        for player in PlayerId::all(state.player_count()) {
            state.player_mut(player)?.reset_actions();
            state.roll_dice(player)?;
        }

        let ended = state.round;
        state.round += 1;
        state.turn += 1;
        state.active_player = state.config.first_player;
        info!(round = ended, expired, "round ended");
        state.log_message(format!("Round {} begins", state.round));

        let first = state.active_player;
        self.pipeline.open_event_window(vec![
            GameEvent::new(EventName::OnRoundEnded, EventContext::new(first)).with_amount(ended as i32)
        ]);
        self.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardType};
    use crate::effects::{Effect, Stat};

    fn catalog() -> Arc<CardRegistry> {
        let mut registry = CardRegistry::new();
        registry
            .register(
                CardDefinition::new("hammer-knight", "Hammer Knight", CardType::Ally)
                    .with_attack(3)
                    .with_life(3)
                    .with_recover(1),
            )
            .unwrap();
        Arc::new(registry)
    }

    #[test]
    fn test_create_unknown_card() {
        let mut game = Game::new(GameConfig::new(2), catalog()).unwrap();
        assert!(matches!(
            game.create_card(PlayerId(0), "nope", Location::Hand),
            Err(RulesError::MalformedCard { .. })
        ));
    }

    #[test]
    fn test_end_turn_passes_and_expires() {
        let mut game = Game::new(GameConfig::new(2), catalog()).unwrap();
        let knight = game
            .create_card(PlayerId(0), "hammer-knight", Location::PlayArea)
            .unwrap();
        game.state_mut().effects.add(
            Some(knight),
            Effect::modify_stat(Stat::Attack, 2).until_end_of_turn(),
        );
        assert_eq!(game.state().attack(knight), 5);

        assert_eq!(game.end_turn().unwrap(), ResolutionStatus::Complete);
        assert_eq!(game.state().attack(knight), 3);
        assert_eq!(game.state().active_player, PlayerId(1));
    }

    #[test]
    fn test_end_round_recovers_and_readies() {
        let mut game = Game::new(GameConfig::new(2), catalog()).unwrap();
        let knight = game
            .create_card(PlayerId(0), "hammer-knight", Location::PlayArea)
            .unwrap();
        {
            let card = game.state_mut().card_mut(knight).unwrap();
            card.add_token(TokenKind::Damage, 2);
            card.exhaust();
        }
        game.end_round().unwrap();

        let card = game.state().card(knight).unwrap();
        assert_eq!(card.damage(), 1);
        assert!(!card.is_exhausted());
        assert_eq!(game.state().round, 2);
        assert_eq!(game.state().active_player, PlayerId(0));
    }

    #[test]
    fn test_corruption_is_sticky() {
        let mut game = Game::new(GameConfig::new(2), catalog()).unwrap();
        let result: Result<()> = Err(RulesError::InvariantViolation("broken".into()));
        assert!(game.checked(result).is_err());
        assert!(game.is_corrupted());
        assert!(matches!(game.end_turn(), Err(RulesError::Corrupted(_))));
    }
}
