//! Game facade integration tests.
//!
//! These tests cover turn and round housekeeping, ability limits, card
//! summaries and the handling of refused requests.

use std::sync::Arc;

use ashes_rules::abilities::{AbilityLimit, CardAction};
use ashes_rules::actions::GameAction;
use ashes_rules::cards::{CardDefinition, CardRegistry, CardSummary, CardType, TokenKind};
use ashes_rules::core::{GameConfig, PlayerId};
use ashes_rules::dice::DieId;
use ashes_rules::effects::{Effect, EffectKind, EffectMatch};
use ashes_rules::error::RulesError;
use ashes_rules::events::EventName;
use ashes_rules::game::Game;
use ashes_rules::pipeline::{PromptResponse, ResolutionStatus};
use ashes_rules::zones::Location;

fn catalog() -> Arc<CardRegistry> {
    let mut registry = CardRegistry::new();
    registry
        .register(
            CardDefinition::new("hammer-knight", "Hammer Knight", CardType::Ally)
                .with_attack(3)
                .with_life(4)
                .with_recover(2),
        )
        .unwrap();
    registry
        .register(
            CardDefinition::new("whistler", "Whistler", CardType::Ally)
                .with_attack(1)
                .with_life(1)
                .with_setup(|ability| {
                    ability.action(
                        CardAction::new("Whistle")
                            .with_action(GameAction::add_status_token())
                            .with_max(1),
                    )?;
                    ability.action(
                        CardAction::new("Hum")
                            .with_action(GameAction::add_status_token())
                            .with_limit(AbilityLimit::per_turn(1)),
                    )
                }),
        )
        .unwrap();
    Arc::new(registry)
}

fn game() -> Game {
    Game::new(GameConfig::new(2).with_seed(7), catalog()).unwrap()
}

fn titles(game: &Game, player: PlayerId, card: ashes_rules::core::EntityId) -> Vec<String> {
    game.legal_actions(player, card)
        .unwrap()
        .into_iter()
        .map(|(title, _)| title)
        .collect()
}

// ===== Turns =====

/// Test that ending a turn passes play and resets the next player.
#[test]
fn test_end_turn_passes_play() {
    let mut game = game();
    game.state_mut().player_mut(PlayerId(1)).unwrap().main_actions = 0;

    assert_eq!(game.end_turn().unwrap(), ResolutionStatus::Complete);
    let state = game.state();
    assert_eq!(state.active_player, PlayerId(1));
    assert_eq!(state.turn, 2);
    assert_eq!(state.player(PlayerId(1)).unwrap().main_actions, 1);
    assert!(game
        .pipeline()
        .events
        .iter()
        .any(|e| e.name == EventName::OnTurnEnded && e.executed));

    game.end_turn().unwrap();
    assert_eq!(game.state().active_player, PlayerId(0));
}

/// Test that per-turn limits reset with the turn.
#[test]
fn test_turn_limit_resets() {
    let mut game = game();
    let whistler = game
        .create_card(PlayerId(0), "whistler", Location::PlayArea)
        .unwrap();
    assert_eq!(titles(&game, PlayerId(0), whistler), vec!["Whistle", "Hum"]);

    // Both actions are legal, so the card offers a menu.
    game.use_card(PlayerId(0), whistler).unwrap();
    game.respond(PlayerId(0), PromptResponse::Choice(1)).unwrap();
    assert_eq!(titles(&game, PlayerId(0), whistler), vec!["Whistle"]);

    game.end_turn().unwrap();
    game.end_turn().unwrap();
    assert_eq!(titles(&game, PlayerId(0), whistler), vec!["Whistle", "Hum"]);
}

/// Test that an action granted by an effect is offered and resolves.
#[test]
fn test_gained_action() {
    let mut game = game();
    let knight = game
        .create_card(PlayerId(0), "hammer-knight", Location::PlayArea)
        .unwrap();
    assert!(game.legal_actions(PlayerId(0), knight).unwrap().is_empty());

    game.state_mut().effects.add(
        None,
        Effect::gain_ability(CardAction::new("Rally").with_action(GameAction::add_status_token()))
            .with_target(EffectMatch::Card(knight)),
    );
    assert_eq!(titles(&game, PlayerId(0), knight), vec!["Rally"]);

    assert_eq!(
        game.use_card(PlayerId(0), knight).unwrap(),
        ResolutionStatus::Complete
    );
    assert_eq!(
        game.state().card(knight).unwrap().tokens.count(&TokenKind::Status),
        1
    );
}

// ===== Rounds =====

/// Test round-end housekeeping: recovery, readying, dice and the log.
#[test]
fn test_end_round_housekeeping() {
    let mut game = game();
    let knight = game
        .create_card(PlayerId(0), "hammer-knight", Location::PlayArea)
        .unwrap();
    let tired = game
        .create_card(PlayerId(1), "hammer-knight", Location::PlayArea)
        .unwrap();
    {
        let state = game.state_mut();
        let card = state.card_mut(knight).unwrap();
        card.add_token(TokenKind::Damage, 3);
        card.exhaust();
        card.used_guard_this_round = true;
        state.card_mut(tired).unwrap().exhaust();
        state.effects.add(
            None,
            Effect::flag(EffectKind::DoesNotReady).with_target(EffectMatch::Card(tired)),
        );
        state.player_mut(PlayerId(0)).unwrap().die_mut(DieId(0)).unwrap().exhausted = true;
        state.player_mut(PlayerId(0)).unwrap().side_actions = 0;
    }
    game.end_turn().unwrap();

    assert_eq!(game.end_round().unwrap(), ResolutionStatus::Complete);
    let state = game.state();
    let card = state.card(knight).unwrap();
    assert_eq!(card.damage(), 1);
    assert!(!card.is_exhausted());
    assert!(!card.used_guard_this_round);
    assert!(state.card(tired).unwrap().is_exhausted());

    let player = state.player(PlayerId(0)).unwrap();
    assert!(player.dice.iter().all(|d| !d.exhausted));
    assert_eq!(player.dice.len(), 10);
    assert_eq!(player.side_actions, 1);

    assert_eq!(state.round, 2);
    assert_eq!(state.active_player, PlayerId(0));
    assert!(state.log.contains("Round 2 begins"));
    let ended = game
        .pipeline()
        .events
        .iter()
        .find(|e| e.name == EventName::OnRoundEnded)
        .unwrap();
    assert_eq!(ended.params.amount, 1);
}

/// Test that per-title maximums reset at the end of the round only.
#[test]
fn test_title_max_resets_per_round() {
    let mut game = game();
    let whistler = game
        .create_card(PlayerId(0), "whistler", Location::PlayArea)
        .unwrap();

    game.use_card(PlayerId(0), whistler).unwrap();
    game.respond(PlayerId(0), PromptResponse::Choice(0)).unwrap();
    assert_eq!(
        game.state().card(whistler).unwrap().tokens.count(&TokenKind::Status),
        1
    );
    assert_eq!(titles(&game, PlayerId(0), whistler), vec!["Hum"]);

    game.end_turn().unwrap();
    game.end_turn().unwrap();
    assert_eq!(titles(&game, PlayerId(0), whistler), vec!["Hum"]);

    game.end_round().unwrap();
    assert_eq!(titles(&game, PlayerId(0), whistler), vec!["Whistle", "Hum"]);
}

// ===== Summaries =====

/// Test what each seat sees of a card in hand.
#[test]
fn test_summary_visibility() {
    let mut game = game();
    let knight = game
        .create_card(PlayerId(0), "hammer-knight", Location::Hand)
        .unwrap();

    match game.summary(PlayerId(0), knight).unwrap() {
        CardSummary::Visible(card) => {
            assert_eq!(card.name, "Hammer Knight");
            assert!(card.can_play);
            assert_eq!(card.actions, vec!["Play this ally", "Discard this card"]);
            assert!(card.menu.is_none());
        }
        CardSummary::Hidden(_) => panic!("the owner sees their own hand"),
    }

    let hidden = game.summary(PlayerId(1), knight).unwrap();
    assert!(hidden.is_hidden());
    let json = serde_json::to_value(&hidden).unwrap();
    assert!(json.get("name").is_none());
    assert_eq!(json["location"], "hand");
}

/// Test the manual-mode token menu.
#[test]
fn test_manual_mode_menu() {
    let mut game = Game::new(GameConfig::new(2).with_manual_mode(true), catalog()).unwrap();
    let knight = game
        .create_card(PlayerId(0), "hammer-knight", Location::PlayArea)
        .unwrap();

    match game.summary(PlayerId(1), knight).unwrap() {
        CardSummary::Visible(card) => {
            let menu = card.menu.unwrap();
            assert!(menu.iter().any(|item| item.command == "addDamage"));
            assert!(!card.can_play);
        }
        CardSummary::Hidden(_) => panic!("cards in play are visible"),
    }
}

// ===== Refused requests =====

/// Test that refused requests are reported without corrupting the game.
#[test]
fn test_refusals_do_not_corrupt() {
    let mut game = game();
    let knight = game
        .create_card(PlayerId(1), "hammer-knight", Location::PlayArea)
        .unwrap();

    assert_eq!(
        game.respond(PlayerId(0), PromptResponse::Done),
        Err(RulesError::NoPendingPrompt)
    );
    assert!(matches!(
        game.use_card(PlayerId(0), knight),
        Err(RulesError::IllegalAction(_))
    ));
    assert!(matches!(
        game.create_card(PlayerId(5), "hammer-knight", Location::Hand),
        Err(RulesError::PlayerNotFound(_))
    ));
    assert!(!game.is_corrupted());
    assert_eq!(game.end_turn().unwrap(), ResolutionStatus::Complete);
}
