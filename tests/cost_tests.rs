//! Cost payment integration tests.
//!
//! These tests drive the interactive dice prompt end to end and check that
//! the other costs are paid through ordinary events.

use std::sync::Arc;

use ashes_rules::abilities::CardAction;
use ashes_rules::actions::GameAction;
use ashes_rules::cards::{CardDefinition, CardRegistry, CardType, TokenKind};
use ashes_rules::core::{GameConfig, PlayerId};
use ashes_rules::costs::Cost;
use ashes_rules::dice::{DiceCount, DieId, Magic};
use ashes_rules::error::RulesError;
use ashes_rules::game::Game;
use ashes_rules::pipeline::{Prompt, PromptResponse, ResolutionStatus};
use ashes_rules::zones::Location;

fn catalog() -> Arc<CardRegistry> {
    let mut registry = CardRegistry::new();
    registry
        .register(
            CardDefinition::new("ritualist", "Ritualist", CardType::Ally)
                .with_attack(1)
                .with_life(2)
                .with_setup(|ability| {
                    ability.action(
                        CardAction::new("Commune")
                            .with_cost(Cost::dice([DiceCount::basic(2)]))
                            .with_action(GameAction::add_status_token()),
                    )
                }),
        )
        .unwrap();
    registry
        .register(
            CardDefinition::new("fire-archer", "Fire Archer", CardType::Ally)
                .with_attack(3)
                .with_life(1)
                .with_cost(DiceCount::class(1, Magic::Natural)),
        )
        .unwrap();
    Arc::new(registry)
}

fn game() -> Game {
    let mut game = Game::new(GameConfig::new(2), catalog()).unwrap();
    game.state_mut()
        .set_dice_pool(PlayerId(0), &[Magic::Charm, Magic::Natural, Magic::Illusion])
        .unwrap();
    game
}

fn is_exhausted(game: &Game, die: u16) -> bool {
    game.state()
        .player(PlayerId(0))
        .unwrap()
        .die(DieId(die))
        .unwrap()
        .exhausted
}

fn chosen(game: &Game) -> Vec<DieId> {
    match game.prompt() {
        Some(Prompt::SelectDice { chosen, .. }) => chosen.clone(),
        other => panic!("expected a dice prompt, got {other:?}"),
    }
}

// ===== Dice =====

/// Test that an exact-count cost re-prompts on an incomplete "Done".
#[test]
fn test_incomplete_selection_reprompts() {
    let mut game = game();
    let ritualist = game
        .create_card(PlayerId(0), "ritualist", Location::PlayArea)
        .unwrap();

    assert_eq!(
        game.use_card(PlayerId(0), ritualist).unwrap(),
        ResolutionStatus::WaitingForPlayer(PlayerId(0))
    );
    match game.prompt() {
        Some(Prompt::SelectDice {
            title,
            selectable,
            can_finish,
            ..
        }) => {
            assert_eq!(title, "Select dice to pay for Commune");
            assert_eq!(selectable.len(), 3);
            assert!(!can_finish);
        }
        other => panic!("expected a dice prompt, got {other:?}"),
    }

    game.respond(PlayerId(0), PromptResponse::Die(DieId(0)))
        .unwrap();
    assert_eq!(chosen(&game), vec![DieId(0)]);

    // One die of two: "Done" must not commit.
    assert_eq!(
        game.respond(PlayerId(0), PromptResponse::Done).unwrap(),
        ResolutionStatus::WaitingForPlayer(PlayerId(0))
    );
    assert_eq!(chosen(&game), vec![DieId(0)]);
    assert!(!is_exhausted(&game, 0));

    assert_eq!(
        game.respond(PlayerId(0), PromptResponse::Die(DieId(1)))
            .unwrap(),
        ResolutionStatus::Complete
    );
    assert!(is_exhausted(&game, 0));
    assert!(is_exhausted(&game, 1));
    assert!(!is_exhausted(&game, 2));
    let card = game.state().card(ritualist).unwrap();
    assert_eq!(card.tokens.count(&TokenKind::Status), 1);
}

/// Test that cancelling the dice prompt unwinds the ability.
#[test]
fn test_cancel_dice_selection() {
    let mut game = game();
    let ritualist = game
        .create_card(PlayerId(0), "ritualist", Location::PlayArea)
        .unwrap();

    game.use_card(PlayerId(0), ritualist).unwrap();
    game.respond(PlayerId(0), PromptResponse::Die(DieId(2)))
        .unwrap();
    assert_eq!(
        game.respond(PlayerId(0), PromptResponse::Cancel).unwrap(),
        ResolutionStatus::Complete
    );
    assert!(game.pipeline().is_idle());
    assert!(!is_exhausted(&game, 2));
    let card = game.state().card(ritualist).unwrap();
    assert!(card.tokens.is_empty());
}

/// Test that a die outside the pool is refused without losing the prompt.
#[test]
fn test_unknown_die_rejected() {
    let mut game = game();
    let ritualist = game
        .create_card(PlayerId(0), "ritualist", Location::PlayArea)
        .unwrap();

    game.use_card(PlayerId(0), ritualist).unwrap();
    assert_eq!(
        game.respond(PlayerId(0), PromptResponse::Die(DieId(9)))
            .unwrap(),
        ResolutionStatus::WaitingForPlayer(PlayerId(0))
    );
    assert!(chosen(&game).is_empty());
}

/// Test that an ability whose dice cannot be paid is not offered.
#[test]
fn test_unpayable_cost_not_offered() {
    let mut game = game();
    game.state_mut()
        .set_dice_pool(PlayerId(0), &[Magic::Charm])
        .unwrap();
    let ritualist = game
        .create_card(PlayerId(0), "ritualist", Location::PlayArea)
        .unwrap();

    assert!(game.legal_actions(PlayerId(0), ritualist).unwrap().is_empty());
    assert!(matches!(
        game.use_card(PlayerId(0), ritualist),
        Err(RulesError::IllegalAction(_))
    ));
}

// ===== Playing cards =====

/// Test that playing an ally spends a main action and auto-pays a class
/// die.
#[test]
fn test_play_ally_pays_costs() {
    let mut game = game();
    let archer = game
        .create_card(PlayerId(0), "fire-archer", Location::Hand)
        .unwrap();

    let titles: Vec<String> = game
        .legal_actions(PlayerId(0), archer)
        .unwrap()
        .into_iter()
        .map(|(title, _)| title)
        .collect();
    assert_eq!(titles, vec!["Play this ally", "Discard this card"]);

    assert_eq!(
        game.use_card(PlayerId(0), archer).unwrap(),
        ResolutionStatus::WaitingForPlayer(PlayerId(0))
    );
    match game.prompt() {
        Some(Prompt::ActionMenu { title, choices, .. }) => {
            assert_eq!(title, "Play Fire Archer:");
            assert_eq!(choices.last().map(String::as_str), Some("Cancel"));
        }
        other => panic!("expected an action menu, got {other:?}"),
    }

    assert_eq!(
        game.respond(PlayerId(0), PromptResponse::Choice(0)).unwrap(),
        ResolutionStatus::Complete
    );
    assert_eq!(
        game.state().card(archer).unwrap().location,
        Location::PlayArea
    );
    let player = game.state().player(PlayerId(0)).unwrap();
    assert_eq!(player.main_actions, 0);
    assert!(is_exhausted(&game, 1));
    assert!(!is_exhausted(&game, 0));
}

/// Test that a spent main action blocks the next play.
#[test]
fn test_main_action_spent() {
    let mut game = game();
    game.state_mut().player_mut(PlayerId(0)).unwrap().main_actions = 0;
    let archer = game
        .create_card(PlayerId(0), "fire-archer", Location::Hand)
        .unwrap();

    let titles: Vec<String> = game
        .legal_actions(PlayerId(0), archer)
        .unwrap()
        .into_iter()
        .map(|(title, _)| title)
        .collect();
    assert_eq!(titles, vec!["Discard this card"]);
}
