//! Effect engine integration tests.
//!
//! These tests verify derived values against the effects in force: scoping
//! of persistent effects, layering of set and modify effects, and the clamp
//! and token invariants.

use std::sync::Arc;

use proptest::prelude::*;
use smallvec::smallvec;

use ashes_rules::abilities::AbilityBuilder;
use ashes_rules::cards::{CardDefinition, CardRegistry, CardType, TokenKind, Tokens};
use ashes_rules::core::{EntityId, GameConfig, PlayerId};
use ashes_rules::effects::{Effect, EffectMatch, Relation, Stat};
use ashes_rules::game::Game;
use ashes_rules::zones::{Location, LocationScope};

fn catalog() -> Arc<CardRegistry> {
    let mut registry = CardRegistry::new();
    registry
        .register(
            CardDefinition::new("war-drummer", "War Drummer", CardType::Ally)
                .with_attack(2)
                .with_life(3)
                .with_recover(1)
                .with_setup(|ability| {
                    ability.persistent_effect(Effect::modify_stat(Stat::Attack, 1))
                }),
        )
        .unwrap();
    registry
        .register(
            CardDefinition::new("banner-bearer", "Banner Bearer", CardType::Ally)
                .with_attack(1)
                .with_life(2)
                .with_setup(|ability| {
                    ability.persistent_effect_in(
                        Effect::modify_stat(Stat::Life, 1)
                            .with_target(EffectMatch::Units(Relation::Controller)),
                        LocationScope::In(smallvec![Location::PlayArea, Location::Discard]),
                    )
                }),
        )
        .unwrap();
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

fn game() -> Game {
    Game::new(GameConfig::new(2), catalog()).unwrap()
}

// ===== Scoping =====

/// Test that a play-area effect applies only while its card is in play.
#[test]
fn test_attack_bonus_scoped_to_play_area() {
    let mut game = game();
    let drummer = game
        .create_card(PlayerId(0), "war-drummer", Location::PlayArea)
        .unwrap();
    assert_eq!(game.state().attack(drummer), 3);

    game.state_mut()
        .move_card(drummer, Location::Discard, None, None)
        .unwrap();
    assert_eq!(game.state().attack(drummer), 2);
    assert!(game.state().effects.is_empty());

    game.state_mut()
        .move_card(drummer, Location::PlayArea, None, None)
        .unwrap();
    assert_eq!(game.state().attack(drummer), 3);
}

/// Test that a card in hand does not register its effects.
#[test]
fn test_effects_of_cards_in_hand_are_dormant() {
    let mut game = game();
    let drummer = game
        .create_card(PlayerId(0), "war-drummer", Location::Hand)
        .unwrap();
    assert!(game.state().effects.is_empty());
    assert_eq!(game.state().attack(drummer), 2);
}

/// Test an effect scoped to several locations and aimed at other units.
#[test]
fn test_multi_location_scope() {
    let mut game = game();
    let bearer = game
        .create_card(PlayerId(0), "banner-bearer", Location::PlayArea)
        .unwrap();
    let knight = game
        .create_card(PlayerId(0), "hammer-knight", Location::PlayArea)
        .unwrap();
    let enemy = game
        .create_card(PlayerId(1), "hammer-knight", Location::PlayArea)
        .unwrap();
    assert_eq!(game.state().life(knight), 4);
    assert_eq!(game.state().life(enemy), 3);

    // Still live from the discard pile, where the bearer itself is no unit
    // in play.
    game.state_mut()
        .move_card(bearer, Location::Discard, None, None)
        .unwrap();
    assert_eq!(game.state().life(knight), 4);
    assert_eq!(game.state().life(bearer), 2);

    game.state_mut()
        .move_card(bearer, Location::Hand, None, None)
        .unwrap();
    assert_eq!(game.state().life(knight), 3);
}

/// Test that moving a card to where it already is changes nothing.
#[test]
fn test_move_to_same_location_is_idempotent() {
    let mut game = game();
    let drummer = game
        .create_card(PlayerId(0), "war-drummer", Location::PlayArea)
        .unwrap();
    game.state_mut().take_moves();
    let effects_before = game.state().effects.len();

    let moved = game
        .state_mut()
        .move_card(drummer, Location::PlayArea, None, None)
        .unwrap();
    assert!(!moved);
    assert!(game.state_mut().take_moves().is_empty());
    assert_eq!(game.state().effects.len(), effects_before);
    assert_eq!(game.state().attack(drummer), 3);
}

// ===== Layering =====

/// Test that the most recent set effect wins and modifies stack on top.
#[test]
fn test_set_then_modify() {
    let mut game = game();
    let knight = game
        .create_card(PlayerId(0), "hammer-knight", Location::PlayArea)
        .unwrap();
    let state = game.state_mut();
    state.effects.add(
        Some(knight),
        Effect::set_stat(Stat::Attack, 5).until_end_of_turn(),
    );
    state.effects.add(Some(knight), Effect::set_stat(Stat::Attack, 1));
    state.effects.add(Some(knight), Effect::modify_stat(Stat::Attack, 2));
    assert_eq!(game.state().attack(knight), 3);
}

/// Test that type changes are visible through derived getters.
#[test]
fn test_change_type_makes_non_unit() {
    let mut game = game();
    let knight = game
        .create_card(PlayerId(0), "hammer-knight", Location::PlayArea)
        .unwrap();
    assert!(game.state().is_unit(knight));
    game.state_mut().effects.add(
        None,
        Effect::change_type(CardType::ReadySpell).with_target(EffectMatch::Card(knight)),
    );
    assert_eq!(game.state().card_type(knight), Some(CardType::ReadySpell));
    assert!(!game.state().is_unit(knight));
}

/// Test that a card's declared abilities build without a game.
#[test]
fn test_builder_collects_persistent_effects() {
    let registry = catalog();
    let def = registry.require("banner-bearer").unwrap();
    let builder = AbilityBuilder::build(EntityId(0), &def).unwrap();
    assert_eq!(builder.persistent().len(), 1);
    assert!(builder.persistent()[0].scope.includes(Location::Discard));
}

// ===== Invariants =====

proptest! {
    /// Derived stats never go negative, whatever modifiers are in force.
    #[test]
    fn prop_stats_clamp_at_zero(mods in prop::collection::vec(-6i32..6, 0..8)) {
        let mut game = game();
        let knight = game
            .create_card(PlayerId(0), "hammer-knight", Location::PlayArea)
            .unwrap();
        for amount in &mods {
            let state = game.state_mut();
            state.effects.add(Some(knight), Effect::modify_stat(Stat::Attack, *amount));
            state.effects.add(Some(knight), Effect::modify_stat(Stat::Life, *amount));
            state.effects.add(Some(knight), Effect::modify_stat(Stat::Recover, *amount));
        }
        let total: i32 = mods.iter().sum();
        prop_assert_eq!(game.state().attack(knight), (3 + total).max(0));
        prop_assert!(game.state().life(knight) >= 0);
        prop_assert!(game.state().recover(knight) >= 0);
    }

    /// Token counts floor at zero and an emptied kind is absent.
    #[test]
    fn prop_tokens_never_negative(ops in prop::collection::vec((any::<bool>(), 0u32..5), 0..20)) {
        let mut tokens = Tokens::new();
        let mut expected: u32 = 0;
        for (add, amount) in ops {
            if add {
                tokens.add(TokenKind::Damage, amount);
                expected += amount;
            } else {
                let removed = tokens.remove(&TokenKind::Damage, amount);
                prop_assert_eq!(removed, amount.min(expected));
                expected -= removed;
            }
            prop_assert_eq!(tokens.count(&TokenKind::Damage), expected);
            prop_assert_eq!(tokens.has(&TokenKind::Damage), expected > 0);
        }
    }
}
