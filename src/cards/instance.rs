//! Card instances: per-game card state.
//!
//! A `Card` is one physical copy of a [`CardDefinition`] in a game. It carries
//! the mutable state the rules track directly: owner and controller,
//! location, facing, tokens, the moribund flag, attached upgrades and the
//! card's declared abilities.
//!
//! Derived values (current attack, life, traits, ...) are not stored here;
//! they are recomputed from the effect engine on every read (see
//! `effects::values`).
//!
//! A card's location only changes through `GameState::move_card`.

use std::sync::Arc;

use crate::abilities::CardAbilities;
use crate::core::{EntityId, PlayerId};
use crate::zones::Location;

use super::definition::{CardDefinition, CardType};
use super::tokens::{TokenKind, Tokens};

/// A card instance in a game.
#[derive(Clone, Debug)]
pub struct Card {
    pub id: EntityId,
    pub definition: Arc<CardDefinition>,
    pub owner: PlayerId,
    /// Current controller. Recomputed by the game-state check from
    /// `TakeControl` effects.
    pub controller: PlayerId,
    /// Read-only outside `GameState::move_card`.
    pub location: Location,
    pub facedown: bool,
    pub tokens: Tokens,
    /// Destruction is pending; set when lethal damage schedules a destroy so
    /// a second lethal source in the same window does not schedule another.
    pub moribund: bool,
    pub used_guard_this_round: bool,
    /// Upgrades attached to this card.
    pub upgrades: Vec<EntityId>,
    /// The card this upgrade is attached to.
    pub parent: Option<EntityId>,
    pub abilities: CardAbilities,
}

impl Card {
    /// Create a card owned and controlled by `owner`.
    pub fn new(
        id: EntityId,
        definition: Arc<CardDefinition>,
        owner: PlayerId,
        location: Location,
    ) -> Self {
        Self {
            id,
            definition,
            owner,
            controller: owner,
            location,
            facedown: location.is_hidden(),
            tokens: Tokens::new(),
            moribund: false,
            used_guard_this_round: false,
            upgrades: Vec::new(),
            parent: None,
            abilities: CardAbilities::default(),
        }
    }

    #[must_use]
    pub fn stub(&self) -> &str {
        &self.definition.stub
    }

    #[must_use]
    pub fn printed_type(&self) -> CardType {
        self.definition.card_type
    }

    #[must_use]
    pub fn damage(&self) -> u32 {
        self.tokens.count(&TokenKind::Damage)
    }

    #[must_use]
    pub fn exhaustion(&self) -> u32 {
        self.tokens.count(&TokenKind::Exhaustion)
    }

    #[must_use]
    pub fn status(&self) -> u32 {
        self.tokens.count(&TokenKind::Status)
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhaustion() > 0
    }

    #[must_use]
    pub fn has_ward(&self) -> bool {
        self.tokens.has(&TokenKind::Ward)
    }

    pub fn add_token(&mut self, kind: TokenKind, amount: u32) {
        self.tokens.add(kind, amount);
    }

    /// Remove up to `amount` tokens; returns how many were removed.
    pub fn remove_token(&mut self, kind: &TokenKind, amount: u32) -> u32 {
        self.tokens.remove(kind, amount)
    }

    /// Give the card a ward token. A card holds at most one.
    pub fn ward(&mut self) {
        if !self.has_ward() {
            self.tokens.add(TokenKind::Ward, 1);
        }
    }

    pub fn unward(&mut self) {
        self.tokens.clear_kind(&TokenKind::Ward);
    }

    pub fn exhaust(&mut self) {
        self.tokens.add(TokenKind::Exhaustion, 1);
    }

    /// Remove one exhaustion token.
    pub fn ready(&mut self) {
        self.tokens.remove(&TokenKind::Exhaustion, 1);
    }

    /// Remove every exhaustion token.
    pub fn un_exhaust(&mut self) {
        self.tokens.clear_kind(&TokenKind::Exhaustion);
    }

    /// Reset the state that does not survive leaving play.
    pub fn on_leaves_play(&mut self) {
        self.moribund = false;
        self.tokens.clear();
        self.controller = self.owner;
        self.used_guard_this_round = false;
        self.upgrades.clear();
        self.parent = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Card {
        let def = CardDefinition::new("hammer-knight", "Hammer Knight", CardType::Ally)
            .with_attack(3)
            .with_life(2);
        Card::new(EntityId(4), Arc::new(def), PlayerId(0), Location::PlayArea)
    }

    #[test]
    fn test_new_card_defaults() {
        let card = card();
        assert_eq!(card.controller, PlayerId(0));
        assert!(!card.facedown);
        assert_eq!(card.damage(), 0);
        assert!(!card.moribund);

        let in_hand = Card::new(
            EntityId(5),
            card.definition.clone(),
            PlayerId(1),
            Location::Hand,
        );
        assert!(in_hand.facedown);
    }

    #[test]
    fn test_ward_at_most_one() {
        let mut card = card();
        card.ward();
        card.ward();
        assert_eq!(card.tokens.count(&TokenKind::Ward), 1);
        card.unward();
        assert!(!card.has_ward());
    }

    #[test]
    fn test_ready_and_un_exhaust() {
        let mut card = card();
        card.exhaust();
        card.exhaust();
        card.ready();
        assert_eq!(card.exhaustion(), 1);
        assert!(card.is_exhausted());
        card.exhaust();
        card.un_exhaust();
        assert!(!card.is_exhausted());
    }

    #[test]
    fn test_leaves_play_resets() {
        let mut card = card();
        card.add_token(TokenKind::Damage, 2);
        card.moribund = true;
        card.controller = PlayerId(1);
        card.used_guard_this_round = true;
        card.upgrades.push(EntityId(9));

        card.on_leaves_play();

        assert!(card.tokens.is_empty());
        assert!(!card.moribund);
        assert_eq!(card.controller, PlayerId(0));
        assert!(!card.used_guard_this_round);
        assert!(card.upgrades.is_empty());
    }
}
