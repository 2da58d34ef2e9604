//! Per-card summaries for the presentation layer.
//!
//! A summary is what a client may know about a card from one player's seat.
//! Face-down cards the viewer does not own reveal only their owner,
//! controller, location, tokens and armor.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameState, PlayerId};
use crate::error::Result;
use crate::zones::Location;

use super::definition::CardType;
use super::tokens::Tokens;

/// A manual-mode menu entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub command: String,
    pub text: String,
}

impl MenuItem {
    fn new(command: &str, text: &str) -> Self {
        Self {
            command: command.to_string(),
            text: text.to_string(),
        }
    }
}

/// Stats whose current value differs from the printed one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatFlags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recover: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spellfocus: Option<usize>,
}

/// Summary of a card the viewer cannot see.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HiddenCard {
    pub id: EntityId,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub location: Location,
    pub facedown: bool,
    pub tokens: Tokens,
    pub armor: i32,
}

/// Summary of a visible card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisibleCard {
    pub id: EntityId,
    pub stub: String,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub owner: PlayerId,
    pub controller: PlayerId,
    /// Controlled by someone other than the owner.
    pub controlled: bool,
    pub location: Location,
    pub facedown: bool,
    pub exhausted: bool,
    pub tokens: Tokens,
    pub attack: i32,
    pub life: i32,
    pub recover: i32,
    pub armor: i32,
    pub flags: StatFlags,
    pub guarded: bool,
    /// The viewer may use the card right now.
    pub can_play: bool,
    /// Titles of the viewer's legal actions on the card.
    pub actions: Vec<String>,
    pub upgrades: Vec<CardSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<Vec<MenuItem>>,
}

/// What a viewer knows about one card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardSummary {
    Hidden(HiddenCard),
    Visible(Box<VisibleCard>),
}

impl CardSummary {
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            CardSummary::Hidden(c) => c.id,
            CardSummary::Visible(c) => c.id,
        }
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        matches!(self, CardSummary::Hidden(_))
    }

    /// Build the summary of `id` for `viewer`.
    ///
    /// `legal_actions` yields the titles of the viewer's legal actions on a
    /// card; it is only consulted for visible cards.
    pub fn build(
        state: &GameState,
        viewer: PlayerId,
        id: EntityId,
        legal_actions: &dyn Fn(EntityId) -> Vec<String>,
    ) -> Result<Self> {
        let card = state.card(id)?;
        if card.facedown && card.owner != viewer {
            return Ok(CardSummary::Hidden(HiddenCard {
                id,
                owner: card.owner,
                controller: card.controller,
                location: card.location,
                facedown: true,
                tokens: card.tokens.clone(),
                armor: state.armor(id),
            }));
        }

        let actions = legal_actions(id);
        let upgrades = card
            .upgrades
            .iter()
            .map(|&u| Self::build(state, viewer, u, legal_actions))
            .collect::<Result<Vec<_>>>()?;

        Ok(CardSummary::Visible(Box::new(VisibleCard {
            id,
            stub: card.stub().to_string(),
            name: state.card_name(id),
            card_type: state.card_type(id).unwrap_or(card.printed_type()),
            owner: card.owner,
            controller: card.controller,
            controlled: card.owner != card.controller,
            location: card.location,
            facedown: card.facedown,
            exhausted: card.is_exhausted(),
            tokens: card.tokens.clone(),
            attack: state.attack(id),
            life: state.life(id),
            recover: state.recover(id),
            armor: state.armor(id),
            flags: stat_flags(state, id),
            guarded: card.used_guard_this_round,
            can_play: viewer == state.active_player
                && viewer == card.controller
                && !actions.is_empty(),
            actions,
            upgrades,
            menu: manual_menu(state, id),
        })))
    }
}

fn stat_flags(state: &GameState, id: EntityId) -> StatFlags {
    let mut flags = StatFlags::default();
    let Some(card) = state.try_card(id) else {
        return flags;
    };
    if !card.location.is_in_play() {
        return flags;
    }
    let stats = &card.definition.stats;
    let attack = state.attack(id);
    if attack != stats.attack.printed() {
        flags.attack = Some(attack);
    }
    let life = state.life(id);
    if life != stats.life.printed() {
        flags.life = Some(life);
    }
    let recover = state.recover(id);
    if recover != stats.recover.printed() {
        flags.recover = Some(recover);
    }
    let focus = state.focus(id);
    if focus > 0 {
        flags.spellfocus = Some(focus);
    }
    flags
}

/// Token menu offered in manual mode for cards in play.
fn manual_menu(state: &GameState, id: EntityId) -> Option<Vec<MenuItem>> {
    let card = state.try_card(id)?;
    if !state.config.manual_mode || !card.location.is_in_play() {
        return None;
    }
    if card.facedown {
        return Some(vec![MenuItem::new("reveal", "Reveal")]);
    }
    Some(vec![
        MenuItem::new("click", "Select Card"),
        MenuItem::new("addDamage", "Add 1 damage"),
        MenuItem::new("remDamage", "Remove 1 damage"),
        MenuItem::new("addExhaustion", "Add 1 exhaustion"),
        MenuItem::new("remExhaustion", "Remove 1 exhaustion"),
        MenuItem::new("addStatus", "Add 1 status"),
        MenuItem::new("remStatus", "Remove 1 status"),
    ])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cards::{Card, CardDefinition, TokenKind};
    use crate::core::GameConfig;

    fn no_actions(_: EntityId) -> Vec<String> {
        Vec::new()
    }

    fn state(manual: bool) -> (GameState, EntityId, EntityId) {
        let mut state = GameState::new(GameConfig::new(2).with_manual_mode(manual));
        let def = Arc::new(
            CardDefinition::new("anchornaut", "Anchornaut", CardType::Ally)
                .with_attack(1)
                .with_life(1),
        );
        let in_play = state.alloc_entity();
        state.insert_card(Card::new(in_play, def.clone(), PlayerId(0), Location::PlayArea));
        let in_hand = state.alloc_entity();
        state.insert_card(Card::new(in_hand, def, PlayerId(0), Location::Hand));
        (state, in_play, in_hand)
    }

    #[test]
    fn test_facedown_hidden_from_opponent() {
        let (mut state, _, in_hand) = state(false);
        state.card_mut(in_hand).unwrap().add_token(TokenKind::Status, 1);

        let theirs = CardSummary::build(&state, PlayerId(1), in_hand, &no_actions).unwrap();
        match theirs {
            CardSummary::Hidden(card) => {
                assert_eq!(card.location, Location::Hand);
                assert_eq!(card.tokens.count(&TokenKind::Status), 1);
            }
            CardSummary::Visible(_) => panic!("opponent saw a face-down card"),
        }

        let mine = CardSummary::build(&state, PlayerId(0), in_hand, &no_actions).unwrap();
        assert!(!mine.is_hidden());
    }

    #[test]
    fn test_visible_summary_fields() {
        let (state, in_play, _) = state(false);
        let actions = |_: EntityId| vec!["Attack".to_string()];
        let summary = CardSummary::build(&state, PlayerId(0), in_play, &actions).unwrap();
        let CardSummary::Visible(card) = summary else {
            panic!("expected visible summary");
        };
        assert_eq!(card.name, "Anchornaut");
        assert_eq!(card.attack, 1);
        assert!(card.can_play);
        assert!(card.menu.is_none());
        assert_eq!(card.flags, StatFlags::default());

        let json = serde_json::to_value(&*card).unwrap();
        assert_eq!(json["type"], "Ally");
        assert_eq!(json["location"], "play area");
    }

    #[test]
    fn test_manual_menu() {
        let (state, in_play, in_hand) = state(true);
        let menu = manual_menu(&state, in_play).unwrap();
        assert_eq!(menu[0].command, "click");
        assert!(menu.iter().any(|m| m.command == "addDamage"));
        assert!(manual_menu(&state, in_hand).is_none());
    }
}
