//! Player prompts.
//!
//! When resolution needs a decision the pipeline suspends with a
//! [`Prompt`] and resumes when the prompted player answers with a matching
//! [`PromptResponse`]. Responses are checked against the prompt before the
//! pipeline sees them; a malformed response is refused and the prompt stays
//! open.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::dice::DieId;
use crate::error::{Result, RulesError};
use crate::events::AbilityChoice;

/// A pending decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prompt {
    /// Pick the next triggered ability to resolve. Forced choices cannot be
    /// passed.
    ChooseTrigger {
        player: PlayerId,
        title: String,
        options: Vec<AbilityChoice>,
        can_pass: bool,
    },
    /// Pick dice to pay a dice cost, one at a time.
    SelectDice {
        player: PlayerId,
        title: String,
        selectable: Vec<DieId>,
        chosen: Vec<DieId>,
        can_finish: bool,
        can_cancel: bool,
    },
    /// Pick a target card.
    SelectCard {
        player: PlayerId,
        title: String,
        options: Vec<EntityId>,
        can_cancel: bool,
    },
    /// Pick one of a card's actions. The last choice is always "Cancel".
    ActionMenu {
        player: PlayerId,
        title: String,
        choices: Vec<String>,
    },
}

/// A player's answer to a prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptResponse {
    /// Index into the prompt's options or menu choices.
    Choice(usize),
    /// Decline the remaining optional abilities for this stage.
    Pass,
    Die(DieId),
    Done,
    Cancel,
    Card(EntityId),
}

impl Prompt {
    /// The player the prompt waits on.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match self {
            Prompt::ChooseTrigger { player, .. }
            | Prompt::SelectDice { player, .. }
            | Prompt::SelectCard { player, .. }
            | Prompt::ActionMenu { player, .. } => *player,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Prompt::ChooseTrigger { title, .. }
            | Prompt::SelectDice { title, .. }
            | Prompt::SelectCard { title, .. }
            | Prompt::ActionMenu { title, .. } => title,
        }
    }

    /// Check that a response fits this prompt.
    pub fn validate(&self, response: &PromptResponse) -> Result<()> {
        let ok = match (self, response) {
            (Prompt::ChooseTrigger { options, .. }, PromptResponse::Choice(i)) => *i < options.len(),
            (Prompt::ChooseTrigger { can_pass, .. }, PromptResponse::Pass) => *can_pass,
            (Prompt::SelectDice { .. }, PromptResponse::Die(_) | PromptResponse::Done) => true,
            (Prompt::SelectDice { can_cancel, .. }, PromptResponse::Cancel) => *can_cancel,
            (Prompt::SelectCard { options, .. }, PromptResponse::Card(card)) => options.contains(card),
            (Prompt::SelectCard { can_cancel, .. }, PromptResponse::Cancel) => *can_cancel,
            (Prompt::ActionMenu { choices, .. }, PromptResponse::Choice(i)) => *i < choices.len(),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(RulesError::InvalidResponse(format!(
                "{response:?} does not answer '{}'",
                self.title()
            )))
        }
    }
}
