//! Error types for the rules core.
//!
//! Player-facing rejections (`IllegalAction`, prompt contract violations) are
//! recoverable: the caller reports them and the game continues. Internal
//! faults (`InvariantViolation`) flag the game as corrupted, after which every
//! further request fails with `Corrupted`.
//!
//! Cancelling a prompt is not an error. It is an ordinary outcome of cost and
//! choice resolution.

use thiserror::Error;

use crate::core::{EntityId, PlayerId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("Illegal action: {0}")]
    IllegalAction(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed card {card}: {reason}")]
    MalformedCard { card: String, reason: String },

    #[error("Unknown event name: {0}")]
    UnknownEvent(String),

    #[error("Card not found: {0}")]
    CardNotFound(EntityId),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("No prompt is pending")]
    NoPendingPrompt,

    #[error("Prompt is waiting on {expected}, not {actual}")]
    NotPromptedPlayer { expected: PlayerId, actual: PlayerId },

    #[error("Invalid prompt response: {0}")]
    InvalidResponse(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Game is corrupted: {0}")]
    Corrupted(String),
}

impl RulesError {
    /// Build a `MalformedCard` error for the given card stub.
    pub fn malformed(card: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedCard {
            card: card.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error should flag the game as corrupted.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation(_) | Self::Corrupted(_))
    }
}

pub type Result<T> = std::result::Result<T, RulesError>;
