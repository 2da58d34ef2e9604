//! Token counters on cards.
//!
//! Counts never go negative: removing more tokens than are present floors at
//! zero, and a kind whose count reaches zero is dropped from the map so that
//! "absent" and "zero" are the same state.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Kind of token.
///
/// Serializes as its plain name (`"damage"`, `"status"`, ...), with custom
/// kinds using their own name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TokenKind {
    Damage,
    Exhaustion,
    Status,
    Ward,
    Custom(String),
}

impl TokenKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            TokenKind::Damage => "damage",
            TokenKind::Exhaustion => "exhaustion",
            TokenKind::Status => "status",
            TokenKind::Ward => "ward",
            TokenKind::Custom(name) => name,
        }
    }
}

impl From<String> for TokenKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "damage" => TokenKind::Damage,
            "exhaustion" => TokenKind::Exhaustion,
            "status" => TokenKind::Status,
            "ward" => TokenKind::Ward,
            _ => TokenKind::Custom(name),
        }
    }
}

impl From<&str> for TokenKind {
    fn from(name: &str) -> Self {
        TokenKind::from(name.to_string())
    }
}

impl From<TokenKind> for String {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token counts for one card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tokens {
    counts: FxHashMap<TokenKind, u32>,
}

impl Tokens {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count; zero when absent.
    #[must_use]
    pub fn count(&self, kind: &TokenKind) -> u32 {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn has(&self, kind: &TokenKind) -> bool {
        self.counts.contains_key(kind)
    }

    /// Add tokens. Adding zero changes nothing.
    pub fn add(&mut self, kind: TokenKind, amount: u32) {
        if amount == 0 {
            return;
        }
        *self.counts.entry(kind).or_insert(0) += amount;
    }

    /// Remove tokens, flooring at zero. Returns how many were removed.
    pub fn remove(&mut self, kind: &TokenKind, amount: u32) -> u32 {
        let Some(current) = self.counts.get_mut(kind) else {
            return 0;
        };
        let removed = amount.min(*current);
        *current -= removed;
        if *current == 0 {
            self.counts.remove(kind);
        }
        removed
    }

    /// Remove every token of a kind. Returns how many were removed.
    pub fn clear_kind(&mut self, kind: &TokenKind) -> u32 {
        self.counts.remove(kind).unwrap_or(0)
    }

    /// Remove every token.
    pub fn clear(&mut self) {
        self.counts.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Kinds present, sorted by name for stable output.
    #[must_use]
    pub fn kinds(&self) -> Vec<&TokenKind> {
        let mut kinds: Vec<_> = self.counts.keys().collect();
        kinds.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        kinds
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TokenKind, u32)> {
        self.counts.iter().map(|(k, v)| (k, *v))
    }
}
