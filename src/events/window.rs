//! Trigger windows.
//!
//! A window is the unit of simultaneous resolution. It collects a batch of
//! events and walks them through
//! `Collecting → InterruptStage → EventStage → ReactionStage → GameStateCheck → Closed`.
//!
//! Events spawned while a window's handlers run join the window's next
//! generation: once the current generation has executed, the window returns
//! to the interrupt stage for the new events before moving on. Sub-events
//! flagged `open_reaction_window` instead run in a nested window of their
//! own, which closes before the parent window continues.
//!
//! The window records which (ability, event) pairs have already been
//! resolved or declined, so re-collection after each resolution never offers
//! the same trigger twice.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::triggers::AbilityId;

use super::event::EventId;

/// Unique identifier for a window within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u32);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Window({})", self.0)
    }
}

/// Resolution stage of a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowStage {
    Collecting,
    InterruptStage,
    EventStage,
    ReactionStage,
    GameStateCheck,
    Closed,
}

/// One eligible triggered ability for one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilityChoice {
    pub ability: AbilityId,
    pub event: EventId,
    /// The player the ability resolves for.
    pub player: PlayerId,
    pub forced: bool,
    pub title: String,
    pub source: EntityId,
}

/// A trigger window.
#[derive(Clone, Debug)]
pub struct TriggerWindow {
    pub id: WindowId,
    pub stage: WindowStage,
    pub parent: Option<WindowId>,
    /// Every event that entered the window, in arrival order.
    pub events: Vec<EventId>,
    pending: VecDeque<EventId>,
    next_generation: Vec<EventId>,
    executed: Vec<EventId>,
    resolved: FxHashSet<(AbilityId, EventId)>,
    passed: FxHashSet<PlayerId>,
}

impl TriggerWindow {
    pub fn new(id: WindowId, events: Vec<EventId>, parent: Option<WindowId>) -> Self {
        Self {
            id,
            stage: WindowStage::Collecting,
            parent,
            pending: events.iter().copied().collect(),
            events,
            next_generation: Vec::new(),
            executed: Vec::new(),
            resolved: FxHashSet::default(),
            passed: FxHashSet::default(),
        }
    }

    /// Move to a new stage. Passes only last for one stage.
    pub fn enter(&mut self, stage: WindowStage) {
        self.stage = stage;
        self.passed.clear();
    }

    /// Events of the current generation not yet executed.
    #[must_use]
    pub fn pending(&self) -> Vec<EventId> {
        self.pending.iter().copied().collect()
    }

    pub fn pop_pending(&mut self) -> Option<EventId> {
        self.pending.pop_front()
    }

    /// Queue a spawned event for the next generation.
    pub fn push_next_generation(&mut self, event: EventId) {
        self.events.push(event);
        self.next_generation.push(event);
    }

    /// Record an event whose change is already applied (location-change
    /// markers); it takes part in the reaction stage only.
    pub fn push_executed_marker(&mut self, event: EventId) {
        self.events.push(event);
        self.executed.push(event);
    }

    /// Promote the next generation to pending. Returns `false` if there was
    /// nothing to promote.
    pub fn begin_next_generation(&mut self) -> bool {
        if self.next_generation.is_empty() {
            return false;
        }
        self.pending.extend(self.next_generation.drain(..));
        true
    }

    pub fn record_executed(&mut self, event: EventId) {
        self.executed.push(event);
    }

    /// Events executed in this window, in execution order.
    #[must_use]
    pub fn executed(&self) -> &[EventId] {
        &self.executed
    }

    pub fn mark_resolved(&mut self, ability: AbilityId, event: EventId) {
        self.resolved.insert((ability, event));
    }

    #[must_use]
    pub fn is_resolved(&self, ability: AbilityId, event: EventId) -> bool {
        self.resolved.contains(&(ability, event))
    }

    /// The player declines every remaining optional ability in this stage.
    pub fn pass(&mut self, player: PlayerId) {
        self.passed.insert(player);
    }

    #[must_use]
    pub fn has_passed(&self, player: PlayerId) -> bool {
        self.passed.contains(&player)
    }
}
