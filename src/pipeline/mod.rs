//! Resolution pipeline.
//!
//! The pipeline is an explicit stack of resumable steps. A step is a trigger
//! window, an ability resolution or an action menu. Each call to
//! [`Pipeline::run`] pops the top step, advances it by one stage and pushes
//! back whatever is left to do, until the stack is empty or a player has to
//! decide something. A suspended pipeline holds a [`Prompt`]; the answer is
//! fed in with [`Pipeline::respond`] and the waiting step picks it up on the
//! next run.
//!
//! ## Windows
//!
//! A window collects simultaneous events and resolves them in stages:
//! forced interrupts and interrupts are offered, the events execute, forced
//! reactions and reactions are offered, and finally the game state is
//! checked. Events spawned during execution form the window's next
//! generation and go through the interrupt stage again. Spawned events
//! marked as opening a reaction window resolve in a nested window first.
//!
//! ## Abilities
//!
//! An ability resolution walks `Start → Costs → Pay → Targets → Execute →
//! Finish`. Dice costs suspend for interactive die selection; target choice
//! suspends when there is more than one legal target.

mod handlers;
mod prompt;
mod state_check;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::abilities::{AbilityContext, AbilityPlan, AbilityRef, ContextId};
use crate::actions::GameAction;
use crate::cards::CardSnapshot;
use crate::core::{EntityId, GameState, PlayerId};
use crate::costs::{Cost, DiceSelection, SelectionOutcome};
use crate::dice::Die;
use crate::error::{Result, RulesError};
use crate::events::{
    AbilityChoice, EventArena, EventHandler, EventId, EventName, GameEvent, TriggerWindow,
    WindowId, WindowStage,
};
use crate::triggers::AbilityKind;

pub use prompt::{Prompt, PromptResponse};

/// Outcome of running the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionStatus {
    /// Nothing left to resolve.
    Complete,
    /// Suspended until the player answers the pending prompt.
    WaitingForPlayer(PlayerId),
}

/// Stage of one ability resolution.
#[derive(Clone, Debug)]
enum AbilityStage {
    Start,
    Costs { index: usize },
    SelectDice { index: usize, selection: DiceSelection },
    Pay,
    Targets,
    Execute,
    Finish,
}

#[derive(Clone, Debug)]
enum Step {
    Window(WindowId),
    Ability { ctx: ContextId, stage: AbilityStage },
    Menu {
        player: PlayerId,
        title: String,
        options: Vec<(String, AbilityRef)>,
        card: EntityId,
    },
}

/// What a step handler asks the runner to do next.
enum Flow {
    Done,
    Again(Step),
    /// Resume the first step after the second has finished.
    Call(Step, Step),
    Wait(Step, Prompt),
}

/// The resolution stack, its windows, events and ability contexts.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    steps: Vec<Step>,
    pub events: EventArena,
    windows: FxHashMap<WindowId, TriggerWindow>,
    contexts: FxHashMap<ContextId, AbilityContext>,
    prompt: Option<Prompt>,
    answer: Option<(Prompt, PromptResponse)>,
    next_window: u32,
    next_context: u32,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The prompt the pipeline is suspended on, if any.
    #[must_use]
    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    /// Whether nothing is queued or pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.steps.is_empty() && self.prompt.is_none()
    }

    #[must_use]
    pub fn context(&self, id: ContextId) -> Option<&AbilityContext> {
        self.contexts.get(&id)
    }

    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<&TriggerWindow> {
        self.windows.get(&id)
    }

    /// Drop every queued step and pending prompt.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.windows.clear();
        self.contexts.clear();
        self.prompt = None;
        self.answer = None;
    }

    // ===== Entry points =====

    /// The plan of costs, target and actions an ability resolves with.
    pub fn plan_for(
        state: &GameState,
        ability: AbilityRef,
        source: Option<EntityId>,
    ) -> Result<AbilityPlan> {
        let plan = match ability {
            AbilityRef::Triggered(id) => AbilityPlan::for_triggered(state.triggers.ability(id)?),
            AbilityRef::Action { card, index } => {
                let action = state.card(card)?.abilities.actions.get(index).ok_or_else(|| {
                    RulesError::InvariantViolation(format!("{card} has no action {index}"))
                })?;
                AbilityPlan::for_action(action, card)
            }
            AbilityRef::Gained { card, index } => {
                let gained = state.gained_actions(card);
                let action = gained.get(index).ok_or_else(|| {
                    RulesError::InvariantViolation(format!("{card} has no gained action {index}"))
                })?;
                AbilityPlan::for_action(action, card)
            }
            AbilityRef::Base(base) => {
                let card = source.ok_or_else(|| {
                    RulesError::InvariantViolation(format!("{} needs a source card", base.title()))
                })?;
                let definition = state.card(card)?.definition.clone();
                AbilityPlan::for_base(base, &definition, card)
            }
            AbilityRef::Framework => AbilityPlan::default(),
        };
        Ok(plan)
    }

    fn new_context(
        &mut self,
        player: PlayerId,
        source: Option<EntityId>,
        ability: AbilityRef,
        event: Option<EventId>,
        plan: AbilityPlan,
    ) -> ContextId {
        let id = ContextId(self.next_context);
        self.next_context += 1;
        let mut ctx = AbilityContext::new(id, player, source, ability).with_plan(plan);
        ctx.event = event;
        self.contexts.insert(id, ctx);
        id
    }

    /// Queue an ability resolution for `player`.
    pub fn start_ability(
        &mut self,
        state: &GameState,
        player: PlayerId,
        source: Option<EntityId>,
        ability: AbilityRef,
        event: Option<EventId>,
    ) -> Result<ContextId> {
        let plan = Self::plan_for(state, ability, source)?;
        let ctx = self.new_context(player, source, ability, event, plan);
        self.steps.push(Step::Ability {
            ctx,
            stage: AbilityStage::Start,
        });
        Ok(ctx)
    }

    /// Queue a rules-driven action with no costs or target choice.
    pub fn resolve_action(
        &mut self,
        player: PlayerId,
        source: Option<EntityId>,
        action: GameAction,
    ) -> ContextId {
        let plan = AbilityPlan {
            title: action.setup().name.to_string(),
            actions: vec![action],
            ..AbilityPlan::default()
        };
        let ctx = self.new_context(player, source, AbilityRef::Framework, None, plan);
        self.steps.push(Step::Ability {
            ctx,
            stage: AbilityStage::Start,
        });
        ctx
    }

    /// Queue an action menu for a card. A "Cancel" choice is appended.
    pub fn open_menu(
        &mut self,
        player: PlayerId,
        card: EntityId,
        title: impl Into<String>,
        options: Vec<(String, AbilityRef)>,
    ) {
        self.steps.push(Step::Menu {
            player,
            title: title.into(),
            options,
            card,
        });
    }

    /// Queue a window over events not yet stored in the arena.
    pub fn open_event_window(&mut self, events: Vec<GameEvent>) -> WindowId {
        let ids = events.into_iter().map(|e| self.events.push(e)).collect();
        let id = self.open_window(ids, None);
        self.steps.push(Step::Window(id));
        id
    }

    fn open_window(&mut self, events: Vec<EventId>, parent: Option<WindowId>) -> WindowId {
        let id = WindowId(self.next_window);
        self.next_window += 1;
        for &event in &events {
            if let Ok(e) = self.events.get_mut(event) {
                e.window = Some(id);
            }
        }
        trace!(window = %id, events = events.len(), "window opened");
        self.windows.insert(id, TriggerWindow::new(id, events, parent));
        id
    }

    /// Answer the pending prompt.
    pub fn respond(&mut self, player: PlayerId, response: PromptResponse) -> Result<()> {
        let prompt = self.prompt.as_ref().ok_or(RulesError::NoPendingPrompt)?;
        if prompt.player() != player {
            return Err(RulesError::NotPromptedPlayer {
                expected: prompt.player(),
                actual: player,
            });
        }
        prompt.validate(&response)?;
        if let Some(prompt) = self.prompt.take() {
            self.answer = Some((prompt, response));
        }
        Ok(())
    }

    fn take_answer(&mut self) -> Option<(Prompt, PromptResponse)> {
        self.answer.take()
    }

    // ===== Runner =====

    /// Advance resolution until it completes or needs a decision.
    pub fn run(&mut self, state: &mut GameState) -> Result<ResolutionStatus> {
        loop {
            if let Some(prompt) = &self.prompt {
                return Ok(ResolutionStatus::WaitingForPlayer(prompt.player()));
            }
            if state.winner.is_some() {
                self.clear();
                return Ok(ResolutionStatus::Complete);
            }
            let Some(step) = self.steps.pop() else {
                return Ok(ResolutionStatus::Complete);
            };
            let flow = match step {
                Step::Window(id) => self.step_window(state, id)?,
                Step::Ability { ctx, stage } => self.step_ability(state, ctx, stage)?,
                Step::Menu {
                    player,
                    title,
                    options,
                    card,
                } => self.step_menu(state, player, title, options, card)?,
            };
            match flow {
                Flow::Done => {}
                Flow::Again(step) => self.steps.push(step),
                Flow::Call(back, child) => {
                    self.steps.push(back);
                    self.steps.push(child);
                }
                Flow::Wait(step, prompt) => {
                    debug!(player = %prompt.player(), title = prompt.title(), "waiting for player");
                    self.steps.push(step);
                    self.prompt = Some(prompt);
                }
            }
        }
    }

    // ===== Windows =====

    fn window_ref(&self, id: WindowId) -> Result<&TriggerWindow> {
        self.windows
            .get(&id)
            .ok_or_else(|| RulesError::InvariantViolation(format!("{id} is not open")))
    }

    fn window_mut(&mut self, id: WindowId) -> Result<&mut TriggerWindow> {
        self.windows
            .get_mut(&id)
            .ok_or_else(|| RulesError::InvariantViolation(format!("{id} is not open")))
    }

    fn step_window(&mut self, state: &mut GameState, id: WindowId) -> Result<Flow> {
        match self.window_ref(id)?.stage {
            WindowStage::Collecting => {
                self.window_mut(id)?.enter(WindowStage::InterruptStage);
                debug!(window = %id, "interrupt stage");
                Ok(Flow::Again(Step::Window(id)))
            }
            WindowStage::InterruptStage => self.offer_abilities(state, id, true),
            WindowStage::EventStage => self.event_stage(state, id),
            WindowStage::ReactionStage => self.offer_abilities(state, id, false),
            WindowStage::GameStateCheck => self.game_state_check(state, id),
            WindowStage::Closed => {
                self.windows.remove(&id);
                trace!(window = %id, "window closed");
                Ok(Flow::Done)
            }
        }
    }

    /// Registered abilities of `kind` that fire for `player` on `events`.
    fn collect(
        &self,
        state: &GameState,
        window: &TriggerWindow,
        events: &[EventId],
        kind: AbilityKind,
        player: PlayerId,
    ) -> Result<Vec<AbilityChoice>> {
        let mut choices = Vec::new();
        for &event_id in events {
            let event = self.events.get(event_id)?;
            if event.cancelled {
                continue;
            }
            for &ability_id in state.triggers.listeners(event.name, kind) {
                if window.is_resolved(ability_id, event_id) {
                    continue;
                }
                let ability = state.triggers.ability(ability_id)?;
                if !ability.is_triggered_by_event(state, event, player) {
                    continue;
                }
                let trial = AbilityContext::new(
                    ContextId(u32::MAX),
                    player,
                    Some(ability.card),
                    AbilityRef::Triggered(ability_id),
                )
                .with_event(event_id);
                if let Err(requirement) = ability.meets_requirements(state, &trial) {
                    trace!(ability = %ability_id, %requirement, "trigger not eligible");
                    continue;
                }
                choices.push(AbilityChoice {
                    ability: ability_id,
                    event: event_id,
                    player,
                    forced: kind.is_forced(),
                    title: ability.title.clone(),
                    source: ability.card,
                });
            }
        }
        Ok(choices)
    }

    fn offer_abilities(&mut self, state: &GameState, id: WindowId, interrupts: bool) -> Result<Flow> {
        let (forced_kind, optional_kind, next_stage, noun) = if interrupts {
            (
                AbilityKind::ForcedInterrupt,
                AbilityKind::Interrupt,
                WindowStage::EventStage,
                "interrupt",
            )
        } else {
            (
                AbilityKind::ForcedReaction,
                AbilityKind::Reaction,
                WindowStage::GameStateCheck,
                "reaction",
            )
        };

        if let Some((Prompt::ChooseTrigger { player, options, .. }, response)) = self.take_answer() {
            match response {
                PromptResponse::Choice(index) => {
                    if let Some(choice) = options.get(index) {
                        return self.resolve_choice(state, id, choice.clone());
                    }
                }
                PromptResponse::Pass => self.window_mut(id)?.pass(player),
                _ => {}
            }
        }

        let window = self.window_ref(id)?;
        let events = if interrupts {
            window.pending()
        } else {
            window.executed().to_vec()
        };

        for player in state.turn_order() {
            let forced = self.collect(state, window, &events, forced_kind, player)?;
            if forced.is_empty() {
                continue;
            }
            // Only a lone forced ability skips the prompt. Two triggers of the
            // same ability still need an order.
            if let [only] = forced.as_slice() {
                let choice = only.clone();
                return self.resolve_choice(state, id, choice);
            }
            return Ok(Flow::Wait(
                Step::Window(id),
                Prompt::ChooseTrigger {
                    player,
                    title: format!("Choose which forced {noun} to resolve first"),
                    options: forced,
                    can_pass: false,
                },
            ));
        }

        for player in state.turn_order() {
            if window.has_passed(player) {
                continue;
            }
            let optional = self.collect(state, window, &events, optional_kind, player)?;
            if optional.is_empty() {
                continue;
            }
            if optional.len() == 1 && state.triggers.ability(optional[0].ability)?.auto_resolve {
                let choice = optional[0].clone();
                return self.resolve_choice(state, id, choice);
            }
            return Ok(Flow::Wait(
                Step::Window(id),
                Prompt::ChooseTrigger {
                    player,
                    title: format!("Any {noun}s?"),
                    options: optional,
                    can_pass: true,
                },
            ));
        }

        self.window_mut(id)?.enter(next_stage);
        debug!(window = %id, stage = ?next_stage, "window stage");
        Ok(Flow::Again(Step::Window(id)))
    }

    fn resolve_choice(&mut self, state: &GameState, id: WindowId, choice: AbilityChoice) -> Result<Flow> {
        self.window_mut(id)?.mark_resolved(choice.ability, choice.event);
        let ability = AbilityRef::Triggered(choice.ability);
        let plan = Self::plan_for(state, ability, Some(choice.source))?;
        debug!(ability = %choice.ability, title = %choice.title, player = %choice.player, "resolving triggered ability");
        let ctx = self.new_context(choice.player, Some(choice.source), ability, Some(choice.event), plan);
        Ok(Flow::Call(
            Step::Window(id),
            Step::Ability {
                ctx,
                stage: AbilityStage::Start,
            },
        ))
    }

    fn event_stage(&mut self, state: &mut GameState, id: WindowId) -> Result<Flow> {
        let Some(event_id) = self.window_mut(id)?.pop_pending() else {
            let window = self.window_mut(id)?;
            let stage = if window.begin_next_generation() {
                WindowStage::InterruptStage
            } else {
                WindowStage::ReactionStage
            };
            window.enter(stage);
            debug!(window = %id, ?stage, "window stage");
            return Ok(Flow::Again(Step::Window(id)));
        };

        let event = self.events.get(event_id)?;
        if !event.is_pending() {
            return Ok(Flow::Again(Step::Window(id)));
        }
        if !handlers::can_execute(state, event) {
            self.cancel_event(state, event_id)?;
            return Ok(Flow::Again(Step::Window(id)));
        }

        handlers::execute(state, &mut self.events, event_id)?;
        self.window_mut(id)?.record_executed(event_id);
        self.record_moves(state, id, event_id)?;

        let mut nested = Vec::new();
        for child in self.events.take_spawned() {
            if self.events.get(child)?.open_reaction_window {
                nested.push(child);
            } else {
                self.window_mut(id)?.push_next_generation(child);
            }
        }
        if nested.is_empty() {
            return Ok(Flow::Again(Step::Window(id)));
        }
        let child = self.open_window(nested, Some(id));
        Ok(Flow::Call(Step::Window(id), Step::Window(child)))
    }

    fn cancel_event(&mut self, state: &mut GameState, id: EventId) -> Result<()> {
        let event = self.events.get_mut(id)?;
        event.cancelled = true;
        debug!(event = %id, name = %event.name, "event cancelled");
        if event.handler == EventHandler::Destroy {
            if let Some(card) = event.card() {
                if let Ok(card) = state.card_mut(card) {
                    card.moribund = false;
                }
            }
        }
        Ok(())
    }

    /// Turn the location changes an event caused into executed
    /// `onCardMoved` markers for the reaction stage.
    fn record_moves(&mut self, state: &mut GameState, window: WindowId, cause: EventId) -> Result<()> {
        let context = self.events.get(cause)?.context;
        for change in state.take_moves() {
            let mut marker = GameEvent::new(EventName::OnCardMoved, context)
                .with_card(change.card)
                .without_game_state_check();
            marker.params.from = Some(change.from);
            marker.params.to = Some(change.to);
            marker.parent = Some(cause);
            marker.window = Some(window);
            marker.executed = true;
            let id = self.events.push(marker);
            self.window_mut(window)?.push_executed_marker(id);
        }
        Ok(())
    }

    fn game_state_check(&mut self, state: &mut GameState, id: WindowId) -> Result<Flow> {
        let window = self.window_ref(id)?;
        let parent = window.parent;
        let skip = window.events.iter().all(|&e| {
            self.events
                .get(e)
                .map_or(true, |event| event.no_game_state_check)
        });
        self.window_mut(id)?.enter(WindowStage::Closed);
        if skip {
            return Ok(Flow::Again(Step::Window(id)));
        }

        let framework = AbilityContext::new(
            ContextId(u32::MAX),
            state.active_player,
            None,
            AbilityRef::Framework,
        );
        let created = state_check::check(state, &mut self.events, &framework)?;
        if created.is_empty() {
            return Ok(Flow::Again(Step::Window(id)));
        }
        debug!(window = %id, events = created.len(), "game state check created events");
        self.windows.remove(&id);
        let fresh = self.open_window(created, parent);
        Ok(Flow::Again(Step::Window(fresh)))
    }

    // ===== Abilities =====

    fn ctx(&self, id: ContextId) -> Result<&AbilityContext> {
        self.contexts
            .get(&id)
            .ok_or_else(|| RulesError::InvariantViolation(format!("{id} does not exist")))
    }

    fn ctx_mut(&mut self, id: ContextId) -> Result<&mut AbilityContext> {
        self.contexts
            .get_mut(&id)
            .ok_or_else(|| RulesError::InvariantViolation(format!("{id} does not exist")))
    }

    fn abort(&mut self, id: ContextId) -> Flow {
        self.contexts.remove(&id);
        Flow::Done
    }

    fn step_ability(&mut self, state: &mut GameState, id: ContextId, stage: AbilityStage) -> Result<Flow> {
        let next = |stage| Step::Ability { ctx: id, stage };
        match stage {
            AbilityStage::Start => {
                let ctx = self.ctx(id)?;
                let check = match ctx.ability {
                    AbilityRef::Triggered(ability) => state
                        .triggers
                        .ability(ability)?
                        .meets_requirements(state, ctx),
                    AbilityRef::Framework => Ok(()),
                    _ => ctx.plan.check(state, ctx),
                };
                if let Err(requirement) = check {
                    debug!(context = %id, title = %ctx.plan.title, %requirement, "ability cannot resolve");
                    return Ok(self.abort(id));
                }
                let snapshot = ctx
                    .source
                    .and_then(|s| CardSnapshot::capture(state, s).ok())
                    .map(Box::new);
                self.ctx_mut(id)?.snapshot = snapshot;
                Ok(Flow::Again(next(AbilityStage::Costs { index: 0 })))
            }
            AbilityStage::Costs { index } => {
                let ctx = self.ctx(id)?;
                let Some(cost) = ctx.plan.costs.get(index).cloned() else {
                    return Ok(Flow::Again(next(AbilityStage::Pay)));
                };
                match cost {
                    Cost::Dice(requirement) => {
                        let pool = self.dice_pool(state, id)?;
                        let (selection, outcome) = DiceSelection::begin(&pool, requirement, true);
                        self.dice_outcome(state, id, index, selection, outcome)
                    }
                    other => {
                        other.commit(&mut self.ctx_mut(id)?.costs);
                        Ok(Flow::Again(next(AbilityStage::Costs { index: index + 1 })))
                    }
                }
            }
            AbilityStage::SelectDice {
                index,
                mut selection,
            } => {
                let pool = self.dice_pool(state, id)?;
                let outcome = match self.take_answer() {
                    Some((_, PromptResponse::Die(die))) => selection.select(&pool, die),
                    Some((_, PromptResponse::Done)) => selection.done(&pool),
                    Some((_, PromptResponse::Cancel)) => selection.cancel(),
                    _ => SelectionOutcome::Continue,
                };
                self.dice_outcome(state, id, index, selection, outcome)
            }
            AbilityStage::Pay => {
                let ctx = self.ctx(id)?.clone();
                if let Some((key, limit)) = &ctx.plan.limit {
                    state.usage.record(key.clone(), limit);
                }
                state.usage.record_title(ctx.player, &ctx.plan.title);

                let mut ids = Vec::new();
                for action in ctx.plan.costs.iter().filter_map(|c| c.pay_action(&ctx.costs)) {
                    ids.extend(action.event_array(state, &mut self.events, &ctx)?);
                }
                if ids.is_empty() {
                    return Ok(Flow::Again(next(AbilityStage::Targets)));
                }
                let window = self.open_window(ids, None);
                Ok(Flow::Call(next(AbilityStage::Targets), Step::Window(window)))
            }
            AbilityStage::Targets => self.choose_target(state, id),
            AbilityStage::Execute => {
                let ctx = self.ctx(id)?.clone();
                if ctx.cancelled {
                    return Ok(self.abort(id));
                }
                let name = state.player(ctx.player)?.name.clone();
                let mut ids = Vec::new();
                for action in &ctx.plan.actions {
                    let targets = action.legal_targets(state, &ctx, &self.events);
                    let created = action.event_array(state, &mut self.events, &ctx)?;
                    if !created.is_empty() {
                        let message = action.effect_message(state, &targets);
                        state.log_message(format!("{name} uses {} to {message}", ctx.plan.title));
                    }
                    ids.extend(created);
                }
                if ids.is_empty() {
                    return Ok(Flow::Again(next(AbilityStage::Finish)));
                }
                let window = self.open_window(ids, None);
                Ok(Flow::Call(next(AbilityStage::Finish), Step::Window(window)))
            }
            AbilityStage::Finish => {
                trace!(context = %id, "ability resolved");
                self.contexts.remove(&id);
                Ok(Flow::Done)
            }
        }
    }

    /// The player's dice with those already committed to this resolution
    /// marked unavailable.
    fn dice_pool(&self, state: &GameState, id: ContextId) -> Result<Vec<Die>> {
        let ctx = self.ctx(id)?;
        let mut pool = state.player(ctx.player)?.dice.clone();
        for die in &mut pool {
            if ctx.costs.dice.contains(&die.id) {
                die.exhausted = true;
            }
        }
        Ok(pool)
    }

    fn dice_outcome(
        &mut self,
        state: &GameState,
        id: ContextId,
        index: usize,
        selection: DiceSelection,
        outcome: SelectionOutcome,
    ) -> Result<Flow> {
        match outcome {
            SelectionOutcome::Committed(dice) => {
                self.ctx_mut(id)?.costs.dice.extend(dice);
                Ok(Flow::Again(Step::Ability {
                    ctx: id,
                    stage: AbilityStage::Costs { index: index + 1 },
                }))
            }
            SelectionOutcome::Cancelled => {
                debug!(context = %id, "dice selection cancelled");
                self.ctx_mut(id)?.cancelled = true;
                Ok(self.abort(id))
            }
            SelectionOutcome::Continue | SelectionOutcome::Rejected(_) => {
                if let SelectionOutcome::Rejected(reason) = &outcome {
                    warn!(context = %id, %reason, "die selection rejected");
                }
                let pool = self.dice_pool(state, id)?;
                let ctx = self.ctx(id)?;
                let prompt = Prompt::SelectDice {
                    player: ctx.player,
                    title: format!("Select dice to pay for {}", ctx.plan.title),
                    selectable: selection.selectable(&pool),
                    chosen: selection.chosen().to_vec(),
                    can_finish: selection.can_finish(&pool),
                    can_cancel: selection.can_cancel(),
                };
                Ok(Flow::Wait(
                    Step::Ability {
                        ctx: id,
                        stage: AbilityStage::SelectDice { index, selection },
                    },
                    prompt,
                ))
            }
        }
    }

    fn choose_target(&mut self, state: &GameState, id: ContextId) -> Result<Flow> {
        let execute = Step::Ability {
            ctx: id,
            stage: AbilityStage::Execute,
        };
        let ctx = self.ctx(id)?;
        let Some(spec) = ctx.plan.target.clone() else {
            return Ok(Flow::Again(execute));
        };

        match self.take_answer() {
            Some((_, PromptResponse::Card(card))) => {
                self.ctx_mut(id)?.targets.push(card);
                return Ok(Flow::Again(execute));
            }
            Some((_, PromptResponse::Cancel)) => return Ok(Flow::Again(execute)),
            _ => {}
        }

        let ctx = self.ctx(id)?;
        let legal = spec.legal_targets(state, ctx, &ctx.plan.actions);
        if legal.is_empty() {
            if spec.optional {
                return Ok(Flow::Again(execute));
            }
            debug!(context = %id, title = %ctx.plan.title, "no legal target");
            return Ok(self.abort(id));
        }
        if legal.len() == 1 && !spec.optional {
            self.ctx_mut(id)?.targets.push(legal[0]);
            return Ok(Flow::Again(execute));
        }
        let prompt = Prompt::SelectCard {
            player: ctx.player,
            title: format!("{}: choose a target", ctx.plan.title),
            options: legal,
            can_cancel: spec.optional,
        };
        Ok(Flow::Wait(
            Step::Ability {
                ctx: id,
                stage: AbilityStage::Targets,
            },
            prompt,
        ))
    }

    // ===== Menus =====

    fn step_menu(
        &mut self,
        state: &GameState,
        player: PlayerId,
        title: String,
        options: Vec<(String, AbilityRef)>,
        card: EntityId,
    ) -> Result<Flow> {
        match self.take_answer() {
            Some((_, PromptResponse::Choice(index))) => {
                let Some((label, ability)) = options.get(index).cloned() else {
                    debug!(%player, %card, "menu cancelled");
                    return Ok(Flow::Done);
                };
                debug!(%player, %card, choice = %label, "menu choice");
                let plan = Self::plan_for(state, ability, Some(card))?;
                let ctx = self.new_context(player, Some(card), ability, None, plan);
                Ok(Flow::Again(Step::Ability {
                    ctx,
                    stage: AbilityStage::Start,
                }))
            }
            _ => {
                let mut choices: Vec<String> = options.iter().map(|(label, _)| label.clone()).collect();
                choices.push("Cancel".to_string());
                let prompt = Prompt::ActionMenu {
                    player,
                    title: title.clone(),
                    choices,
                };
                Ok(Flow::Wait(
                    Step::Menu {
                        player,
                        title,
                        options,
                        card,
                    },
                    prompt,
                ))
            }
        }
    }
}
