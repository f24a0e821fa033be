//! One unit of a walkthrough, gated by its triggers

use std::fmt;

use super::hooks::Hook;
use crate::scene::EntityHandle;
use crate::triggers::{Trigger, TriggerKind};

/// Appended to a step's description once it has been completed
pub const COMPLETE_MARKER: &str = " (Complete)";

/// Emitted when a started step finishes.
///
/// This stands in for the completion callback: whoever started the step
/// receives it from [`Step::start_step`] or [`Step::tick`], acts on it
/// (usually by starting the next step), then hands it back to
/// [`Step::finish`] so the step can hide its visuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCompletion {
    /// Whether the owner should advance to the next step
    pub auto_progress: bool,
}

pub struct Step {
    name: String,
    description: String,
    visuals: Vec<EntityHandle>,
    on_step_begin: Hook,
    on_step_complete: Hook,
    block_until_complete: bool,
    auto_progress_on_complete: bool,
    triggers: Vec<Box<dyn Trigger>>,

    /// Indices into `triggers` still waiting to pass
    remaining: Vec<usize>,
    started: bool,
    completed: bool,
    auto_progress_enabled: bool,
    /// Edge latch so begin/complete hooks fire once per transition
    visuals_active: bool,
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            visuals: Vec::new(),
            on_step_begin: Hook::new(),
            on_step_complete: Hook::new(),
            block_until_complete: false,
            auto_progress_on_complete: true,
            triggers: Vec::new(),
            remaining: Vec::new(),
            started: false,
            completed: false,
            auto_progress_enabled: true,
            visuals_active: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_visual(mut self, visual: EntityHandle) -> Self {
        self.visuals.push(visual);
        self
    }

    pub fn with_trigger(mut self, trigger: impl Trigger + 'static) -> Self {
        self.triggers.push(Box::new(trigger));
        self
    }

    pub fn with_boxed_trigger(mut self, trigger: Box<dyn Trigger>) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// If set, the step cannot be skipped past until completed at least once
    pub fn block_until_complete(mut self, block: bool) -> Self {
        self.block_until_complete = block;
        self
    }

    /// If set, the walkthrough advances as soon as this step completes
    pub fn auto_progress_on_complete(mut self, auto: bool) -> Self {
        self.auto_progress_on_complete = auto;
        self
    }

    /// Callbacks fired when the step's visuals turn on
    pub fn on_step_begin(&mut self) -> &mut Hook {
        &mut self.on_step_begin
    }

    /// Callbacks fired when the step's visuals turn off
    pub fn on_step_complete(&mut self) -> &mut Hook {
        &mut self.on_step_complete
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The purpose of this step, marked complete once done if it has triggers
    pub fn description(&self) -> String {
        if self.completed && !self.triggers.is_empty() {
            format!("{}{}", self.description, COMPLETE_MARKER)
        } else {
            self.description.clone()
        }
    }

    /// True if the step's triggers have all passed at least once
    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// True if the step does not block or has no triggers left to pass
    pub fn can_progress(&self) -> bool {
        !self.block_until_complete || self.remaining.is_empty()
    }

    /// True if the step does not block or has been completed at least once
    pub fn can_skip(&self) -> bool {
        !self.block_until_complete || self.completed
    }

    pub fn blocks_until_complete(&self) -> bool {
        self.block_until_complete
    }

    /// The step's own auto-progress setting
    pub fn auto_progresses(&self) -> bool {
        self.auto_progress_on_complete
    }

    pub fn trigger_kinds(&self) -> Vec<TriggerKind> {
        self.triggers.iter().map(|t| t.kind()).collect()
    }

    pub fn pending_trigger_count(&self) -> usize {
        self.remaining.len()
    }

    /// Kinds of the triggers the step is still waiting on
    pub fn pending_trigger_kinds(&self) -> Vec<TriggerKind> {
        self.remaining
            .iter()
            .map(|&index| self.triggers[index].kind())
            .collect()
    }

    pub fn visuals(&self) -> &[EntityHandle] {
        &self.visuals
    }

    /// Hide visuals until the step is first started
    pub fn initialize(&mut self) {
        if !self.started {
            self.set_visuals_state(false);
        }
    }

    /// Make this step the active focus.
    ///
    /// `allow_auto_progress` is combined with the step's own setting, but only
    /// for the case where the step completes immediately. Once triggers are
    /// pending the step's own setting applies.
    pub fn start_step(&mut self, allow_auto_progress: bool) -> Option<StepCompletion> {
        if self.started {
            return None;
        }

        self.auto_progress_enabled = allow_auto_progress && self.auto_progress_on_complete;
        self.set_visuals_state(true);
        self.started = true;

        if self.triggers.is_empty() && self.auto_progress_enabled {
            tracing::debug!(step = %self.name, "Step automatically complete; no triggers to wait on");
            return self.complete_step();
        }

        self.remaining.clear();
        for (index, trigger) in self.triggers.iter_mut().enumerate() {
            if trigger.reset_trigger() {
                self.remaining.push(index);
            }
        }

        if self.remaining.is_empty() {
            tracing::debug!(step = %self.name, "Step already completed");
            return self.complete_step();
        }

        self.auto_progress_enabled = self.auto_progress_on_complete;
        tracing::debug!(
            step = %self.name,
            pending = self.remaining.len(),
            "Step started"
        );
        None
    }

    /// Poll outstanding triggers, completing the step once none remain
    pub fn tick(&mut self) -> Option<StepCompletion> {
        if !self.started || self.remaining.is_empty() {
            return None;
        }

        let triggers = &self.triggers;
        self.remaining.retain(|&index| !triggers[index].check());

        if self.remaining.is_empty() {
            return self.complete_step();
        }
        None
    }

    /// Hide visuals after the owner has handled `completion`.
    ///
    /// Visuals stay up when the walkthrough is not moving on, or when the
    /// step was started again in the meantime.
    pub fn finish(&mut self, completion: StepCompletion) {
        if completion.auto_progress && !self.started {
            self.set_visuals_state(false);
        }
    }

    /// Stop being the focus without completing
    pub fn cancel_step(&mut self) {
        self.set_visuals_state(false);

        if !self.started {
            return;
        }

        self.started = false;
        self.remaining.clear();
    }

    fn complete_step(&mut self) -> Option<StepCompletion> {
        if !self.started {
            return None;
        }

        self.completed = true;
        self.started = false;
        self.remaining.clear();
        tracing::info!(step = %self.name, auto_progress = self.auto_progress_enabled, "Step complete");

        Some(StepCompletion {
            auto_progress: self.auto_progress_enabled,
        })
    }

    fn set_visuals_state(&mut self, enabled: bool) {
        for visual in &self.visuals {
            visual.set_active(enabled);
        }

        if self.visuals_active == enabled {
            return;
        }
        self.visuals_active = enabled;

        if enabled {
            self.on_step_begin.invoke();
        } else {
            self.on_step_complete.invoke();
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("started", &self.started)
            .field("completed", &self.completed)
            .field("remaining", &self.remaining.len())
            .field("triggers", &self.triggers)
            .finish_non_exhaustive()
    }
}
