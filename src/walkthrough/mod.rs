//! Walkthrough sequencing: an ordered series of steps gated by triggers

pub mod hooks;
pub mod step;

pub use hooks::Hook;
pub use step::{Step, StepCompletion, COMPLETE_MARKER};

/// An ordered sequence of steps with navigation rules.
///
/// The walkthrough is purely reactive: the host calls [`Walkthrough::tick`]
/// once per frame and may request navigation at any time. Observers
/// registered with [`WalkthroughBuilder::on_changed`] are notified
/// synchronously whenever the walkthrough's state may have changed.
#[derive(Debug)]
pub struct Walkthrough {
    name: String,
    steps: Vec<Step>,
    /// Index of the active step. Moves one past the end once the final step
    /// auto-progresses.
    cursor: usize,
    changed: Hook,
    revision: u64,
}

/// Collects steps and observers, then starts the walkthrough on `build`
#[derive(Debug)]
pub struct WalkthroughBuilder {
    name: String,
    steps: Vec<Step>,
    changed: Hook,
}

impl WalkthroughBuilder {
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn on_changed(mut self, callback: impl FnMut() + 'static) -> Self {
        self.changed.subscribe(callback);
        self
    }

    /// Initialize every step and start the first one
    pub fn build(self) -> Walkthrough {
        let mut walkthrough = Walkthrough {
            name: self.name,
            steps: self.steps,
            cursor: 0,
            changed: self.changed,
            revision: 0,
        };
        walkthrough.awake();
        walkthrough
    }
}

impl Walkthrough {
    pub fn builder(name: impl Into<String>) -> WalkthroughBuilder {
        WalkthroughBuilder {
            name: name.into(),
            steps: Vec::new(),
            changed: Hook::new(),
        }
    }

    /// Build and start a walkthrough with no observers
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self::builder(name).steps(steps).build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step_mut(&mut self, index: usize) -> Option<&mut Step> {
        self.steps.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The active step index. Equals [`len`](Self::len) once the final step
    /// has auto-progressed.
    pub fn current_step(&self) -> usize {
        self.cursor
    }

    /// The current step clamped to a valid index, for labels and controls
    pub fn display_step(&self) -> usize {
        self.cursor.min(self.steps.len().saturating_sub(1))
    }

    /// True once the final step has completed and auto-progressed
    pub fn is_finished(&self) -> bool {
        !self.steps.is_empty() && self.cursor >= self.steps.len()
    }

    /// Number of change notifications raised so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register an observer after construction
    pub fn subscribe(&mut self, callback: impl FnMut() + 'static) {
        self.changed.subscribe(callback);
    }

    /// Poll the active step's triggers
    pub fn tick(&mut self) {
        let completion = match self.steps.get_mut(self.cursor) {
            Some(step) => step.tick(),
            None => return,
        };
        self.dispatch(self.cursor, completion);
    }

    /// Shift to another step.
    ///
    /// Invalid indices and the current index are ignored. Once finished, the
    /// current index is `len()` and any valid index restarts that step.
    /// Skipping forward is refused if any step between here and the target
    /// blocks until complete.
    pub fn skip_to_step(&mut self, index: usize, auto_progress_if_complete: bool) {
        if index >= self.steps.len() || index == self.cursor {
            return;
        }

        if index > self.cursor {
            let blocking = self.steps[self.cursor..index]
                .iter()
                .find(|step| !step.can_skip())
                .map(|step| step.name().to_string());

            if let Some(blocking) = blocking {
                tracing::warn!(step = %blocking, "Can't skip past incomplete step");
                self.notify();
                return;
            }
        }

        if let Some(active) = self.steps.get_mut(self.cursor) {
            active.cancel_step();
        }

        self.cursor = index;
        tracing::debug!(walkthrough = %self.name, step = index, "Skipped to step");
        let completion = self.steps[index].start_step(auto_progress_if_complete);
        self.dispatch(index, completion);
        self.notify();
    }

    /// Move forward one step, auto-progressing past it if already complete
    pub fn next_step(&mut self) {
        self.skip_to_step(self.cursor + 1, true);
    }

    /// Move back one step. From the finished state this restarts the last step.
    pub fn previous_step(&mut self) {
        if let Some(index) = self.cursor.checked_sub(1) {
            self.skip_to_step(index, false);
        }
    }

    /// Whether a "next" control should be offered
    pub fn next_available(&self) -> bool {
        let current = self.display_step();
        current + 1 < self.steps.len() && self.steps[current].can_progress()
    }

    /// Whether a "previous" control should be offered
    pub fn previous_available(&self) -> bool {
        self.display_step() > 0
    }

    /// Progress text such as `Step 2 / 5`
    pub fn progress_label(&self) -> String {
        format!(
            "Step {} / {}",
            self.display_step(),
            self.steps.len().saturating_sub(1)
        )
    }

    fn awake(&mut self) {
        for step in &mut self.steps {
            step.initialize();
        }

        if let Some(first) = self.steps.get_mut(self.cursor) {
            let completion = first.start_step(true);
            self.dispatch(self.cursor, completion);
        }

        tracing::info!(walkthrough = %self.name, steps = self.steps.len(), "Walkthrough started");
        self.notify();
    }

    /// Act on a completion from step `index`, then let that step hide its
    /// visuals. The next step is already up by the time they go.
    fn dispatch(&mut self, index: usize, completion: Option<StepCompletion>) {
        if let Some(done) = completion {
            self.on_step_complete(done.auto_progress);
            self.steps[index].finish(done);
        }
    }

    fn on_step_complete(&mut self, auto_progress: bool) {
        // Labels and controls may still need refreshing
        if !auto_progress {
            self.notify();
            return;
        }

        self.cursor += 1;
        let Some(next) = self.steps.get_mut(self.cursor) else {
            tracing::info!(walkthrough = %self.name, "Walkthrough finished");
            return;
        };

        let completion = next.start_step(true);
        self.dispatch(self.cursor, completion);
        self.notify();
    }

    fn notify(&mut self) {
        self.revision += 1;
        self.changed.invoke();
    }
}
