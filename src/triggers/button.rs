use super::{missing_reference, Trigger, TriggerKind};
use crate::scene::ButtonHandle;

/// Waits for a UI button to be pressed once since the step started
#[derive(Debug)]
pub struct ButtonPressTrigger {
    button: Option<ButtonHandle>,
    /// Click count observed at the last reset
    baseline: u64,
}

impl ButtonPressTrigger {
    pub fn new(button: Option<ButtonHandle>) -> Self {
        Self {
            button,
            baseline: 0,
        }
    }
}

impl Trigger for ButtonPressTrigger {
    fn reset_trigger(&mut self) -> bool {
        let Some(button) = &self.button else {
            missing_reference(self.kind(), "button");
            return false;
        };

        self.baseline = button.clicks();
        true
    }

    fn check(&self) -> bool {
        self.button
            .as_ref()
            .is_some_and(|b| b.clicks() > self.baseline)
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::ButtonPress
    }
}
