use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::{Trigger, TriggerKind};
use crate::clock::Clock;

pub const DEFAULT_DELAY_SECS: f32 = 3.0;

/// Waits for a fixed period after the step starts
pub struct DelayTrigger {
    clock: Arc<dyn Clock>,
    delay: Duration,
    started_at: Duration,
}

impl DelayTrigger {
    pub fn new(clock: Arc<dyn Clock>, delay_secs: f32) -> Self {
        let started_at = clock.now();
        Self {
            clock,
            delay: Duration::try_from_secs_f32(delay_secs.max(0.0)).unwrap_or(Duration::MAX),
            started_at,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Trigger for DelayTrigger {
    fn reset_trigger(&mut self) -> bool {
        self.started_at = self.clock.now();
        !self.check()
    }

    fn check(&self) -> bool {
        self.clock.now().saturating_sub(self.started_at) > self.delay
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::Delay
    }
}

impl fmt::Debug for DelayTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayTrigger")
            .field("delay", &self.delay)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
