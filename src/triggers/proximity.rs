use super::{missing_reference, Trigger, TriggerKind};
use crate::scene::TransformHandle;

pub const DEFAULT_DISTANCE: f32 = 1.0;

/// Waits for two objects to come within a distance of each other
#[derive(Debug)]
pub struct ProximityTrigger {
    source: Option<TransformHandle>,
    target: Option<TransformHandle>,
    distance: f32,
}

impl ProximityTrigger {
    pub fn new(
        source: Option<TransformHandle>,
        target: Option<TransformHandle>,
        distance: f32,
    ) -> Self {
        Self {
            source,
            target,
            distance,
        }
    }
}

impl Trigger for ProximityTrigger {
    fn reset_trigger(&mut self) -> bool {
        if self.source.is_none() {
            missing_reference(self.kind(), "source");
            return false;
        }
        if self.target.is_none() {
            missing_reference(self.kind(), "target");
            return false;
        }

        !self.check()
    }

    fn check(&self) -> bool {
        let (Some(source), Some(target)) = (&self.source, &self.target) else {
            return false;
        };

        (target.position() - source.position()).length_squared() < self.distance * self.distance
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::Proximity
    }
}
