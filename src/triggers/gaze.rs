use super::{missing_reference, Trigger, TriggerKind};
use crate::scene::TransformHandle;

pub const DEFAULT_FOV_DEGREES: f32 = 60.0;

/// Waits for one object to look at another within a cone
#[derive(Debug)]
pub struct GazeTrigger {
    eye: Option<TransformHandle>,
    target: Option<TransformHandle>,
    fov_degrees: f32,
}

impl GazeTrigger {
    pub fn new(
        eye: Option<TransformHandle>,
        target: Option<TransformHandle>,
        fov_degrees: f32,
    ) -> Self {
        Self {
            eye,
            target,
            fov_degrees,
        }
    }
}

impl Trigger for GazeTrigger {
    fn reset_trigger(&mut self) -> bool {
        if self.eye.is_none() {
            missing_reference(self.kind(), "eye");
            return false;
        }
        if self.target.is_none() {
            missing_reference(self.kind(), "target");
            return false;
        }

        !self.check()
    }

    fn check(&self) -> bool {
        let (Some(eye), Some(target)) = (&self.eye, &self.target) else {
            return false;
        };

        let eye = eye.get();
        let to_target = (target.position() - eye.position).normalized();
        eye.forward.angle_degrees(to_target) < self.fov_degrees
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::Gaze
    }
}
