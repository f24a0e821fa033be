use super::{missing_reference, Trigger, TriggerKind};
use crate::scene::EntityHandle;

/// Waits for an entity to become active in its hierarchy
#[derive(Debug)]
pub struct ObjectActiveTrigger {
    entity: Option<EntityHandle>,
}

impl ObjectActiveTrigger {
    pub fn new(entity: Option<EntityHandle>) -> Self {
        Self { entity }
    }
}

impl Trigger for ObjectActiveTrigger {
    fn reset_trigger(&mut self) -> bool {
        if self.entity.is_none() {
            missing_reference(self.kind(), "entity");
            return false;
        }

        !self.check()
    }

    fn check(&self) -> bool {
        self.entity
            .as_ref()
            .is_some_and(EntityHandle::active_in_hierarchy)
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::ObjectActive
    }
}
