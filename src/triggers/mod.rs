//! Pluggable conditions that gate step completion
//!
//! Every trigger follows the same two-call contract:
//!
//! * [`Trigger::reset_trigger`] re-arms the condition when the owning step
//!   starts and reports whether the step should wait on it. A trigger whose
//!   prerequisites are missing, or that is already satisfied, returns `false`
//!   and is left out of the pending set for that activation.
//! * [`Trigger::check`] is a pure query. It may be polled any number of times
//!   per tick.

pub mod button;
pub mod delay;
pub mod gaze;
pub mod object_active;
pub mod proximity;
pub mod proxy_found;

use std::fmt;

pub use button::ButtonPressTrigger;
pub use delay::DelayTrigger;
pub use gaze::GazeTrigger;
pub use object_active::ObjectActiveTrigger;
pub use proximity::ProximityTrigger;
pub use proxy_found::ProxyFoundTrigger;

/// A resettable boolean condition
pub trait Trigger: fmt::Debug {
    /// Re-arm internal state. Returns true if the step should track this trigger.
    fn reset_trigger(&mut self) -> bool;

    /// Whether the condition is currently met
    fn check(&self) -> bool;

    fn kind(&self) -> TriggerKind;
}

/// Discriminant for the built-in trigger variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    ButtonPress,
    Delay,
    Gaze,
    Proximity,
    ObjectActive,
    ProxyFound,
    /// Host-defined trigger outside the built-in set
    Custom,
}

impl TriggerKind {
    pub fn label(self) -> &'static str {
        match self {
            TriggerKind::ButtonPress => "button_press",
            TriggerKind::Delay => "delay",
            TriggerKind::Gaze => "gaze",
            TriggerKind::Proximity => "proximity",
            TriggerKind::ObjectActive => "object_active",
            TriggerKind::ProxyFound => "proxy_found",
            TriggerKind::Custom => "custom",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shared diagnostic for triggers that cannot participate
fn missing_reference(kind: TriggerKind, what: &str) {
    tracing::warn!(trigger = %kind, missing = what, "Trigger skipped: reference not set");
}
