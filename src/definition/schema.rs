//! Schema for walkthrough authoring files

use serde::{Deserialize, Serialize};

use crate::spatial::Vec3;
use crate::triggers::{delay, gaze, proximity, TriggerKind};

/// Top-level authoring document: the scene objects and the ordered steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkthroughDef {
    /// Display name of the walkthrough
    pub name: String,
    #[serde(default)]
    pub entities: Vec<EntityDef>,
    #[serde(default)]
    pub transforms: Vec<TransformDef>,
    #[serde(default)]
    pub buttons: Vec<ButtonDef>,
    #[serde(default)]
    pub proxies: Vec<ProxyDef>,
    /// Steps in the order they are presented
    #[serde(default)]
    pub steps: Vec<StepDef>,
}

/// A showable scene object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Entity this one is nested under
    #[serde(default)]
    pub parent: Option<String>,
}

/// A posed scene object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformDef {
    pub name: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default = "default_forward")]
    pub forward: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonDef {
    pub name: String,
}

/// A real-world object located by the tracking host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyDef {
    pub name: String,
    /// Whether the proxy starts out tracking
    #[serde(default)]
    pub tracking: bool,
}

/// One step of the walkthrough
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDef {
    pub name: String,
    /// Text shown to the user while this step is active
    #[serde(default)]
    pub description: String,
    /// Entities shown while the step is active
    #[serde(default)]
    pub visuals: Vec<String>,
    /// Disallow skipping past this step until it has completed once
    #[serde(default)]
    pub block_until_complete: bool,
    /// Advance automatically when the step's triggers pass
    #[serde(default = "default_true")]
    pub auto_progress_on_complete: bool,
    #[serde(default)]
    pub triggers: Vec<TriggerDef>,
}

/// Trigger configuration, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerDef {
    ButtonPress {
        button: Option<String>,
    },
    Delay {
        #[serde(default = "default_delay")]
        seconds: f32,
    },
    Gaze {
        eye: Option<String>,
        target: Option<String>,
        /// Half-angle of the view cone in degrees
        #[serde(default = "default_fov")]
        fov: f32,
    },
    Proximity {
        source: Option<String>,
        target: Option<String>,
        #[serde(default = "default_distance")]
        distance: f32,
    },
    ObjectActive {
        entity: Option<String>,
    },
    ProxyFound {
        proxy: Option<String>,
    },
}

impl TriggerDef {
    pub fn kind(&self) -> TriggerKind {
        match self {
            TriggerDef::ButtonPress { .. } => TriggerKind::ButtonPress,
            TriggerDef::Delay { .. } => TriggerKind::Delay,
            TriggerDef::Gaze { .. } => TriggerKind::Gaze,
            TriggerDef::Proximity { .. } => TriggerKind::Proximity,
            TriggerDef::ObjectActive { .. } => TriggerKind::ObjectActive,
            TriggerDef::ProxyFound { .. } => TriggerKind::ProxyFound,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_forward() -> Vec3 {
    Vec3::FORWARD
}

fn default_delay() -> f32 {
    delay::DEFAULT_DELAY_SECS
}

fn default_fov() -> f32 {
    gaze::DEFAULT_FOV_DEGREES
}

fn default_distance() -> f32 {
    proximity::DEFAULT_DISTANCE
}
