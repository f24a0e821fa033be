//! Loading walkthroughs from TOML authoring files
//!
//! An authoring file declares the scene objects a walkthrough refers to and
//! the ordered steps. Building it produces a live [`Walkthrough`] plus the
//! [`Scene`] whose handles the host drives.

pub mod schema;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub use schema::{
    ButtonDef, EntityDef, ProxyDef, StepDef, TransformDef, TriggerDef, WalkthroughDef,
};

use crate::clock::Clock;
use crate::error::DefinitionError;
use crate::scene::{ButtonHandle, EntityHandle, ProxyHandle, Scene, Transform, TransformHandle};
use crate::triggers::{
    ButtonPressTrigger, DelayTrigger, GazeTrigger, ObjectActiveTrigger, ProximityTrigger,
    ProxyFoundTrigger, Trigger,
};
use crate::walkthrough::{Step, Walkthrough, WalkthroughBuilder};

/// A reference in a step that names no scene object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRef {
    pub step: String,
    /// Scene namespace searched (entity, transform, button, proxy)
    pub kind: &'static str,
    pub name: String,
}

impl fmt::Display for UnresolvedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step '{}' references unknown {} '{}'",
            self.step, self.kind, self.name
        )
    }
}

/// A built walkthrough together with the scene it observes
#[derive(Debug)]
pub struct LoadedWalkthrough {
    pub walkthrough: Walkthrough,
    pub scene: Scene,
    pub unresolved: Vec<UnresolvedRef>,
}

/// Parse an authoring document without building it
pub fn parse(source: &str) -> Result<WalkthroughDef, DefinitionError> {
    Ok(toml::from_str(source)?)
}

/// Read and parse an authoring file
pub fn read_file(path: &Path) -> Result<WalkthroughDef, DefinitionError> {
    let source = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&source)
}

/// Read, parse and build an authoring file
pub fn load_file(path: &Path, clock: Arc<dyn Clock>) -> Result<LoadedWalkthrough, DefinitionError> {
    let def = read_file(path)?;
    tracing::debug!(path = %path.display(), steps = def.steps.len(), "Loaded walkthrough definition");
    def.build(clock)
}

impl WalkthroughDef {
    /// Build the scene and start the walkthrough
    pub fn build(&self, clock: Arc<dyn Clock>) -> Result<LoadedWalkthrough, DefinitionError> {
        self.build_with(clock, |builder| builder)
    }

    /// Build, letting the caller register observers before the walkthrough starts
    pub fn build_with(
        &self,
        clock: Arc<dyn Clock>,
        configure: impl FnOnce(WalkthroughBuilder) -> WalkthroughBuilder,
    ) -> Result<LoadedWalkthrough, DefinitionError> {
        let scene = self.build_scene()?;
        let mut resolver = Resolver {
            scene: &scene,
            step: String::new(),
            unresolved: Vec::new(),
        };

        let steps: Vec<Step> = self
            .steps
            .iter()
            .map(|def| resolver.build_step(def, &clock))
            .collect();

        let unresolved = resolver.unresolved;
        for missing in &unresolved {
            tracing::warn!("{}", missing);
        }

        let walkthrough = configure(Walkthrough::builder(&self.name).steps(steps)).build();

        Ok(LoadedWalkthrough {
            walkthrough,
            scene,
            unresolved,
        })
    }

    fn build_scene(&self) -> Result<Scene, DefinitionError> {
        let mut scene = Scene::new();

        for entity in build_entities(&self.entities)? {
            scene.add_entity(entity)?;
        }

        for def in &self.transforms {
            scene.add_transform(TransformHandle::new(
                &def.name,
                Transform {
                    position: def.position,
                    forward: def.forward,
                },
            ))?;
        }

        for def in &self.buttons {
            scene.add_button(ButtonHandle::new(&def.name))?;
        }

        for def in &self.proxies {
            let proxy = ProxyHandle::new(&def.name);
            proxy.set_tracking(def.tracking);
            scene.add_proxy(proxy)?;
        }

        Ok(scene)
    }
}

/// Create entity handles, parents before children, in declaration order
fn build_entities(defs: &[EntityDef]) -> Result<Vec<EntityHandle>, DefinitionError> {
    let mut by_name: HashMap<&str, &EntityDef> = HashMap::new();
    for def in defs {
        if by_name.insert(def.name.as_str(), def).is_some() {
            return Err(DefinitionError::DuplicateName {
                kind: "entity",
                name: def.name.clone(),
            });
        }
    }

    let mut built: HashMap<String, EntityHandle> = HashMap::new();
    let mut visiting: Vec<String> = Vec::new();
    defs.iter()
        .map(|def| resolve_entity(&def.name, &by_name, &mut built, &mut visiting))
        .collect()
}

fn resolve_entity(
    name: &str,
    by_name: &HashMap<&str, &EntityDef>,
    built: &mut HashMap<String, EntityHandle>,
    visiting: &mut Vec<String>,
) -> Result<EntityHandle, DefinitionError> {
    if let Some(handle) = built.get(name) {
        return Ok(handle.clone());
    }
    if visiting.iter().any(|v| v == name) {
        return Err(DefinitionError::ParentCycle(name.to_string()));
    }

    let def = by_name[name];
    visiting.push(name.to_string());

    let handle = match &def.parent {
        Some(parent) => {
            if !by_name.contains_key(parent.as_str()) {
                return Err(DefinitionError::UnknownParent {
                    entity: name.to_string(),
                    parent: parent.clone(),
                });
            }
            let parent = resolve_entity(parent, by_name, built, visiting)?;
            EntityHandle::with_parent(name, def.active, &parent)
        }
        None => EntityHandle::new(name, def.active),
    };

    visiting.pop();
    built.insert(name.to_string(), handle.clone());
    Ok(handle)
}

/// Looks up step references, recording the ones that miss
struct Resolver<'a> {
    scene: &'a Scene,
    step: String,
    unresolved: Vec<UnresolvedRef>,
}

impl Resolver<'_> {
    fn build_step(&mut self, def: &StepDef, clock: &Arc<dyn Clock>) -> Step {
        self.step = def.name.clone();

        let mut step = Step::new(&def.name)
            .with_description(&def.description)
            .block_until_complete(def.block_until_complete)
            .auto_progress_on_complete(def.auto_progress_on_complete);

        for visual in &def.visuals {
            if let Some(entity) = self.entity(Some(visual)) {
                step = step.with_visual(entity);
            }
        }

        for trigger in &def.triggers {
            step = step.with_boxed_trigger(self.build_trigger(trigger, clock));
        }

        step
    }

    fn build_trigger(&mut self, def: &TriggerDef, clock: &Arc<dyn Clock>) -> Box<dyn Trigger> {
        match def {
            TriggerDef::ButtonPress { button } => {
                Box::new(ButtonPressTrigger::new(self.button(button.as_deref())))
            }
            TriggerDef::Delay { seconds } => Box::new(DelayTrigger::new(Arc::clone(clock), *seconds)),
            TriggerDef::Gaze { eye, target, fov } => Box::new(GazeTrigger::new(
                self.transform(eye.as_deref()),
                self.transform(target.as_deref()),
                *fov,
            )),
            TriggerDef::Proximity {
                source,
                target,
                distance,
            } => Box::new(ProximityTrigger::new(
                self.transform(source.as_deref()),
                self.transform(target.as_deref()),
                *distance,
            )),
            TriggerDef::ObjectActive { entity } => {
                Box::new(ObjectActiveTrigger::new(self.entity(entity.as_deref())))
            }
            TriggerDef::ProxyFound { proxy } => {
                Box::new(ProxyFoundTrigger::new(self.proxy(proxy.as_deref())))
            }
        }
    }

    fn entity(&mut self, name: Option<&str>) -> Option<EntityHandle> {
        let name = name?;
        let found = self.scene.entity(name);
        self.note_missing(found.is_none(), "entity", name);
        found
    }

    fn transform(&mut self, name: Option<&str>) -> Option<TransformHandle> {
        let name = name?;
        let found = self.scene.transform(name);
        self.note_missing(found.is_none(), "transform", name);
        found
    }

    fn button(&mut self, name: Option<&str>) -> Option<ButtonHandle> {
        let name = name?;
        let found = self.scene.button(name);
        self.note_missing(found.is_none(), "button", name);
        found
    }

    fn proxy(&mut self, name: Option<&str>) -> Option<ProxyHandle> {
        let name = name?;
        let found = self.scene.proxy(name);
        self.note_missing(found.is_none(), "proxy", name);
        found
    }

    fn note_missing(&mut self, missing: bool, kind: &'static str, name: &str) {
        if missing {
            self.unresolved.push(UnresolvedRef {
                step: self.step.clone(),
                kind,
                name: name.to_string(),
            });
        }
    }
}
