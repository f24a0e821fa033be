//! Handles to externally owned scene state.
//!
//! Triggers and steps never own the objects they observe. They hold cheap,
//! cloneable handles whose state can be written from any thread (UI events,
//! tracking callbacks) while the tick thread only reads.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::DefinitionError;
use crate::spatial::Vec3;

// ─── Entities ────────────────────────────────────────────────────────────────

struct EntityNode {
    name: String,
    active: AtomicBool,
    parent: Option<EntityHandle>,
}

/// A scene object that can be shown or hidden, optionally nested under a parent
#[derive(Clone)]
pub struct EntityHandle(Arc<EntityNode>);

impl EntityHandle {
    pub fn new(name: impl Into<String>, active: bool) -> Self {
        Self(Arc::new(EntityNode {
            name: name.into(),
            active: AtomicBool::new(active),
            parent: None,
        }))
    }

    /// Create an entity nested under `parent`
    pub fn with_parent(name: impl Into<String>, active: bool, parent: &EntityHandle) -> Self {
        Self(Arc::new(EntityNode {
            name: name.into(),
            active: AtomicBool::new(active),
            parent: Some(parent.clone()),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn set_active(&self, active: bool) {
        self.0.active.store(active, Ordering::Release);
    }

    /// The entity's own flag, ignoring ancestors
    pub fn active_self(&self) -> bool {
        self.0.active.load(Ordering::Acquire)
    }

    /// True only if this entity and every ancestor is active
    pub fn active_in_hierarchy(&self) -> bool {
        let mut node = Some(self);
        while let Some(entity) = node {
            if !entity.active_self() {
                return false;
            }
            node = entity.0.parent.as_ref();
        }
        true
    }

    pub fn parent(&self) -> Option<&EntityHandle> {
        self.0.parent.as_ref()
    }
}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityHandle")
            .field("name", &self.0.name)
            .field("active", &self.active_self())
            .finish()
    }
}

// ─── Transforms ──────────────────────────────────────────────────────────────

/// Position and facing of a tracked object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub forward: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::FORWARD,
        }
    }
}

/// Shared pose of a scene object (camera, marker, prop)
#[derive(Clone)]
pub struct TransformHandle {
    name: Arc<str>,
    inner: Arc<RwLock<Transform>>,
}

impl TransformHandle {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: Arc::from(name.into()),
            inner: Arc::new(RwLock::new(transform)),
        }
    }

    pub fn at(name: impl Into<String>, position: Vec3) -> Self {
        Self::new(
            name,
            Transform {
                position,
                ..Transform::default()
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> Transform {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn position(&self) -> Vec3 {
        self.get().position
    }

    pub fn forward(&self) -> Vec3 {
        self.get().forward
    }

    pub fn set_position(&self, position: Vec3) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .position = position;
    }

    pub fn set_forward(&self, forward: Vec3) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .forward = forward;
    }
}

impl fmt::Debug for TransformHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformHandle")
            .field("name", &self.name)
            .field("transform", &self.get())
            .finish()
    }
}

// ─── Buttons ─────────────────────────────────────────────────────────────────

/// A UI control that counts activations
#[derive(Clone)]
pub struct ButtonHandle {
    name: Arc<str>,
    clicks: Arc<AtomicU64>,
}

impl ButtonHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            clicks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register one activation of the control
    pub fn click(&self) {
        self.clicks.fetch_add(1, Ordering::AcqRel);
    }

    /// Total activations since creation
    pub fn clicks(&self) -> u64 {
        self.clicks.load(Ordering::Acquire)
    }
}

impl fmt::Debug for ButtonHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonHandle")
            .field("name", &self.name)
            .field("clicks", &self.clicks())
            .finish()
    }
}

// ─── Proxies ─────────────────────────────────────────────────────────────────

/// Query state flags reported by an external tracking system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryState(u8);

impl QueryState {
    pub const UNKNOWN: QueryState = QueryState(0);
    pub const QUERYING: QueryState = QueryState(1);
    pub const ACQUIRING: QueryState = QueryState(1 << 1);
    pub const TRACKING: QueryState = QueryState(1 << 2);
    pub const RESUMING: QueryState = QueryState(1 << 3);

    pub fn contains(self, other: QueryState) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn union(self, other: QueryState) -> QueryState {
        QueryState(self.0 | other.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

/// A tracked real-world proxy whose state is owned by the tracking host
#[derive(Clone)]
pub struct ProxyHandle {
    name: Arc<str>,
    state: Arc<AtomicU8>,
}

impl ProxyHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            state: Arc::new(AtomicU8::new(QueryState::QUERYING.bits())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn query_state(&self) -> QueryState {
        QueryState(self.state.load(Ordering::Acquire))
    }

    pub fn set_query_state(&self, state: QueryState) {
        self.state.store(state.bits(), Ordering::Release);
    }

    /// Convenience for hosts that only report found/lost
    pub fn set_tracking(&self, tracking: bool) {
        let state = if tracking {
            QueryState::TRACKING
        } else {
            QueryState::QUERYING
        };
        self.set_query_state(state);
    }

    pub fn is_tracking(&self) -> bool {
        self.query_state().contains(QueryState::TRACKING)
    }
}

impl fmt::Debug for ProxyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyHandle")
            .field("name", &self.name)
            .field("state", &self.query_state())
            .finish()
    }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Name lookup for every handle an authored walkthrough can reference
#[derive(Debug, Clone, Default)]
pub struct Scene {
    entities: HashMap<String, EntityHandle>,
    transforms: HashMap<String, TransformHandle>,
    buttons: HashMap<String, ButtonHandle>,
    proxies: HashMap<String, ProxyHandle>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, entity: EntityHandle) -> Result<(), DefinitionError> {
        insert_unique(&mut self.entities, "entity", entity.name().to_string(), entity)
    }

    pub fn add_transform(&mut self, transform: TransformHandle) -> Result<(), DefinitionError> {
        insert_unique(
            &mut self.transforms,
            "transform",
            transform.name().to_string(),
            transform,
        )
    }

    pub fn add_button(&mut self, button: ButtonHandle) -> Result<(), DefinitionError> {
        insert_unique(&mut self.buttons, "button", button.name().to_string(), button)
    }

    pub fn add_proxy(&mut self, proxy: ProxyHandle) -> Result<(), DefinitionError> {
        insert_unique(&mut self.proxies, "proxy", proxy.name().to_string(), proxy)
    }

    pub fn entity(&self, name: &str) -> Option<EntityHandle> {
        self.entities.get(name).cloned()
    }

    pub fn transform(&self, name: &str) -> Option<TransformHandle> {
        self.transforms.get(name).cloned()
    }

    pub fn button(&self, name: &str) -> Option<ButtonHandle> {
        self.buttons.get(name).cloned()
    }

    pub fn proxy(&self, name: &str) -> Option<ProxyHandle> {
        self.proxies.get(name).cloned()
    }

    /// Entities sorted by name
    pub fn entities(&self) -> Vec<EntityHandle> {
        sorted_values(&self.entities)
    }

    /// Transforms sorted by name
    pub fn transforms(&self) -> Vec<TransformHandle> {
        sorted_values(&self.transforms)
    }

    /// Buttons sorted by name
    pub fn buttons(&self) -> Vec<ButtonHandle> {
        sorted_values(&self.buttons)
    }

    /// Proxies sorted by name
    pub fn proxies(&self) -> Vec<ProxyHandle> {
        sorted_values(&self.proxies)
    }
}

fn insert_unique<T>(
    map: &mut HashMap<String, T>,
    kind: &'static str,
    name: String,
    value: T,
) -> Result<(), DefinitionError> {
    if map.contains_key(&name) {
        return Err(DefinitionError::DuplicateName { kind, name });
    }
    map.insert(name, value);
    Ok(())
}

fn sorted_values<T: Clone>(map: &HashMap<String, T>) -> Vec<T> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys.into_iter().map(|k| map[k].clone()).collect()
}
