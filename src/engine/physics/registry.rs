// Body registry - the single owner of every body registered with rapier
//
// Gameplay code never holds rapier handles directly; it holds an `EntityId`
// and asks the registry what that entity is (category, surface config,
// extents) and where its rapier handles live.

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;
use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

/// Stable identifier for a registered body
///
/// Ids are never reused within a session, so stale ids simply stop resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Which wall a boundary body forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundarySide {
    Top,
    Left,
    Right,
}

/// Gameplay role of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Platform,
    Spring,
    Spike,
    Treadmill,
    Player,
    Boundary(BoundarySide),
}

impl Category {
    /// Label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Spring => "spring",
            Self::Spike => "spike",
            Self::Treadmill => "treadmill",
            Self::Player => "player",
            Self::Boundary(BoundarySide::Top) => "boundary-top",
            Self::Boundary(BoundarySide::Left) => "boundary-left",
            Self::Boundary(BoundarySide::Right) => "boundary-right",
        }
    }

    /// Platform-family categories the player can stand on
    pub fn is_surface(&self) -> bool {
        matches!(
            self,
            Self::Platform | Self::Spring | Self::Spike | Self::Treadmill
        )
    }

    /// Categories that never receive scroll translation
    pub fn is_screen_fixed(&self) -> bool {
        matches!(self, Self::Player | Self::Boundary(_))
    }
}

/// Static configuration carried by a platform-family body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceKind {
    Plain,
    /// Upward velocity imparted on landing (px/tick, negative is up)
    Spring { bounce: f32 },
    Spike { damage: u8 },
    /// Signed horizontal push speed (px/tick)
    Treadmill { speed: f32 },
}

impl SurfaceKind {
    pub fn category(&self) -> Category {
        match self {
            Self::Plain => Category::Platform,
            Self::Spring { .. } => Category::Spring,
            Self::Spike { .. } => Category::Spike,
            Self::Treadmill { .. } => Category::Treadmill,
        }
    }
}

/// Everything the registry knows about one body
#[derive(Debug, Clone)]
pub struct BodyRecord {
    pub id: EntityId,
    pub category: Category,
    pub surface: Option<SurfaceKind>,
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    pub half_extents: Vec2,
    /// Excluded from scrolling and off-screen culling
    pub screen_fixed: bool,
}

/// Registry of live bodies keyed by entity id
///
/// Iteration is ordered by id, which keeps per-tick processing deterministic.
#[derive(Debug, Default)]
pub struct BodyRegistry {
    records: BTreeMap<EntityId, BodyRecord>,
    by_collider: HashMap<ColliderHandle, EntityId>,
    next_id: u64,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next entity id
    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a record under its id
    pub fn insert(&mut self, record: BodyRecord) {
        self.by_collider.insert(record.collider, record.id);
        self.records.insert(record.id, record);
    }

    /// Detach a record, returning it if it was registered
    pub fn remove(&mut self, id: EntityId) -> Option<BodyRecord> {
        let record = self.records.remove(&id)?;
        self.by_collider.remove(&record.collider);
        Some(record)
    }

    pub fn get(&self, id: EntityId) -> Option<&BodyRecord> {
        self.records.get(&id)
    }

    /// Resolve a collider handle from a rapier event back to its entity
    pub fn entity_for_collider(&self, collider: ColliderHandle) -> Option<EntityId> {
        self.by_collider.get(&collider).copied()
    }

    /// All records in id order
    pub fn iter(&self) -> impl Iterator<Item = &BodyRecord> {
        self.records.values()
    }

    /// Platform-family records in id order
    pub fn surfaces(&self) -> impl Iterator<Item = &BodyRecord> {
        self.records.values().filter(|r| r.category.is_surface())
    }
}
