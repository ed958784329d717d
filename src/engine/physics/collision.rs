use rapier2d::prelude::*;
use std::sync::{Arc, Mutex};

use super::registry::EntityId;

/// Collision groups for filtering what objects can collide with each other
///
/// The player is the only dynamic body, so every useful pair involves it:
/// surfaces and walls only ever need to interact with the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroups {
    /// The player body
    Player = 0b0001,

    /// Platform-family surfaces (platforms, springs, spikes, treadmills)
    Surface = 0b0010,

    /// Top/left/right walls of the play field
    Boundary = 0b0100,
}

impl CollisionGroups {
    fn bits(self) -> Group {
        Group::from_bits_truncate(self as u32)
    }

    /// Convert to rapier2d's InteractionGroups
    pub fn to_interaction_groups(self) -> InteractionGroups {
        let filter = match self {
            // Never player against player
            CollisionGroups::Player => CollisionGroups::Surface.bits() | CollisionGroups::Boundary.bits(),
            // Scrolling surfaces pass through each other and the walls
            CollisionGroups::Surface | CollisionGroups::Boundary => CollisionGroups::Player.bits(),
        };

        InteractionGroups::new(self.bits(), filter)
    }
}

/// Start/stop of a collider pair, as recorded during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawContact {
    pub collider1: ColliderHandle,
    pub collider2: ColliderHandle,
    pub started: bool,
}

/// Collision event translated to registered entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEvent {
    Began(EntityId, EntityId),
    Ended(EntityId, EntityId),
}

impl ContactEvent {
    /// The other entity in the pair, if `id` takes part in it
    pub fn partner_of(&self, id: EntityId) -> Option<EntityId> {
        let (a, b) = match *self {
            Self::Began(a, b) | Self::Ended(a, b) => (a, b),
        };
        if a == id {
            Some(b)
        } else if b == id {
            Some(a)
        } else {
            None
        }
    }
}

/// Contacts recorded by rapier during the latest step
///
/// Rapier hands the handler out by shared reference, hence the mutex.
#[derive(Debug, Default)]
pub struct ContactQueue {
    contacts: Arc<Mutex<Vec<RawContact>>>,
}

impl ContactQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget anything left from an earlier step
    pub fn clear(&self) {
        if let Ok(mut contacts) = self.contacts.lock() {
            contacts.clear();
        }
    }

    /// Take every recorded contact, leaving the queue empty
    pub fn drain(&self) -> Vec<RawContact> {
        self.contacts
            .lock()
            .map(|mut contacts| std::mem::take(&mut *contacts))
            .unwrap_or_default()
    }

    fn record(&self, contact: RawContact) {
        if let Ok(mut contacts) = self.contacts.lock() {
            contacts.push(contact);
        }
    }
}

impl EventHandler for ContactQueue {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        // Stops caused by despawning are already handled by the culler
        if event.removed() {
            return;
        }
        self.record(RawContact {
            collider1: event.collider1(),
            collider2: event.collider2(),
            started: event.started(),
        });
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}
