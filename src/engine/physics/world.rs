use glam::Vec2;
use log::{debug, warn};
use rapier2d::prelude::*;

use super::body::BodyBlueprint;
use super::collision::{ContactEvent, ContactQueue};
use super::registry::{BodyRecord, BodyRegistry, BoundarySide, Category, EntityId, SurfaceKind};
use crate::core::error::{GameError, GameResult};

/// Physics world that manages all physics simulation
///
/// Distances are screen pixels with y pointing down; one unit of simulated
/// time is one tick, so velocities read and written here are px/tick.
pub struct PhysicsWorld {
    /// Gravity vector (positive y pulls toward the bottom of the screen)
    gravity: Vector<Real>,

    /// Integration parameters for the physics simulation
    integration_parameters: IntegrationParameters,

    /// Physics pipeline handles collision detection and solving
    physics_pipeline: PhysicsPipeline,

    /// Island manager for sleeping bodies
    island_manager: IslandManager,

    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,

    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,

    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,

    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,

    /// CCD solver for fast-moving objects
    ccd_solver: CCDSolver,

    /// Rigid body set
    rigid_body_set: RigidBodySet,

    /// Collider set
    collider_set: ColliderSet,

    /// Contacts recorded by the latest step
    contacts: ContactQueue,

    /// Owner of every registered body
    registry: BodyRegistry,
}

impl PhysicsWorld {
    /// Create a new physics world pulling bodies down at `gravity` px/tick²
    pub fn new(gravity: Real) -> Self {
        Self::with_gravity(vector![0.0, gravity])
    }

    /// Create a new physics world with a custom gravity vector
    pub fn with_gravity(gravity: Vector<Real>) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        // One full tick per step unless the frame clock says otherwise
        integration_parameters.dt = 1.0;

        Self {
            gravity,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            contacts: ContactQueue::new(),
            registry: BodyRegistry::new(),
        }
    }

    /// Step the simulation forward by `dt_ticks` ticks
    pub fn step(&mut self, dt_ticks: Real) {
        if dt_ticks <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt_ticks;

        self.contacts.clear();

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &self.contacts,
        );
    }

    /// Build a blueprint into rapier and register it
    fn insert(&mut self, category: Category, surface: Option<SurfaceKind>, blueprint: BodyBlueprint) -> EntityId {
        let body_handle = self.rigid_body_set.insert(blueprint.body());
        let collider_handle = self.collider_set.insert_with_parent(
            blueprint.collider(),
            body_handle,
            &mut self.rigid_body_set,
        );

        let id = self.registry.allocate_id();
        self.registry.insert(BodyRecord {
            id,
            category,
            surface,
            body: body_handle,
            collider: collider_handle,
            half_extents: blueprint.half_extents(),
            screen_fixed: category.is_screen_fixed(),
        });
        debug!("Spawned {} {:?}", category.label(), id);
        id
    }

    /// Create the player body
    pub fn spawn_player(&mut self, position: Vec2, size: Vec2) -> EntityId {
        self.insert(Category::Player, None, BodyBlueprint::player(position, size))
    }

    /// Create a platform-family body
    pub fn spawn_surface(&mut self, kind: SurfaceKind, position: Vec2, size: Vec2) -> EntityId {
        self.insert(kind.category(), Some(kind), BodyBlueprint::surface(kind, position, size))
    }

    /// Create a wall body
    pub fn spawn_boundary(&mut self, side: BoundarySide, position: Vec2, size: Vec2) -> EntityId {
        self.insert(Category::Boundary(side), None, BodyBlueprint::boundary(position, size))
    }

    /// Remove a body and its collider from rapier and the registry
    pub fn despawn(&mut self, id: EntityId) -> GameResult<BodyRecord> {
        let record = self.registry.remove(id).ok_or(GameError::UnknownEntity(id))?;
        self.rigid_body_set.remove(
            record.body,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true, // remove attached colliders
        );
        debug!("Despawned {} {:?}", record.category.label(), id);
        Ok(record)
    }

    /// Registry of live bodies
    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn record(&self, id: EntityId) -> Option<&BodyRecord> {
        self.registry.get(id)
    }

    fn body(&self, id: EntityId) -> GameResult<&RigidBody> {
        let handle = self.registry.get(id).ok_or(GameError::UnknownEntity(id))?.body;
        self.rigid_body_set
            .get(handle)
            .ok_or(GameError::UnknownEntity(id))
    }

    fn body_mut(&mut self, id: EntityId) -> GameResult<&mut RigidBody> {
        let handle = self.registry.get(id).ok_or(GameError::UnknownEntity(id))?.body;
        self.rigid_body_set
            .get_mut(handle)
            .ok_or(GameError::UnknownEntity(id))
    }

    /// Centre of a body
    pub fn position(&self, id: EntityId) -> GameResult<Vec2> {
        let body = self.body(id)?;
        let t = body.translation();
        Ok(Vec2::new(t.x, t.y))
    }

    /// Linear velocity of a body (px/tick)
    pub fn velocity(&self, id: EntityId) -> GameResult<Vec2> {
        let body = self.body(id)?;
        let v = body.linvel();
        Ok(Vec2::new(v.x, v.y))
    }

    /// Overwrite a body's linear velocity
    pub fn set_velocity(&mut self, id: EntityId, velocity: Vec2) -> GameResult<()> {
        self.body_mut(id)?
            .set_linvel(vector![velocity.x, velocity.y], true);
        Ok(())
    }

    /// Teleport a body, leaving its velocity untouched
    pub fn set_position(&mut self, id: EntityId, position: Vec2) -> GameResult<()> {
        self.body_mut(id)?
            .set_translation(vector![position.x, position.y], true);
        Ok(())
    }

    /// Move a body by `delta`
    ///
    /// Kinematic bodies get the move as their next target so the solver sees
    /// the motion and carries the player along; anything else is teleported.
    pub fn translate(&mut self, id: EntityId, delta: Vec2) -> GameResult<()> {
        let body = self.body_mut(id)?;
        let next = body.translation() + vector![delta.x, delta.y];
        if body.is_kinematic() {
            body.set_next_kinematic_translation(next);
        } else {
            body.set_translation(next, true);
        }
        Ok(())
    }

    /// Convert the events of the last step into entity pairs
    ///
    /// Events naming a collider that is no longer registered (the body was
    /// culled after the step) are dropped.
    pub fn drain_contact_events(&mut self) -> Vec<ContactEvent> {
        self.contacts
            .drain()
            .into_iter()
            .filter_map(|raw| {
                let pair = (
                    self.registry.entity_for_collider(raw.collider1),
                    self.registry.entity_for_collider(raw.collider2),
                );
                match pair {
                    (Some(a), Some(b)) if raw.started => Some(ContactEvent::Began(a, b)),
                    (Some(a), Some(b)) => Some(ContactEvent::Ended(a, b)),
                    _ => {
                        warn!("Dropping contact for unregistered collider {:?}", raw);
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spawn_and_query_player() {
        let mut world = PhysicsWorld::new(0.5);
        let id = world.spawn_player(Vec2::new(100.0, 50.0), Vec2::new(40.0, 40.0));

        assert_eq!(world.record(id).unwrap().category, Category::Player);
        assert_eq!(world.position(id).unwrap(), Vec2::new(100.0, 50.0));
        assert_eq!(world.velocity(id).unwrap(), Vec2::ZERO);
    }

    #[test]
    fn test_gravity_pulls_player_down() {
        let mut world = PhysicsWorld::new(0.5);
        let id = world.spawn_player(Vec2::new(100.0, 50.0), Vec2::new(40.0, 40.0));

        world.step(1.0);
        let velocity = world.velocity(id).unwrap();
        assert!(velocity.y > 0.0);
        assert!(world.position(id).unwrap().y > 50.0);
    }

    #[test]
    fn test_kinematic_translate_applies_on_step() {
        let mut world = PhysicsWorld::new(0.5);
        let id = world.spawn_surface(SurfaceKind::Plain, Vec2::new(100.0, 400.0), Vec2::new(100.0, 20.0));

        world.translate(id, Vec2::new(0.0, -1.8)).unwrap();
        world.step(1.0);
        assert_relative_eq!(world.position(id).unwrap().y, 398.2, epsilon = 1e-3);
    }

    #[test]
    fn test_set_velocity_round_trips() {
        let mut world = PhysicsWorld::new(0.5);
        let id = world.spawn_player(Vec2::new(100.0, 50.0), Vec2::new(40.0, 40.0));
        world.set_velocity(id, Vec2::new(1.2, -8.0)).unwrap();
        assert_eq!(world.velocity(id).unwrap(), Vec2::new(1.2, -8.0));
    }

    #[test]
    fn test_despawn_unknown_entity_errors() {
        let mut world = PhysicsWorld::new(0.5);
        let id = world.spawn_boundary(BoundarySide::Top, Vec2::new(195.0, 0.0), Vec2::new(390.0, 20.0));

        assert!(world.despawn(id).is_ok());
        assert!(matches!(world.despawn(id), Err(GameError::UnknownEntity(_))));
        assert!(matches!(world.position(id), Err(GameError::UnknownEntity(_))));
    }

    #[test]
    fn test_landing_emits_contact_event() {
        let mut world = PhysicsWorld::new(0.5);
        let player = world.spawn_player(Vec2::new(100.0, 100.0), Vec2::new(40.0, 40.0));
        let floor = world.spawn_surface(SurfaceKind::Plain, Vec2::new(100.0, 160.0), Vec2::new(100.0, 20.0));

        let mut began = false;
        for _ in 0..60 {
            world.step(1.0);
            began |= world
                .drain_contact_events()
                .iter()
                .any(|e| matches!(e, ContactEvent::Began(..)) && e.partner_of(player) == Some(floor));
        }
        assert!(began);
    }
}
