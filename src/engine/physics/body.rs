// Body/collider blueprints for every category that lives in the physics world
//
// Fireballs are not here: they are integrated by the projectile spawner and
// never touch rapier.

use glam::Vec2;
use rapier2d::prelude::*;

use super::collision::CollisionGroups;
use super::registry::SurfaceKind;

/// Contact material of a collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub friction: Real,
    pub restitution: Real,
}

impl Material {
    /// No grip, no bounce
    pub const SLICK: Material = Material {
        friction: 0.0,
        restitution: 0.0,
    };

    /// Material per surface kind
    ///
    /// Springs keep a full restitution so the engine's own rebound agrees
    /// with the bounce the resolver applies.
    pub fn for_surface(kind: SurfaceKind) -> Self {
        match kind {
            SurfaceKind::Plain | SurfaceKind::Treadmill { .. } => Self {
                friction: 1.0,
                restitution: 0.0,
            },
            SurfaceKind::Spring { .. } => Self {
                friction: 0.05,
                restitution: 1.0,
            },
            SurfaceKind::Spike { .. } => Self {
                friction: 0.5,
                restitution: 0.0,
            },
        }
    }
}

/// Everything needed to create one box body and its collider
#[derive(Debug, Clone, Copy)]
pub struct BodyBlueprint {
    body_type: RigidBodyType,
    center: Vec2,
    half_extents: Vec2,
    groups: CollisionGroups,
    material: Material,
}

impl BodyBlueprint {
    /// Player: dynamic, rotation locked, never sleeps, pulled by gravity
    pub fn player(center: Vec2, size: Vec2) -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            center,
            half_extents: size / 2.0,
            groups: CollisionGroups::Player,
            // Combined with Min below, so no surface can drag the player
            material: Material::SLICK,
        }
    }

    /// Platform-family surface: kinematic, moved only by scrolling
    pub fn surface(kind: SurfaceKind, center: Vec2, size: Vec2) -> Self {
        Self {
            body_type: RigidBodyType::KinematicPositionBased,
            center,
            half_extents: size / 2.0,
            groups: CollisionGroups::Surface,
            material: Material::for_surface(kind),
        }
    }

    /// Wall: fixed in screen space
    pub fn boundary(center: Vec2, size: Vec2) -> Self {
        Self {
            body_type: RigidBodyType::Fixed,
            center,
            half_extents: size / 2.0,
            groups: CollisionGroups::Boundary,
            material: Material::SLICK,
        }
    }

    pub fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    /// Build the rigid body
    pub fn body(&self) -> RigidBody {
        let builder = RigidBodyBuilder::new(self.body_type)
            .translation(vector![self.center.x, self.center.y]);

        match self.body_type {
            RigidBodyType::Dynamic => builder
                .lock_rotations()
                .can_sleep(false)
                .linear_damping(0.0)
                .build(),
            _ => builder.build(),
        }
    }

    /// Build the box collider with collision events enabled
    ///
    /// The player's collider takes the minimum friction of each pair. Rapier
    /// averages by default, which would let a surface's grip leak through.
    pub fn collider(&self) -> Collider {
        let friction_rule = match self.body_type {
            RigidBodyType::Dynamic => CoefficientCombineRule::Min,
            _ => CoefficientCombineRule::Average,
        };

        ColliderBuilder::cuboid(self.half_extents.x, self.half_extents.y)
            .collision_groups(self.groups.to_interaction_groups())
            .friction(self.material.friction)
            .friction_combine_rule(friction_rule)
            .restitution(self.material.restitution)
            .density(1.0)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build()
    }
}
