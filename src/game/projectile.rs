// Fireballs - kinematic hazards simulated outside the physics engine
//
// Each fireball carries its own velocity and is integrated here every tick;
// hits are plain AABB overlap tests against the player and surfaces.

use glam::Vec2;
use log::debug;
use parry2d::bounding_volume::Aabb;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::core::config::{GameConfig, ProjectileConfig};
use crate::core::math::{aabb_from_center, aabbs_overlap};
use crate::engine::physics::EntityId;

/// A falling fireball
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u64,
    pub position: Vec2,
    /// px/tick, always downward
    pub velocity: Vec2,
    pub size: f32,
}

impl Projectile {
    pub fn aabb(&self) -> Aabb {
        aabb_from_center(self.position, Vec2::splat(self.size / 2.0))
    }

    /// Move by the stored velocity
    pub fn integrate(&mut self, dt_ticks: f32) {
        self.position += self.velocity * dt_ticks;
    }

    /// Entirely below the bottom edge
    pub fn is_below(&self, screen_height: f32) -> bool {
        self.position.y - self.size / 2.0 > screen_height
    }
}

/// What consumed a fireball this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileImpact {
    /// Fell off the bottom of the screen
    Expired { projectile: u64 },
    HitPlayer { projectile: u64 },
    HitSurface { projectile: u64, surface: EntityId },
}

/// Spawns fireballs on a fixed interval and owns the live set
#[derive(Debug)]
pub struct ProjectileSpawner {
    rng: Pcg32,
    last_spawn_ms: f64,
    live: Vec<Projectile>,
    next_id: u64,
}

impl ProjectileSpawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            last_spawn_ms: 0.0,
            live: Vec::new(),
            next_id: 0,
        }
    }

    pub fn live(&self) -> &[Projectile] {
        &self.live
    }

    /// Spawn a fireball if a full interval has passed since the last one
    pub fn try_spawn(&mut self, now_ms: f64, config: &GameConfig) -> Option<Projectile> {
        let settings: &ProjectileConfig = &config.projectile;
        if !settings.enabled || now_ms - self.last_spawn_ms < settings.spawn_interval_ms {
            return None;
        }
        self.last_spawn_ms = now_ms;

        let half = settings.size / 2.0;
        let min_x = settings.spawn_margin + half;
        let max_x = (config.screen.width - settings.spawn_margin - half).max(min_x);
        let x = self.rng.random_range(min_x..=max_x);
        let speed = self
            .rng
            .random_range(settings.min_speed..=settings.max_speed);

        let projectile = Projectile {
            id: self.next_id,
            position: Vec2::new(x, settings.spawn_y),
            velocity: Vec2::new(0.0, speed),
            size: settings.size,
        };
        self.next_id += 1;
        debug!("Spawned fireball {} at x {} falling {} px/tick", projectile.id, x, speed);

        self.live.push(projectile.clone());
        Some(projectile)
    }

    /// Advance every fireball and consume the ones that hit something
    ///
    /// Per fireball the checks run in order: off-screen, player, surfaces.
    /// The first match consumes it and skips the rest.
    pub fn update(
        &mut self,
        dt_ticks: f32,
        screen_height: f32,
        player: &Aabb,
        surfaces: &[(EntityId, Aabb)],
    ) -> Vec<ProjectileImpact> {
        let mut impacts = Vec::new();

        self.live.retain_mut(|projectile| {
            projectile.integrate(dt_ticks);

            if projectile.is_below(screen_height) {
                impacts.push(ProjectileImpact::Expired {
                    projectile: projectile.id,
                });
                return false;
            }

            let bounds = projectile.aabb();
            if aabbs_overlap(&bounds, player) {
                impacts.push(ProjectileImpact::HitPlayer {
                    projectile: projectile.id,
                });
                return false;
            }

            if let Some((surface, _)) = surfaces.iter().find(|(_, aabb)| aabbs_overlap(&bounds, aabb)) {
                impacts.push(ProjectileImpact::HitSurface {
                    projectile: projectile.id,
                    surface: *surface,
                });
                return false;
            }

            true
        });

        impacts
    }
}
