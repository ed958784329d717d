// Scroll & lifecycle: world translation and off-screen culling

use glam::Vec2;
use log::{debug, warn};

use crate::core::config::{GameConfig, ScrollConfig};
use crate::core::error::GameResult;
use crate::engine::physics::{EntityId, PhysicsWorld};

/// Moves every world body by the scroll speed and drops what leaves the screen
#[derive(Debug, Default)]
pub struct ScrollManager {
    /// Total upward distance scrolled; world y = screen y + offset
    offset: f32,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Translate every non-screen-fixed body by `speed * dt_ticks`
    ///
    /// The player and the walls are screen-fixed and never move here.
    pub fn advance(
        &mut self,
        world: &mut PhysicsWorld,
        config: &ScrollConfig,
        dt_ticks: f32,
    ) -> GameResult<f32> {
        let delta = config.speed * dt_ticks;
        if delta == 0.0 {
            return Ok(0.0);
        }

        let movers: Vec<EntityId> = world
            .registry()
            .iter()
            .filter(|r| !r.screen_fixed)
            .map(|r| r.id)
            .collect();

        for id in movers {
            world.translate(id, Vec2::new(0.0, delta))?;
        }
        self.offset -= delta;
        Ok(delta)
    }

    /// Remove every world body outside [`GameConfig::cull_range`]
    pub fn cull_offscreen(&self, world: &mut PhysicsWorld, config: &GameConfig) -> Vec<EntityId> {
        let (min_y, max_y) = config.cull_range();

        let doomed: Vec<EntityId> = world
            .registry()
            .iter()
            .filter(|r| !r.screen_fixed)
            .filter(|r| match world.position(r.id) {
                Ok(pos) => pos.y < min_y || pos.y > max_y,
                Err(_) => true,
            })
            .map(|r| r.id)
            .collect();

        let mut removed = Vec::with_capacity(doomed.len());
        for id in doomed {
            match world.despawn(id) {
                Ok(record) => {
                    debug!("Culled {} {:?}", record.category.label(), id);
                    removed.push(id);
                }
                Err(e) => warn!("Failed to cull {:?}: {}", id, e),
            }
        }
        removed
    }
}
