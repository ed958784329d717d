// Procedural platform placement
//
// Positions are tracked in world coordinates (screen y plus the scroll
// offset) so the generator never has to read back scrolled body positions.

use glam::Vec2;
use log::debug;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::core::config::{GameConfig, SurfaceWeights};
use crate::engine::physics::{EntityId, PhysicsWorld, SurfaceKind};

/// Treadmills always push at least this fast (px/tick)
pub const MIN_TREADMILL_SPEED: f32 = 4.0;

/// Surface kinds in the order their weights are listed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceChoice {
    Platform,
    Treadmill,
    Spring,
    Spike,
}

impl SurfaceChoice {
    const ALL: [SurfaceChoice; 4] = [
        SurfaceChoice::Platform,
        SurfaceChoice::Treadmill,
        SurfaceChoice::Spring,
        SurfaceChoice::Spike,
    ];

    fn weight(&self, weights: &SurfaceWeights) -> u32 {
        match self {
            Self::Platform => weights.platform,
            Self::Treadmill => weights.treadmill,
            Self::Spring => weights.spring,
            Self::Spike => weights.spike,
        }
    }
}

/// Apply the minimum push magnitude while keeping the direction
pub fn effective_treadmill_speed(speed: f32) -> f32 {
    if speed >= 0.0 {
        speed.max(MIN_TREADMILL_SPEED)
    } else {
        speed.min(-MIN_TREADMILL_SPEED)
    }
}

/// Spawns platform-family bodies ahead of the scroll front
#[derive(Debug)]
pub struct PlatformGenerator {
    rng: Pcg32,
    /// World y of the lowest platform placed so far
    lowest_world_y: Option<f32>,
    /// Opening-screen kinds not yet placed
    missing_initial: Vec<SurfaceChoice>,
}

impl PlatformGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            lowest_world_y: None,
            missing_initial: Vec::new(),
        }
    }

    pub fn lowest_world_y(&self) -> Option<f32> {
        self.lowest_world_y
    }

    /// Lay out the opening screen: a plain platform under the player, then
    /// at least one of every allowed kind before weighted draws take over
    pub fn populate_initial(
        &mut self,
        world: &mut PhysicsWorld,
        config: &GameConfig,
        player_x: f32,
    ) -> Vec<EntityId> {
        self.missing_initial = SurfaceChoice::ALL
            .into_iter()
            .filter(|c| c.weight(&config.generator.initial_weights) > 0)
            .collect();

        let first_y = config.generator.first_platform_y;
        let x = self.clamp_x(player_x, config);
        let first = self.place(world, config, SurfaceChoice::Platform, Vec2::new(x, first_y), 0.0);
        self.missing_initial.retain(|c| *c != SurfaceChoice::Platform);

        let mut spawned = vec![first];
        spawned.extend(self.fill(world, config, 0.0, true));
        spawned
    }

    /// Spawn platforms until the lowest one is past the lookahead line
    pub fn fill(
        &mut self,
        world: &mut PhysicsWorld,
        config: &GameConfig,
        scroll_offset: f32,
        initial: bool,
    ) -> Vec<EntityId> {
        let horizon = scroll_offset + config.screen.height + config.generator.lookahead;
        let mut spawned = Vec::new();

        while let Some(lowest) = self.lowest_world_y {
            if lowest >= horizon {
                break;
            }
            let gap = self.next_gap(config);
            spawned.push(self.spawn_platform(world, config, lowest + gap, scroll_offset, initial));
        }
        spawned
    }

    /// Spawn one platform-family body at world height `world_y`
    pub fn spawn_platform(
        &mut self,
        world: &mut PhysicsWorld,
        config: &GameConfig,
        world_y: f32,
        scroll_offset: f32,
        initial: bool,
    ) -> EntityId {
        let choice = self.choose(config, initial);
        let x = self.random_x(config);
        self.place(world, config, choice, Vec2::new(x, world_y - scroll_offset), scroll_offset)
    }

    fn place(
        &mut self,
        world: &mut PhysicsWorld,
        config: &GameConfig,
        choice: SurfaceChoice,
        screen_pos: Vec2,
        scroll_offset: f32,
    ) -> EntityId {
        let kind = self.surface_kind(choice, config);
        let size = Vec2::new(config.generator.surface_width, config.generator.surface_height);
        let id = world.spawn_surface(kind, screen_pos, size);

        let world_y = screen_pos.y + scroll_offset;
        self.lowest_world_y = Some(self.lowest_world_y.map_or(world_y, |y| y.max(world_y)));
        debug!("Generated {:?} {:?} at world y {}", kind, id, world_y);
        id
    }

    /// Vertical distance to the next platform, never below the spacing floor
    fn next_gap(&mut self, config: &GameConfig) -> f32 {
        let gen = &config.generator;
        let gap = self.rng.random_range(gen.gap_min..=gen.gap_max);
        gap.max(config.spacing_floor())
    }

    fn choose(&mut self, config: &GameConfig, initial: bool) -> SurfaceChoice {
        if initial && !self.missing_initial.is_empty() {
            let index = self.rng.random_range(0..self.missing_initial.len());
            return self.missing_initial.remove(index);
        }

        let weights = if initial {
            &config.generator.initial_weights
        } else {
            &config.generator.weights
        };
        self.weighted_draw(weights)
    }

    fn weighted_draw(&mut self, weights: &SurfaceWeights) -> SurfaceChoice {
        let table = SurfaceChoice::ALL.map(|c| c.weight(weights));
        match WeightedIndex::new(table) {
            Ok(dist) => SurfaceChoice::ALL[dist.sample(&mut self.rng)],
            // Validated configs always have a positive total
            Err(_) => SurfaceChoice::Platform,
        }
    }

    fn surface_kind(&mut self, choice: SurfaceChoice, config: &GameConfig) -> SurfaceKind {
        let gen = &config.generator;
        match choice {
            SurfaceChoice::Platform => SurfaceKind::Plain,
            SurfaceChoice::Spring => SurfaceKind::Spring {
                bounce: gen.spring_bounce,
            },
            SurfaceChoice::Spike => SurfaceKind::Spike {
                damage: gen.spike_damage,
            },
            SurfaceChoice::Treadmill => {
                let direction = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
                SurfaceKind::Treadmill {
                    speed: effective_treadmill_speed(direction * gen.treadmill_speed),
                }
            }
        }
    }

    fn x_range(config: &GameConfig) -> (f32, f32) {
        let half = config.generator.surface_width / 2.0;
        let wall = config.screen.boundary_thickness / 2.0;
        (half + wall, config.screen.width - half - wall)
    }

    fn random_x(&mut self, config: &GameConfig) -> f32 {
        let (min, max) = Self::x_range(config);
        self.rng.random_range(min..=max)
    }

    fn clamp_x(&self, x: f32, config: &GameConfig) -> f32 {
        let (min, max) = Self::x_range(config);
        x.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::Category;

    fn surfaces_by_y(world: &PhysicsWorld) -> Vec<(f32, Category)> {
        let mut out: Vec<_> = world
            .registry()
            .surfaces()
            .map(|r| (world.position(r.id).unwrap().y, r.category))
            .collect();
        out.sort_by(|a, b| a.0.total_cmp(&b.0));
        out
    }

    #[test]
    fn test_initial_batch_covers_screen_and_kinds() {
        let config = GameConfig::default();
        let mut world = PhysicsWorld::new(0.5);
        let mut generator = PlatformGenerator::new(7);
        generator.populate_initial(&mut world, &config, 195.0);

        let surfaces = surfaces_by_y(&world);
        assert_eq!(surfaces[0].1, Category::Platform);
        assert!(surfaces.iter().all(|(_, c)| *c != Category::Spike));
        assert!(surfaces.iter().any(|(_, c)| *c == Category::Treadmill));
        assert!(surfaces.iter().any(|(_, c)| *c == Category::Spring));

        let lowest = generator.lowest_world_y().unwrap();
        assert!(lowest >= config.screen.height + config.generator.lookahead);
    }

    #[test]
    fn test_gaps_respect_spacing_floor() {
        let mut config = GameConfig::default();
        // Configured range below the player-height floor
        config.generator.gap_min = 10.0;
        config.generator.gap_max = 60.0;
        let floor = config.spacing_floor();

        let mut world = PhysicsWorld::new(0.5);
        let mut generator = PlatformGenerator::new(3);
        generator.populate_initial(&mut world, &config, 195.0);

        let initial = surfaces_by_y(&world);
        assert!(initial.len() > 10);
        for pair in initial.windows(2) {
            assert!(pair[1].0 - pair[0].0 >= floor - 1e-3);
        }

        // Later spawns, compared in world coordinates
        let offset = 2000.0;
        let mut previous = generator.lowest_world_y().unwrap();
        for id in generator.fill(&mut world, &config, offset, false) {
            let world_y = world.position(id).unwrap().y + offset;
            assert!(world_y - previous >= floor - 1e-3);
            previous = world_y;
        }
    }

    #[test]
    fn test_fill_is_noop_before_scrolling() {
        let config = GameConfig::default();
        let mut world = PhysicsWorld::new(0.5);
        let mut generator = PlatformGenerator::new(11);
        generator.populate_initial(&mut world, &config, 195.0);

        assert!(generator.fill(&mut world, &config, 0.0, false).is_empty());
        assert!(!generator.fill(&mut world, &config, 500.0, false).is_empty());
    }

    #[test]
    fn test_x_within_walls() {
        let config = GameConfig::default();
        let mut world = PhysicsWorld::new(0.5);
        let mut generator = PlatformGenerator::new(5);
        generator.populate_initial(&mut world, &config, 195.0);
        generator.fill(&mut world, &config, 3000.0, false);

        for record in world.registry().surfaces() {
            let x = world.position(record.id).unwrap().x;
            assert!(x >= 60.0 && x <= 330.0);
        }
    }

    #[test]
    fn test_treadmill_speed_floor() {
        assert_eq!(effective_treadmill_speed(1.0), 4.0);
        assert_eq!(effective_treadmill_speed(-2.0), -4.0);
        assert_eq!(effective_treadmill_speed(6.0), 6.0);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let config = GameConfig::default();
        let layout = |seed| {
            let mut world = PhysicsWorld::new(0.5);
            let mut generator = PlatformGenerator::new(seed);
            generator.populate_initial(&mut world, &config, 195.0);
            surfaces_by_y(&world)
        };
        assert_eq!(layout(42), layout(42));
    }
}
