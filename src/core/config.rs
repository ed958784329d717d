// Simulation tuning - every magic number the gameplay systems use lives here
//
// Units: pixels for distances, pixels per tick for velocities (one tick is
// 16.667 ms), milliseconds for cooldowns and intervals. Screen y grows
// downward, so "up" is negative.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{GameError, GameResult};

/// Visible play-field dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
    /// Thickness of the top/left/right walls
    pub boundary_thickness: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 390.0,
            height: 844.0,
            boundary_thickness: 20.0,
        }
    }
}

/// Engine integration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration (px/tick²)
    pub gravity: f32,
    /// Length of one nominal tick in milliseconds
    pub tick_ms: f64,
    /// Upper bound applied to every host frame delta
    pub max_frame_ms: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            tick_ms: 16.667,
            max_frame_ms: 16.667,
        }
    }
}

/// Player body and movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    /// Spawn x; `None` centres the player horizontally
    pub spawn_x: Option<f32>,
    pub spawn_y: f32,
    /// Horizontal speed while a direction is held (px/tick)
    pub move_speed: f32,
    /// Horizontal speed for the single tick following a press (px/tick)
    pub press_step: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 40.0,
            spawn_x: None,
            spawn_y: 150.0,
            move_speed: 5.0,
            press_step: 3.0,
        }
    }
}

/// World scrolling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Per-tick translation applied to world bodies (negative scrolls up)
    pub speed: f32,
    /// How far past the screen edge a body may travel before removal
    pub offscreen_margin: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            speed: -1.8,
            offscreen_margin: 50.0,
        }
    }
}

/// Relative odds of each surface kind in a weighted draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceWeights {
    pub platform: u32,
    pub treadmill: u32,
    pub spring: u32,
    pub spike: u32,
}

impl SurfaceWeights {
    pub fn total(&self) -> u32 {
        self.platform + self.treadmill + self.spring + self.spike
    }
}

impl Default for SurfaceWeights {
    fn default() -> Self {
        Self {
            platform: 40,
            treadmill: 25,
            spring: 20,
            spike: 15,
        }
    }
}

/// Procedural platform placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub surface_width: f32,
    pub surface_height: f32,
    pub gap_min: f32,
    pub gap_max: f32,
    /// Platforms are generated until this far below the bottom edge
    pub lookahead: f32,
    /// Screen y of the first platform, placed under the player spawn
    pub first_platform_y: f32,
    /// Multiple of the player height no gap may fall below
    pub spacing_floor_factor: f32,
    pub weights: SurfaceWeights,
    /// Weights for the opening screen (spikes excluded)
    pub initial_weights: SurfaceWeights,
    /// Upward velocity a spring imparts (px/tick, negative is up)
    pub spring_bounce: f32,
    pub spike_damage: u8,
    /// Minimum treadmill push speed magnitude (px/tick)
    pub treadmill_speed: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            surface_width: 100.0,
            surface_height: 20.0,
            gap_min: 70.0,
            gap_max: 120.0,
            lookahead: 200.0,
            first_platform_y: 260.0,
            spacing_floor_factor: 1.2,
            weights: SurfaceWeights::default(),
            initial_weights: SurfaceWeights {
                platform: 60,
                treadmill: 20,
                spring: 20,
                spike: 0,
            },
            spring_bounce: -8.0,
            spike_damage: 2,
            treadmill_speed: 4.0,
        }
    }
}

/// Falling fireballs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub enabled: bool,
    pub spawn_interval_ms: f64,
    /// Side length of the square hit box
    pub size: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Horizontal inset from each wall for spawn positions
    pub spawn_margin: f32,
    /// Screen y at which fireballs appear
    pub spawn_y: f32,
    pub damage: u8,
    /// Upward velocity given to the player on a hit (px/tick, negative is up)
    pub hit_nudge: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_interval_ms: 2000.0,
            size: 30.0,
            min_speed: 3.0,
            max_speed: 6.0,
            spawn_margin: 30.0,
            spawn_y: 40.0,
            damage: 1,
            hit_nudge: -2.0,
        }
    }
}

/// Contact response tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Largest player-to-surface gap still counted as standing on it
    pub contact_gap: f32,
    /// Overlap ratio needed for plain platforms and treadmills
    pub support_overlap: f32,
    /// Overlap ratio needed for springs and spikes
    pub hazard_overlap: f32,
    pub damage_cooldown_ms: f64,
    pub heal_cooldown_ms: f64,
    pub spring_heal_cooldown_ms: f64,
    pub treadmill_push_factor: f32,
    /// Max random horizontal kick from a spring (px/tick)
    pub spring_jitter: f32,
    /// Ticks a spike contact stays flagged without renewed contact
    pub spike_contact_ticks: u32,
    pub top_boundary_damage: u8,
    /// Downward velocity applied after touching the top wall
    pub top_boundary_push: f32,
    pub side_boundary_damage: u8,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            contact_gap: 8.0,
            support_overlap: 0.5,
            hazard_overlap: 0.3,
            damage_cooldown_ms: 1000.0,
            heal_cooldown_ms: 1000.0,
            spring_heal_cooldown_ms: 800.0,
            treadmill_push_factor: 0.3,
            spring_jitter: 1.0,
            spike_contact_ticks: 6,
            top_boundary_damage: 1,
            top_boundary_push: 2.0,
            side_boundary_damage: 0,
        }
    }
}

/// Lives, scoring and RNG seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_lives: u8,
    pub starting_lives: u8,
    /// One point is awarded per interval of unpaused play
    pub score_interval_ms: f64,
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_lives: 10,
            starting_lives: 10,
            score_interval_ms: 1000.0,
            seed: 0x5eed_1ce,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub scroll: ScrollConfig,
    pub generator: GeneratorConfig,
    pub projectile: ProjectileConfig,
    pub resolver: ResolverConfig,
    pub session: SessionConfig,
}

impl GameConfig {
    /// Parse a config from JSON; missing fields fall back to defaults
    pub fn from_json_str(json: &str) -> GameResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| GameError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Player spawn point in screen coordinates
    pub fn player_spawn(&self) -> (f32, f32) {
        let x = self.player.spawn_x.unwrap_or(self.screen.width / 2.0);
        (x, self.player.spawn_y)
    }

    /// Smallest vertical distance allowed between consecutive platforms
    pub fn spacing_floor(&self) -> f32 {
        self.generator
            .gap_min
            .max(self.player.height * self.generator.spacing_floor_factor)
    }

    /// Screen-y band outside which world bodies are culled
    ///
    /// The lower edge sits past the deepest point the generator can place a
    /// platform: one full gap beyond the lookahead line, plus a surface.
    pub fn cull_range(&self) -> (f32, f32) {
        let margin = self.scroll.offscreen_margin;
        let deepest_gap = self.generator.gap_max.max(self.spacing_floor());
        let max_y = self.screen.height
            + self.generator.lookahead.max(0.0)
            + deepest_gap
            + self.generator.surface_height
            + margin;
        (-margin, max_y)
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> GameResult<()> {
        let invalid = |msg: &str| Err(GameError::InvalidConfig(msg.to_string()));

        if self.screen.width <= 0.0 || self.screen.height <= 0.0 {
            return invalid("screen dimensions must be positive");
        }
        if self.player.width <= 0.0 || self.player.height <= 0.0 {
            return invalid("player dimensions must be positive");
        }
        if self.generator.surface_width <= 0.0 || self.generator.surface_height <= 0.0 {
            return invalid("surface dimensions must be positive");
        }
        if self.generator.surface_width + 2.0 * self.screen.boundary_thickness
            > self.screen.width
        {
            return invalid("surfaces do not fit between the side walls");
        }
        if self.generator.gap_min > self.generator.gap_max {
            return invalid("gap_min must not exceed gap_max");
        }
        if self.generator.gap_max <= 0.0 {
            return invalid("gap_max must be positive");
        }
        if self.generator.spacing_floor_factor < 0.0 {
            return invalid("spacing_floor_factor must not be negative");
        }
        // Generation steps down by at least this much per platform
        if self.spacing_floor() <= 0.0 {
            return invalid("platform spacing floor must be positive");
        }
        if self.generator.weights.total() == 0 || self.generator.initial_weights.total() == 0 {
            return invalid("surface weights must not all be zero");
        }
        if self.projectile.min_speed > self.projectile.max_speed {
            return invalid("projectile min_speed must not exceed max_speed");
        }
        if self.projectile.spawn_interval_ms <= 0.0 {
            return invalid("projectile spawn interval must be positive");
        }
        if self.physics.tick_ms <= 0.0 || self.physics.max_frame_ms <= 0.0 {
            return invalid("tick lengths must be positive");
        }
        if self.session.max_lives == 0 {
            return invalid("max_lives must be at least 1");
        }
        if self.session.score_interval_ms <= 0.0 {
            return invalid("score interval must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.max_lives, 10);
        assert_eq!(config.generator.weights.total(), 100);
    }

    #[test]
    fn test_spacing_floor_uses_player_height() {
        let mut config = GameConfig::default();
        config.generator.gap_min = 10.0;
        assert_relative_eq!(config.spacing_floor(), 48.0);

        config.generator.gap_min = 70.0;
        assert_relative_eq!(config.spacing_floor(), 70.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            GameConfig::from_json_str(r#"{ "scroll": { "speed": -2.5 }, "session": { "seed": 9 } }"#)
                .unwrap();
        assert_relative_eq!(config.scroll.speed, -2.5);
        assert_eq!(config.session.seed, 9);
        assert_relative_eq!(config.scroll.offscreen_margin, 50.0);
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn test_invalid_gap_range_rejected() {
        let result = GameConfig::from_json_str(r#"{ "generator": { "gap_min": 200, "gap_max": 100 } }"#);
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_gap_range_rejected() {
        let mut config = GameConfig::default();
        config.generator.gap_min = 0.0;
        config.generator.gap_max = 0.0;
        config.generator.spacing_floor_factor = 0.0;
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_negative_spacing_factor_rejected() {
        let mut config = GameConfig::default();
        config.generator.spacing_floor_factor = -1.0;
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_non_positive_spacing_floor_rejected() {
        // Positive gap_max, but a floor of max(-20, 0) = 0 would let gaps collapse
        let mut config = GameConfig::default();
        config.generator.gap_min = -20.0;
        config.generator.gap_max = 5.0;
        config.generator.spacing_floor_factor = 0.0;
        assert_eq!(config.spacing_floor(), 0.0);
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_cull_range_covers_generated_depth() {
        let config = GameConfig::default();
        let (min_y, max_y) = config.cull_range();
        assert_relative_eq!(min_y, -50.0);
        // 844 + 200 lookahead + 120 gap + 20 surface + 50 margin
        assert_relative_eq!(max_y, 1234.0);
    }

    #[test]
    fn test_zero_weights_rejected() {
        let mut config = GameConfig::default();
        config.generator.weights = SurfaceWeights {
            platform: 0,
            treadmill: 0,
            spring: 0,
            spike: 0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = GameConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn test_player_spawn_centres_by_default() {
        let config = GameConfig::default();
        let (x, y) = config.player_spawn();
        assert_relative_eq!(x, 195.0);
        assert_relative_eq!(y, 150.0);
    }
}
