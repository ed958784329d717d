// Player entity: the body handle plus the status flags the resolver reads and writes

use std::fmt;

use glam::Vec2;
use parry2d::bounding_volume::Aabb;

use crate::core::config::PlayerConfig;
use crate::core::error::{GameError, GameResult};
use crate::core::math::aabb_from_center;
use crate::engine::input::MoveIntent;
use crate::engine::physics::{EntityId, PhysicsWorld};

/// Identifier of the warrior picked on the selection screen
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerToken(String);

impl PlayerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl Default for PlayerToken {
    fn default() -> Self {
        Self::new("player1")
    }
}

impl fmt::Display for PlayerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transient contact and cooldown state for the player
#[derive(Debug, Clone, Default)]
pub struct PlayerStatus {
    /// Set by spike contact; clears after `spike_ticks` ticks without contact
    pub touching_spike: bool,
    spike_ticks: u32,
    /// Treadmill currently under the player (non-owning)
    pub current_treadmill: Option<EntityId>,
    /// Last surface that granted (or could have granted) a landing heal
    pub last_platform: Option<EntityId>,
    pub last_damage_ms: Option<f64>,
    pub last_heal_ms: Option<f64>,
    /// Standing on any surface as of the last contact pass
    pub grounded: bool,
}

impl PlayerStatus {
    pub fn damage_ready(&self, now_ms: f64, cooldown_ms: f64) -> bool {
        cooldown_elapsed(self.last_damage_ms, now_ms, cooldown_ms)
    }

    pub fn heal_ready(&self, now_ms: f64, cooldown_ms: f64) -> bool {
        cooldown_elapsed(self.last_heal_ms, now_ms, cooldown_ms)
    }

    /// Flag spike contact for the next `ticks` ticks
    pub fn mark_spike_contact(&mut self, ticks: u32) {
        self.touching_spike = true;
        self.spike_ticks = ticks;
    }

    /// Count down the spike flag by one tick
    pub fn decay_spike_contact(&mut self) {
        if self.spike_ticks > 0 {
            self.spike_ticks -= 1;
        }
        if self.spike_ticks == 0 {
            self.touching_spike = false;
        }
    }

    /// Forget every surface contact
    pub fn clear_support(&mut self) {
        self.current_treadmill = None;
        self.last_platform = None;
        self.grounded = false;
    }
}

fn cooldown_elapsed(last_ms: Option<f64>, now_ms: f64, cooldown_ms: f64) -> bool {
    match last_ms {
        Some(last) => now_ms - last >= cooldown_ms,
        None => true,
    }
}

/// The single player-controlled body
#[derive(Debug)]
pub struct Player {
    pub id: EntityId,
    pub token: PlayerToken,
    pub size: Vec2,
    pub status: PlayerStatus,
}

impl Player {
    /// Create the player body at its spawn point
    pub fn spawn(world: &mut PhysicsWorld, token: PlayerToken, spawn: Vec2, config: &PlayerConfig) -> Self {
        let size = Vec2::new(config.width, config.height);
        let id = world.spawn_player(spawn, size);
        log::info!("Spawned player '{}' at ({}, {})", token, spawn.x, spawn.y);

        Self {
            id,
            token,
            size,
            status: PlayerStatus::default(),
        }
    }

    pub fn half_extents(&self) -> Vec2 {
        self.size / 2.0
    }

    pub fn position(&self, world: &PhysicsWorld) -> GameResult<Vec2> {
        world.position(self.id).map_err(|_| GameError::PlayerMissing)
    }

    pub fn velocity(&self, world: &PhysicsWorld) -> GameResult<Vec2> {
        world.velocity(self.id).map_err(|_| GameError::PlayerMissing)
    }

    pub fn set_velocity(&self, world: &mut PhysicsWorld, velocity: Vec2) -> GameResult<()> {
        world
            .set_velocity(self.id, velocity)
            .map_err(|_| GameError::PlayerMissing)
    }

    pub fn set_position(&self, world: &mut PhysicsWorld, position: Vec2) -> GameResult<()> {
        world
            .set_position(self.id, position)
            .map_err(|_| GameError::PlayerMissing)
    }

    /// Current bounding box
    pub fn aabb(&self, world: &PhysicsWorld) -> GameResult<Aabb> {
        Ok(aabb_from_center(self.position(world)?, self.half_extents()))
    }

    /// Turn this tick's input into horizontal velocity
    ///
    /// With no input the player stops while standing and keeps drifting in
    /// the air; surface effects are layered on later by the resolver.
    pub fn apply_movement(
        &self,
        world: &mut PhysicsWorld,
        intent: MoveIntent,
        config: &PlayerConfig,
    ) -> GameResult<()> {
        let mut velocity = self.velocity(world)?;

        match intent {
            MoveIntent::Step(direction) => velocity.x = direction * config.press_step,
            MoveIntent::Hold(direction) => velocity.x = direction * config.move_speed,
            MoveIntent::Idle if self.status.grounded => velocity.x = 0.0,
            MoveIntent::Idle => {}
        }

        self.set_velocity(world, velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spawn() -> (PhysicsWorld, Player) {
        let mut world = PhysicsWorld::new(0.5);
        let player = Player::spawn(
            &mut world,
            PlayerToken::new("player2"),
            Vec2::new(195.0, 150.0),
            &PlayerConfig::default(),
        );
        (world, player)
    }

    #[test]
    fn test_cooldowns() {
        let mut status = PlayerStatus::default();
        assert!(status.damage_ready(0.0, 1000.0));

        status.last_damage_ms = Some(500.0);
        assert!(!status.damage_ready(1200.0, 1000.0));
        assert!(status.damage_ready(1500.0, 1000.0));
        // Healing runs on its own clock
        assert!(status.heal_ready(600.0, 800.0));
    }

    #[test]
    fn test_spike_flag_expires_after_ticks() {
        let mut status = PlayerStatus::default();
        status.mark_spike_contact(2);
        status.decay_spike_contact();
        assert!(status.touching_spike);
        status.decay_spike_contact();
        assert!(!status.touching_spike);
    }

    #[test]
    fn test_player_aabb() {
        let (world, player) = spawn();
        let aabb = player.aabb(&world).unwrap();
        assert_relative_eq!(aabb.mins.x, 175.0);
        assert_relative_eq!(aabb.maxs.y, 170.0);
        assert_eq!(player.token, PlayerToken::new("player2"));
    }

    #[test]
    fn test_step_then_hold_movement() {
        let (mut world, player) = spawn();
        let config = PlayerConfig::default();

        player.apply_movement(&mut world, MoveIntent::Step(-1.0), &config).unwrap();
        assert_relative_eq!(player.velocity(&world).unwrap().x, -3.0);

        player.apply_movement(&mut world, MoveIntent::Hold(1.0), &config).unwrap();
        assert_relative_eq!(player.velocity(&world).unwrap().x, 5.0);
    }

    #[test]
    fn test_idle_stops_only_when_grounded() {
        let (mut world, mut player) = spawn();
        let config = PlayerConfig::default();
        player.set_velocity(&mut world, Vec2::new(4.0, 0.0)).unwrap();

        player.apply_movement(&mut world, MoveIntent::Idle, &config).unwrap();
        assert_relative_eq!(player.velocity(&world).unwrap().x, 4.0);

        player.status.grounded = true;
        player.apply_movement(&mut world, MoveIntent::Idle, &config).unwrap();
        assert_relative_eq!(player.velocity(&world).unwrap().x, 0.0);
    }

    #[test]
    fn test_missing_body_reports_player_missing() {
        let (mut world, player) = spawn();
        world.despawn(player.id).unwrap();
        assert!(matches!(player.position(&world), Err(GameError::PlayerMissing)));
    }
}
