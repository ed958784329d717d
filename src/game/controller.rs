// Game-state controller: owns every subsystem and runs them once per tick
//
// Tick order while playing:
//   clock -> scroll + cull -> fireballs -> generator -> movement
//         -> contact resolution -> physics step -> out-of-bounds check

use glam::Vec2;
use log::{debug, info, trace, warn};
use parry2d::bounding_volume::Aabb;

use crate::core::config::GameConfig;
use crate::core::error::{GameError, GameResult};
use crate::core::math::aabb_from_center;
use crate::engine::game_loop::GameLoop;
use crate::engine::input::{Action, InputEvent, PlayerInput};
use crate::engine::physics::{BoundarySide, EntityId, PhysicsWorld};

use super::generator::PlatformGenerator;
use super::navigation::{NavParams, Navigator, Screen};
use super::player::{Player, PlayerToken};
use super::projectile::{ProjectileImpact, ProjectileSpawner};
use super::resolver::{CollisionResolver, ContactReport, SurfaceEffect};
use super::scroll::ScrollManager;
use super::session::{GameOverReason, GamePhase, SessionState};

/// Terminal notification raised once when the session ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameOverNotice {
    pub final_score: u32,
    pub reason: GameOverReason,
}

/// Result of one call to [`GameController::tick`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Running { score: u32, lives: u8 },
    /// Pipeline skipped because the session is paused or already over
    Skipped(GamePhase),
    /// The session ended during this tick
    GameOver(GameOverNotice),
}

/// One play session, from spawn to game over
pub struct GameController {
    config: GameConfig,
    world: PhysicsWorld,
    player: Player,
    session: SessionState,
    clock: GameLoop,
    input: PlayerInput,
    scroll: ScrollManager,
    generator: PlatformGenerator,
    projectiles: ProjectileSpawner,
    resolver: CollisionResolver,
    notice: Option<GameOverNotice>,
}

impl GameController {
    /// Build a fresh session: walls, player and the opening platforms
    pub fn new(config: GameConfig, token: PlayerToken) -> GameResult<Self> {
        config.validate()?;

        let mut world = PhysicsWorld::new(config.physics.gravity);
        spawn_walls(&mut world, &config);

        let (spawn_x, spawn_y) = config.player_spawn();
        let player = Player::spawn(&mut world, token, Vec2::new(spawn_x, spawn_y), &config.player);

        let seed = config.session.seed;
        let mut generator = PlatformGenerator::new(seed);
        let opening = generator.populate_initial(&mut world, &config, spawn_x);
        info!(
            "Session started for '{}' with {} opening platforms (seed {:#x})",
            player.token,
            opening.len(),
            seed
        );

        Ok(Self {
            session: SessionState::new(&config.session),
            clock: GameLoop::new(config.physics.tick_ms, config.physics.max_frame_ms),
            input: PlayerInput::new(),
            scroll: ScrollManager::new(),
            generator,
            projectiles: ProjectileSpawner::new(seed.wrapping_add(1)),
            resolver: CollisionResolver::new(seed.wrapping_add(2)),
            notice: None,
            config,
            world,
            player,
        })
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn projectiles(&self) -> &ProjectileSpawner {
        &self.projectiles
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll.offset()
    }

    /// Frame clock, including paused frames
    pub fn clock(&self) -> &GameLoop {
        &self.clock
    }

    pub fn notice(&self) -> Option<GameOverNotice> {
        self.notice
    }

    /// Feed one host input event; a pause press toggles the session
    pub fn handle_input(&mut self, event: InputEvent) {
        if event == InputEvent::Press(Action::Pause) {
            self.session.toggle_pause();
        }
        self.input.handle(event);
    }

    /// Run one frame of simulation
    pub fn tick(&mut self, raw_delta_ms: f64) -> GameResult<TickOutcome> {
        let delta_ms = self.clock.begin_frame(raw_delta_ms);

        if !self.session.phase().is_running() {
            self.input.update();
            return Ok(TickOutcome::Skipped(self.session.phase()));
        }

        if self.world.record(self.player.id).is_none() {
            warn!("Player body missing, skipping tick");
            return Err(GameError::PlayerMissing);
        }

        let dt_ticks = self.clock.ticks(delta_ms);
        let now = self.session.advance_clock(delta_ms);

        // Scroll the world and drop whatever left the screen
        self.scroll.advance(&mut self.world, &self.config.scroll, dt_ticks)?;
        let culled = self.scroll.cull_offscreen(&mut self.world, &self.config);
        self.resolver.forget(&culled);

        self.update_projectiles(now, dt_ticks)?;

        let fresh = self
            .generator
            .fill(&mut self.world, &self.config, self.scroll.offset(), false);
        if !fresh.is_empty() {
            trace!(
                "Generated {} surfaces, lowest at world y {:?}",
                fresh.len(),
                self.generator.lowest_world_y()
            );
        }

        let intent = self.input.move_intent();
        self.player
            .apply_movement(&mut self.world, intent, &self.config.player)?;

        let events = self.world.drain_contact_events();
        let report = self.resolver.resolve(
            &mut self.world,
            &mut self.player,
            &mut self.session,
            &self.config,
            &events,
        )?;
        log_contacts(&report);

        if !self.session.is_over() {
            self.world.step(dt_ticks);
            self.check_out_of_bounds()?;
        }
        self.input.update();

        if self.session.is_over() {
            return Ok(TickOutcome::GameOver(self.finish()));
        }

        Ok(TickOutcome::Running {
            score: self.session.score(),
            lives: self.session.lives(),
        })
    }

    /// Spawn, move and collide fireballs; player hits go through the resolver
    fn update_projectiles(&mut self, now_ms: f64, dt_ticks: f32) -> GameResult<()> {
        self.projectiles.try_spawn(now_ms, &self.config);

        let player_box = self.player.aabb(&self.world)?;
        let surfaces = self.surface_boxes();
        let impacts = self.projectiles.update(
            dt_ticks,
            self.config.screen.height,
            &player_box,
            &surfaces,
        );

        for impact in impacts {
            if let ProjectileImpact::HitPlayer { projectile } = impact {
                let damaged = self.resolver.apply_projectile_hit(
                    &mut self.world,
                    &mut self.player,
                    &mut self.session,
                    &self.config,
                )?;
                info!("Fireball {} hit the player (damaged: {})", projectile, damaged);
            }
        }
        Ok(())
    }

    fn surface_boxes(&self) -> Vec<(EntityId, Aabb)> {
        self.world
            .registry()
            .surfaces()
            .filter_map(|record| {
                let pos = self.world.position(record.id).ok()?;
                Some((record.id, aabb_from_center(pos, record.half_extents)))
            })
            .collect()
    }

    /// The player's centre left the vertical play range by more than half its height
    fn check_out_of_bounds(&mut self) -> GameResult<()> {
        let y = self.player.position(&self.world)?.y;
        let margin = self.player.half_extents().y;

        if y < -margin || y > self.config.screen.height + margin {
            info!("Player left the screen at y {}", y);
            self.session.end(GameOverReason::FellOut);
        }
        Ok(())
    }

    /// Capture the terminal notice once; later calls return the same notice
    fn finish(&mut self) -> GameOverNotice {
        let session = &self.session;
        *self.notice.get_or_insert_with(|| GameOverNotice {
            final_score: session.score(),
            reason: session
                .game_over_reason()
                .unwrap_or(GameOverReason::OutOfLives),
        })
    }

    /// Leave the session for the selection screen (the only game-over action)
    pub fn exit_to_selection(&self, nav: &mut dyn Navigator) {
        nav.navigate_to(
            Screen::Selection,
            NavParams::with_player(self.player.token.clone()),
        );
    }

    /// Back navigation from the game screen
    pub fn go_back(&self, nav: &mut dyn Navigator) {
        nav.navigate_to(Screen::Game.back(), NavParams::default());
    }
}

/// Top, left and right walls; all screen-fixed
fn spawn_walls(world: &mut PhysicsWorld, config: &GameConfig) {
    let (width, height) = (config.screen.width, config.screen.height);
    let thickness = config.screen.boundary_thickness;

    world.spawn_boundary(
        BoundarySide::Top,
        Vec2::new(width / 2.0, 0.0),
        Vec2::new(width, thickness),
    );
    world.spawn_boundary(
        BoundarySide::Left,
        Vec2::new(0.0, height / 2.0),
        Vec2::new(thickness, height),
    );
    world.spawn_boundary(
        BoundarySide::Right,
        Vec2::new(width, height / 2.0),
        Vec2::new(thickness, height),
    );
}

fn log_contacts(report: &ContactReport) {
    for effect in &report.effects {
        match *effect {
            SurfaceEffect::Landed { surface, healed } => {
                trace!("Standing on {:?} (healed: {})", surface, healed)
            }
            SurfaceEffect::Bounced { surface, healed } => {
                debug!("Bounced off {:?} (healed: {})", surface, healed)
            }
            SurfaceEffect::Spiked { surface, damaged } => {
                debug!("On spikes {:?} (damaged: {})", surface, damaged)
            }
            SurfaceEffect::Pushed { surface, push } => trace!("Treadmill {:?} pushed {}", surface, push),
        }
    }
    if report.hit_top {
        debug!("Player hit the ceiling");
    }
    if let Some(side) = report.hit_side {
        trace!("Player held off the {:?} wall", side);
    }
    if !report.unconfirmed.is_empty() {
        trace!("Event contacts without geometric support: {:?}", report.unconfirmed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::game_loop::TICK_MS;
    use crate::engine::physics::Category;
    use crate::game::navigation::ScreenStack;

    /// No gravity, no scrolling, no fireballs: nothing touches the player
    fn still_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.physics.gravity = 0.0;
        config.scroll.speed = 0.0;
        config.projectile.enabled = false;
        config
    }

    fn controller(config: GameConfig) -> GameController {
        GameController::new(config, PlayerToken::default()).unwrap()
    }

    fn positions(game: &GameController) -> Vec<(EntityId, Vec2)> {
        game.world()
            .registry()
            .iter()
            .map(|r| (r.id, game.world().position(r.id).unwrap()))
            .collect()
    }

    fn walls(game: &GameController) -> Vec<EntityId> {
        game.world()
            .registry()
            .iter()
            .filter(|r| matches!(r.category, Category::Boundary(_)))
            .map(|r| r.id)
            .collect()
    }

    #[test]
    fn test_new_session_layout() {
        let game = controller(GameConfig::default());

        assert_eq!(walls(&game).len(), 3);
        assert_eq!(game.session().lives(), 10);
        assert_eq!(game.session().score(), 0);
        assert_eq!(game.session().phase(), GamePhase::Playing);
        assert!(game.world().registry().surfaces().count() > 5);

        let spawn = game.player().position(game.world()).unwrap();
        assert_eq!(spawn, Vec2::new(195.0, 150.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GameConfig::default();
        config.generator.gap_min = 200.0;
        assert!(matches!(
            GameController::new(config, PlayerToken::default()),
            Err(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_score_after_five_seconds() {
        let mut game = controller(still_config());

        for _ in 0..300 {
            game.tick(TICK_MS).unwrap();
        }

        assert_eq!(game.session().score(), 5);
        assert_eq!(game.session().lives(), 10);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut game = controller(still_config());
        game.tick(1000.0).unwrap();
        assert_eq!(game.session().score(), 0);
        assert!((game.session().now_ms() - TICK_MS).abs() < 1e-9);
    }

    #[test]
    fn test_pause_skips_pipeline() {
        let mut game = controller(GameConfig::default());
        game.tick(TICK_MS).unwrap();

        game.handle_input(InputEvent::Press(Action::Pause));
        let before = positions(&game);
        let score = game.session().score();

        for _ in 0..100 {
            assert_eq!(game.tick(TICK_MS).unwrap(), TickOutcome::Skipped(GamePhase::Paused));
        }
        assert_eq!(positions(&game), before);
        assert_eq!(game.session().score(), score);

        game.handle_input(InputEvent::Release(Action::Pause));
        game.handle_input(InputEvent::Press(Action::Pause));
        assert!(matches!(game.tick(TICK_MS).unwrap(), TickOutcome::Running { .. }));
    }

    #[test]
    fn test_falling_out_ends_game_once() {
        let mut config = GameConfig::default();
        config.scroll.speed = 0.0;
        config.projectile.enabled = false;
        let mut game = controller(config);

        for _ in 0..120 {
            game.tick(TICK_MS).unwrap();
        }
        assert_eq!(game.session().score(), 2);

        let id = game.player().id;
        game.world_mut()
            .set_position(id, Vec2::new(195.0, 844.0 + 100.0))
            .unwrap();

        let outcome = game.tick(TICK_MS).unwrap();
        let expected = GameOverNotice {
            final_score: 2,
            reason: GameOverReason::FellOut,
        };
        assert_eq!(outcome, TickOutcome::GameOver(expected));
        assert_eq!(game.notice(), Some(expected));

        // Later ticks neither re-notify nor change anything
        let before = positions(&game);
        for _ in 0..120 {
            assert_eq!(game.tick(TICK_MS).unwrap(), TickOutcome::Skipped(GamePhase::GameOver));
        }
        assert_eq!(positions(&game), before);
        assert_eq!(game.session().score(), 2);
        assert_eq!(game.notice(), Some(expected));
    }

    #[test]
    fn test_rising_out_of_screen_ends_game() {
        let mut game = controller(still_config());
        let id = game.player().id;
        game.world_mut().set_position(id, Vec2::new(195.0, -25.0)).unwrap();

        assert!(matches!(game.tick(TICK_MS).unwrap(), TickOutcome::GameOver(_)));
    }

    #[test]
    fn test_missing_player_is_an_error() {
        let mut game = controller(still_config());
        let id = game.player().id;
        game.world_mut().despawn(id).unwrap();

        assert!(matches!(game.tick(TICK_MS), Err(GameError::PlayerMissing)));
    }

    #[test]
    fn test_scrolling_keeps_walls_and_player_in_place() {
        let mut config = GameConfig::default();
        config.physics.gravity = 0.0;
        config.projectile.enabled = false;
        let mut game = controller(config);
        let walls_before: Vec<Vec2> = walls(&game)
            .iter()
            .map(|id| game.world().position(*id).unwrap())
            .collect();

        for _ in 0..60 {
            game.tick(TICK_MS).unwrap();
        }

        let walls_after: Vec<Vec2> = walls(&game)
            .iter()
            .map(|id| game.world().position(*id).unwrap())
            .collect();
        assert_eq!(walls_before, walls_after);
        assert!(game.scroll_offset() > 100.0);
        // New platforms keep arriving from below
        assert!(game.world().registry().surfaces().count() > 5);
    }

    #[test]
    fn test_hold_moves_player_sideways() {
        let mut game = controller(still_config());
        game.handle_input(InputEvent::Press(Action::MoveRight));
        game.tick(TICK_MS).unwrap();
        let after_step = game.player().position(game.world()).unwrap().x;
        assert!(after_step > 195.0);

        for _ in 0..10 {
            game.tick(TICK_MS).unwrap();
        }
        let after_hold = game.player().position(game.world()).unwrap().x;
        assert!(after_hold - after_step > 40.0);
    }

    #[test]
    fn test_navigation_targets() {
        let game = controller(still_config());
        let mut nav = ScreenStack::new();

        game.exit_to_selection(&mut nav);
        game.go_back(&mut nav);

        let history = nav.history();
        assert_eq!(history[0].0, Screen::Selection);
        assert_eq!(
            history[0].1.selected_player,
            Some(PlayerToken::new("player1"))
        );
        assert_eq!(history[1].0, Screen::Selection);
    }

    #[test]
    fn test_idle_player_never_leaves_through_ceiling() {
        let config = GameConfig::default();
        let half_height = config.player.height / 2.0;
        let mut game = controller(config);

        // Long enough for the opening platform to carry the player to the top
        for frame in 0..900 {
            match game.tick(TICK_MS).unwrap() {
                TickOutcome::Running { .. } => {
                    let y = game.player().position(game.world()).unwrap().y;
                    assert!(y > -half_height, "frame {}: player at y {}", frame, y);
                }
                TickOutcome::GameOver(notice) => {
                    if notice.reason == GameOverReason::FellOut {
                        let y = game.player().position(game.world()).unwrap().y;
                        assert!(y > 844.0, "frame {}: left through the top at y {}", frame, y);
                    }
                    break;
                }
                TickOutcome::Skipped(phase) => panic!("unexpected skip in {:?}", phase),
            }
        }
    }

    #[test]
    fn test_platforms_stay_within_gap_of_each_other() {
        let mut config = GameConfig::default();
        config.projectile.enabled = false;
        let max_gap = config.generator.gap_max.max(config.spacing_floor());
        let mut game = controller(config);

        for frame in 0..600 {
            if !matches!(game.tick(TICK_MS).unwrap(), TickOutcome::Running { .. }) {
                break;
            }
            if frame % 20 != 0 {
                continue;
            }

            let mut ys: Vec<f32> = game
                .world()
                .registry()
                .surfaces()
                .map(|r| game.world().position(r.id).unwrap().y)
                .collect();
            ys.sort_by(f32::total_cmp);

            // Something is always waiting below the bottom edge
            assert!(ys.last().is_some_and(|y| *y > 844.0), "frame {}", frame);
            for pair in ys.windows(2) {
                assert!(
                    pair[1] - pair[0] <= max_gap + 0.5,
                    "frame {}: {} px between platforms",
                    frame,
                    pair[1] - pair[0]
                );
            }
        }
    }
}
