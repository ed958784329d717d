// Contact resolution - the single place per tick where contacts turn into effects
//
// Two signals feed it:
// - collision start/stop events from the previous physics step, folded into
//   a contact ledger. The ledger drives wall responses and the one-shot snap
//   when the player lands on a treadmill.
// - a polling pass over every surface that recomputes gap and overlap ratio
//   from current positions. Polling is authoritative for surface effects and
//   for the spike/treadmill flags; a ledger entry polling cannot confirm has
//   no surface effect.
//
// A top wall hit skips the surface pass. The surface carrying the player up
// would otherwise cancel the downward push every tick.

use std::collections::BTreeSet;

use glam::Vec2;
use log::{debug, trace, warn};
use parry2d::bounding_volume::Aabb;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::core::config::GameConfig;
use crate::core::error::GameResult;
use crate::core::math::{aabb_from_center, aabbs_overlap, horizontal_overlap_ratio, vertical_gap};
use crate::engine::physics::{BoundarySide, Category, ContactEvent, EntityId, PhysicsWorld, SurfaceKind};

use super::player::Player;
use super::session::SessionState;

/// Gaps smaller than this are treated as resting contact
const SNAP_TOLERANCE: f32 = 0.5;

/// Clearance kept between the player and a wall or surface after a correction
const WALL_CLEARANCE: f32 = 1.0;

/// One surface effect applied during a pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEffect {
    Landed { surface: EntityId, healed: bool },
    Bounced { surface: EntityId, healed: bool },
    Spiked { surface: EntityId, damaged: bool },
    Pushed { surface: EntityId, push: f32 },
}

/// Summary of one contact pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactReport {
    pub effects: Vec<SurfaceEffect>,
    pub hit_top: bool,
    pub hit_side: Option<BoundarySide>,
    /// Surfaces touching per events but rejected by polling
    pub unconfirmed: Vec<EntityId>,
}

/// Geometry of one player/surface pair
#[derive(Debug, Clone, Copy)]
struct SurfaceContact {
    id: EntityId,
    kind: SurfaceKind,
    aabb: Aabb,
    gap: f32,
}

/// Applies per-category contact responses to the player
#[derive(Debug)]
pub struct CollisionResolver {
    rng: Pcg32,
    /// Entities the player is touching according to collision events
    ledger: BTreeSet<EntityId>,
}

impl CollisionResolver {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            ledger: BTreeSet::new(),
        }
    }

    /// Drop ledger entries for bodies that were removed
    pub fn forget(&mut self, removed: &[EntityId]) {
        for id in removed {
            self.ledger.remove(id);
        }
    }

    /// Fold collision events into the ledger
    ///
    /// Returns the treadmills the player started touching.
    pub fn ingest_events(&mut self, player: &Player, world: &PhysicsWorld, events: &[ContactEvent]) -> Vec<EntityId> {
        let mut landed_on_treadmill = Vec::new();

        for event in events {
            let Some(other) = event.partner_of(player.id) else {
                trace!("Ignoring contact event without the player: {:?}", event);
                continue;
            };
            let Some(record) = world.record(other) else {
                warn!("Contact event names unregistered entity {:?}", other);
                continue;
            };

            match event {
                ContactEvent::Began(..) => {
                    self.ledger.insert(other);
                    if record.category == Category::Treadmill {
                        landed_on_treadmill.push(other);
                    }
                }
                ContactEvent::Ended(..) => {
                    self.ledger.remove(&other);
                }
            }
        }

        landed_on_treadmill
    }

    /// Run one full contact pass: events, walls, then surfaces
    pub fn resolve(
        &mut self,
        world: &mut PhysicsWorld,
        player: &mut Player,
        session: &mut SessionState,
        config: &GameConfig,
        events: &[ContactEvent],
    ) -> GameResult<ContactReport> {
        let mut report = ContactReport::default();

        for treadmill in self.ingest_events(player, world, events) {
            self.snap_onto(world, player, treadmill)?;
        }

        self.resolve_boundaries(world, player, session, config, &mut report)?;
        if session.is_over() {
            return Ok(report);
        }

        if report.hit_top {
            drop_below_carrier(world, player, config)?;
            player.status.decay_spike_contact();
            player.status.clear_support();
            return Ok(report);
        }

        self.resolve_surfaces(world, player, session, config, &mut report)?;
        Ok(report)
    }

    /// Top wall hurts and pushes down; side walls push back inside
    fn resolve_boundaries(
        &mut self,
        world: &mut PhysicsWorld,
        player: &mut Player,
        session: &mut SessionState,
        config: &GameConfig,
        report: &mut ContactReport,
    ) -> GameResult<()> {
        let now = session.now_ms();
        let rules = &config.resolver;
        let player_box = player.aabb(world)?;

        let mut sides: Vec<BoundarySide> = world
            .registry()
            .iter()
            .filter_map(|r| match r.category {
                Category::Boundary(side) => Some((r, side)),
                _ => None,
            })
            .filter(|(r, _)| {
                self.ledger.contains(&r.id)
                    || world
                        .position(r.id)
                        .map(|pos| aabbs_overlap(&player_box, &aabb_from_center(pos, r.half_extents)))
                        .unwrap_or(false)
            })
            .map(|(_, side)| side)
            .collect();

        let mut position = player.position(world)?;
        let mut velocity = player.velocity(world)?;

        // Polling fallback for a player that tunnelled into or past a wall
        let ceiling = config.screen.boundary_thickness / 2.0 + SNAP_TOLERANCE;
        if player_box.mins.y < ceiling && !sides.contains(&BoundarySide::Top) {
            sides.push(BoundarySide::Top);
        }
        let (left_limit, right_limit) = interior_x_limits(config, player.half_extents().x);
        if position.x < left_limit && !sides.contains(&BoundarySide::Left) {
            sides.push(BoundarySide::Left);
        }
        if position.x > right_limit && !sides.contains(&BoundarySide::Right) {
            sides.push(BoundarySide::Right);
        }

        for side in sides {
            match side {
                BoundarySide::Top => {
                    report.hit_top = true;
                    velocity.y = rules.top_boundary_push;
                    if rules.top_boundary_damage > 0 && player.status.damage_ready(now, rules.damage_cooldown_ms) {
                        player.status.last_damage_ms = Some(now);
                        let lives = session.damage(rules.top_boundary_damage);
                        debug!("Top wall hit, {} lives left", lives);
                    }
                }
                BoundarySide::Left | BoundarySide::Right => {
                    report.hit_side = Some(side);
                    position.x = if side == BoundarySide::Left {
                        position.x.max(left_limit)
                    } else {
                        position.x.min(right_limit)
                    };
                    velocity.x = 0.0;
                    if rules.side_boundary_damage > 0 && player.status.damage_ready(now, rules.damage_cooldown_ms) {
                        player.status.last_damage_ms = Some(now);
                        session.damage(rules.side_boundary_damage);
                    }
                }
            }
        }

        if report.hit_top || report.hit_side.is_some() {
            player.set_position(world, position)?;
            player.set_velocity(world, velocity)?;
        }
        Ok(())
    }

    /// Apply surface rules to every qualifying player/surface pair
    fn resolve_surfaces(
        &mut self,
        world: &mut PhysicsWorld,
        player: &mut Player,
        session: &mut SessionState,
        config: &GameConfig,
        report: &mut ContactReport,
    ) -> GameResult<()> {
        let rules = &config.resolver;
        let now = session.now_ms();
        let player_box = player.aabb(world)?;
        let mut velocity = player.velocity(world)?;
        let mut position = player.position(world)?;

        player.status.decay_spike_contact();

        // A player moving up faster than the surfaces rise is leaving them
        let rising_limit = -(config.scroll.speed.abs() + 1.0);
        let contacts: Vec<SurfaceContact> = if velocity.y < rising_limit {
            Vec::new()
        } else {
            surface_contacts(world, &player_box, config)
        };

        let confirmed: BTreeSet<EntityId> = contacts.iter().map(|c| c.id).collect();
        report.unconfirmed = self
            .ledger
            .iter()
            .copied()
            .filter(|id| !confirmed.contains(id))
            .filter(|id| world.record(*id).is_some_and(|r| r.category.is_surface()))
            .collect();

        let mut on_plain = false;
        let mut on_treadmill = None;
        let mut snapped = false;

        for contact in &contacts {
            match contact.kind {
                SurfaceKind::Plain => {
                    on_plain = true;
                    velocity.y = 0.0;
                    // A landing heal blocked by the cooldown stays owed until it elapses
                    let mut healed = false;
                    if player.status.last_platform != Some(contact.id)
                        && player.status.heal_ready(now, rules.heal_cooldown_ms)
                    {
                        player.status.last_platform = Some(contact.id);
                        healed = session.heal(1);
                        player.status.last_heal_ms = Some(now);
                    }
                    report.effects.push(SurfaceEffect::Landed {
                        surface: contact.id,
                        healed,
                    });
                }
                SurfaceKind::Spring { bounce } => {
                    velocity.y = bounce;
                    if rules.spring_jitter > 0.0 {
                        velocity.x += self.rng.random_range(-rules.spring_jitter..=rules.spring_jitter);
                    }
                    let mut healed = false;
                    if player.status.heal_ready(now, rules.spring_heal_cooldown_ms) {
                        healed = session.heal(1);
                        player.status.last_heal_ms = Some(now);
                    }
                    report.effects.push(SurfaceEffect::Bounced {
                        surface: contact.id,
                        healed,
                    });
                }
                SurfaceKind::Spike { damage } => {
                    player.status.mark_spike_contact(rules.spike_contact_ticks);
                    let mut damaged = false;
                    if player.status.damage_ready(now, rules.damage_cooldown_ms) {
                        player.status.last_damage_ms = Some(now);
                        let lives = session.damage(damage);
                        damaged = true;
                        debug!("Spike {:?} hit, {} lives left", contact.id, lives);
                    }
                    // No restitution bounce off spikes
                    velocity = Vec2::ZERO;
                    report.effects.push(SurfaceEffect::Spiked {
                        surface: contact.id,
                        damaged,
                    });
                }
                SurfaceKind::Treadmill { speed } => {
                    on_treadmill = Some(contact.id);
                    let push = speed * rules.treadmill_push_factor;
                    velocity.x += push;
                    velocity.y = 0.0;
                    if contact.gap.abs() > SNAP_TOLERANCE {
                        position.y = contact.aabb.mins.y - player.half_extents().y;
                        snapped = true;
                    }
                    report.effects.push(SurfaceEffect::Pushed {
                        surface: contact.id,
                        push,
                    });
                }
            }
        }

        player.status.current_treadmill = on_treadmill;
        player.status.grounded = !contacts.is_empty();
        if contacts.is_empty() {
            player.status.clear_support();
        } else if !on_plain && !contacts.iter().any(|c| matches!(c.kind, SurfaceKind::Spring { .. })) {
            // Only plain platforms and springs keep the landing-heal memory
            player.status.last_platform = None;
        }

        player.set_velocity(world, velocity)?;
        if snapped {
            player.set_position(world, position)?;
        }
        Ok(())
    }

    /// Put the player's feet on a surface's top edge
    fn snap_onto(&self, world: &mut PhysicsWorld, player: &Player, surface: EntityId) -> GameResult<()> {
        let Some(record) = world.record(surface) else {
            return Ok(());
        };
        let half_height = record.half_extents.y;
        let surface_pos = world.position(surface)?;
        let mut position = player.position(world)?;

        // Only snap from above; a side brush is not a landing
        if position.y < surface_pos.y {
            position.y = surface_pos.y - half_height - player.half_extents().y;
            player.set_position(world, position)?;
        }
        Ok(())
    }

    /// Damage the player from a fireball hit and nudge them upward
    pub fn apply_projectile_hit(
        &self,
        world: &mut PhysicsWorld,
        player: &mut Player,
        session: &mut SessionState,
        config: &GameConfig,
    ) -> GameResult<bool> {
        let now = session.now_ms();
        let mut damaged = false;
        if player.status.damage_ready(now, config.resolver.damage_cooldown_ms) {
            player.status.last_damage_ms = Some(now);
            session.damage(config.projectile.damage);
            damaged = true;
        }

        let mut velocity = player.velocity(world)?;
        velocity.y = velocity.y.min(0.0) + config.projectile.hit_nudge;
        player.set_velocity(world, velocity)?;
        Ok(damaged)
    }
}

/// Range of x the player's centre may occupy between the side walls
fn interior_x_limits(config: &GameConfig, half_width: f32) -> (f32, f32) {
    let wall = config.screen.boundary_thickness / 2.0;
    let left = wall + half_width + WALL_CLEARANCE;
    let right = config.screen.width - wall - half_width - WALL_CLEARANCE;
    (left, right.max(left))
}

/// Move the player under whatever surface is carrying them into the ceiling
///
/// The downward push set by the top wall response is left untouched.
fn drop_below_carrier(world: &mut PhysicsWorld, player: &Player, config: &GameConfig) -> GameResult<()> {
    let player_box = player.aabb(world)?;
    let position = player.position(world)?;

    let carrier_bottom = world
        .registry()
        .surfaces()
        .filter_map(|record| {
            let pos = world.position(record.id).ok()?;
            let aabb = aabb_from_center(pos, record.half_extents);
            let under_feet = aabb.mins.y >= position.y && vertical_gap(&player_box, &aabb) <= config.resolver.contact_gap;
            (under_feet && horizontal_overlap_ratio(&player_box, &aabb) > 0.0).then_some(aabb.maxs.y)
        })
        .reduce(f32::max);

    if let Some(bottom) = carrier_bottom {
        let dropped = Vec2::new(position.x, bottom + player.half_extents().y + WALL_CLEARANCE);
        debug!("Ceiling hit while carried, dropping player to y {}", dropped.y);
        player.set_position(world, dropped)?;
    }
    Ok(())
}

/// Surfaces close enough below the player and overlapping enough to count
fn surface_contacts(world: &PhysicsWorld, player_box: &Aabb, config: &GameConfig) -> Vec<SurfaceContact> {
    let rules = &config.resolver;

    world
        .registry()
        .surfaces()
        .filter_map(|record| {
            let kind = record.surface?;
            let pos = world.position(record.id).ok()?;
            let aabb = aabb_from_center(pos, record.half_extents);
            let gap = vertical_gap(player_box, &aabb);
            let ratio = horizontal_overlap_ratio(player_box, &aabb);

            let min_ratio = match kind {
                SurfaceKind::Spring { .. } | SurfaceKind::Spike { .. } => rules.hazard_overlap,
                SurfaceKind::Plain | SurfaceKind::Treadmill { .. } => rules.support_overlap,
            };
            let in_reach = gap <= rules.contact_gap && gap >= -record.half_extents.y;

            (in_reach && ratio > 0.0 && ratio >= min_ratio).then_some(SurfaceContact {
                id: record.id,
                kind,
                aabb,
                gap,
            })
        })
        .collect()
}
