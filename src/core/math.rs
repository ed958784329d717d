// Geometry helpers for the hand-rolled contact checks
//
// Physics-engine bodies and kinematic projectiles are both reduced to
// axis-aligned boxes here so the resolver can reason about them uniformly.

use glam::Vec2;
use parry2d::bounding_volume::{Aabb, BoundingVolume};
use parry2d::math::{Point, Vector};

/// Build an AABB from a centre point and half extents
pub fn aabb_from_center(center: Vec2, half_extents: Vec2) -> Aabb {
    Aabb::from_half_extents(
        Point::new(center.x, center.y),
        Vector::new(half_extents.x, half_extents.y),
    )
}

/// Check whether two boxes touch or overlap (edges touching counts)
pub fn aabbs_overlap(a: &Aabb, b: &Aabb) -> bool {
    a.intersects(b)
}

/// Fraction of `subject`'s width that lies over `surface`, in `[0, 1]`
pub fn horizontal_overlap_ratio(subject: &Aabb, surface: &Aabb) -> f32 {
    let width = subject.maxs.x - subject.mins.x;
    if width <= 0.0 {
        return 0.0;
    }

    let overlap = subject.maxs.x.min(surface.maxs.x) - subject.mins.x.max(surface.mins.x);
    (overlap / width).clamp(0.0, 1.0)
}

/// Distance from the bottom of `subject` down to the top of `surface`
///
/// Negative when the two boxes interpenetrate vertically.
pub fn vertical_gap(subject: &Aabb, surface: &Aabb) -> f32 {
    surface.mins.y - subject.maxs.y
}

/// Clamp a signed life count into `[0, cap]`
pub fn clamp_lives(value: i32, cap: u8) -> u8 {
    value.clamp(0, cap as i32) as u8
}
