//! Physics pass and collision detection
//!
//! One engine instance lives per session. It advances all active entities
//! each frame and runs circle-circle collision detection, switching
//! between a brute-force scan and the spatial grid by entity count.

use crate::game::constants::{collision, ms_to_secs};
use crate::game::entities::{Bounds, Collider, ColliderId, Entity};
use crate::game::manager::EntityManager;
use crate::game::spatial::SpatialGrid;
use crate::util::vec2::Vec2;

/// Result of one physics advance over the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicsReport {
    /// Active entities that were stepped, ship included.
    pub updated: usize,
    /// Screen-wrap events detected this frame.
    pub wraps: usize,
}

/// One detected contact between two circles.
///
/// The pair is stored in canonical order (smaller packed id first), so
/// both detection strategies produce literally comparable records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub a: ColliderId,
    pub b: ColliderId,
    /// Midpoint between the two centers.
    pub contact: Vec2,
    /// Unit normal pointing from `a` toward `b`. Zero when the centers
    /// coincide; callers must handle the degenerate case.
    pub normal: Vec2,
    /// Penetration depth along the normal.
    pub overlap: f32,
}

pub struct PhysicsEngine {
    bounds: Bounds,
    grid: SpatialGrid,
}

impl PhysicsEngine {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            grid: SpatialGrid::new(collision::CELL_SIZE),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Advance the ship and every active managed entity by `dt_ms`.
    ///
    /// Wrap events are inferred, not observed: a per-axis position jump
    /// longer than half the screen dimension is counted as a wrap. An
    /// entity genuinely teleported that far would be misclassified; known
    /// limitation, kept because entities wrap internally and do not
    /// report it.
    pub fn update_entities(
        &self,
        ship: &mut dyn Entity,
        manager: &mut EntityManager,
        dt_ms: f32,
    ) -> PhysicsReport {
        let bounds = self.bounds;
        let mut report = PhysicsReport::default();

        let mut advance = |entity: &mut dyn Entity| {
            let before = entity.position();
            entity.update(dt_ms, bounds);
            report.updated += 1;
            if wrap_jumped(before, entity.position(), bounds) {
                report.wraps += 1;
            }
        };

        advance(ship);
        manager.for_each_active_entity_mut(&mut advance);
        report
    }

    /// Detect all circle-circle contacts among `colliders`.
    ///
    /// The caller passes active entities only. Small sets are scanned
    /// pairwise; past `collision::BRUTE_FORCE_MAX` the spatial grid takes
    /// over. Both strategies yield the same logical pair set.
    pub fn detect_collisions(&mut self, colliders: &[Collider]) -> Vec<Collision> {
        if colliders.len() > collision::BRUTE_FORCE_MAX {
            self.detect_grid(colliders)
        } else {
            Self::detect_brute_force(colliders)
        }
    }

    fn detect_brute_force(colliders: &[Collider]) -> Vec<Collision> {
        let mut collisions = Vec::new();
        for i in 0..colliders.len() {
            for j in (i + 1)..colliders.len() {
                if let Some(hit) = check_pair(colliders[i], colliders[j]) {
                    collisions.push(hit);
                }
            }
        }
        collisions
    }

    fn detect_grid(&mut self, colliders: &[Collider]) -> Vec<Collision> {
        self.grid.clear();
        for &collider in colliders {
            self.grid.insert(collider);
        }
        let mut collisions = Vec::new();
        self.grid.for_each_candidate_pair(|a, b| {
            if let Some(hit) = check_pair(a, b) {
                collisions.push(hit);
            }
        });
        tracing::trace!(
            colliders = colliders.len(),
            hits = collisions.len(),
            "grid collision pass"
        );
        collisions
    }

    /// Accelerate a velocity by `force` over `dt_ms`. Entities without a
    /// velocity have nothing to pass here, so the call cannot misfire.
    pub fn apply_force(velocity: &mut Vec2, force: Vec2, dt_ms: f32) {
        *velocity += force * ms_to_secs(dt_ms);
    }

    /// Multiplicative damping on a velocity.
    pub fn apply_damping(velocity: &mut Vec2, factor: f32) {
        *velocity *= factor;
    }

    /// Positional separation: push both centers apart along the normal by
    /// half the overlap each. No-op on a degenerate (zero) normal. Not
    /// invoked by detection; gameplay decides when push-back is wanted.
    pub fn resolve_collision(pos_a: &mut Vec2, pos_b: &mut Vec2, hit: &Collision) {
        if hit.normal.is_zero(f32::EPSILON) {
            return;
        }
        let shift = hit.normal * (hit.overlap * 0.5);
        *pos_a -= shift;
        *pos_b += shift;
    }
}

/// Narrow phase: strict squared-distance circle test. Pairs are oriented
/// smaller packed id first before the normal is computed.
fn check_pair(first: Collider, second: Collider) -> Option<Collision> {
    let (a, b) = if first.id.packed() <= second.id.packed() {
        (first, second)
    } else {
        (second, first)
    };
    let delta = b.position - a.position;
    let radius_sum = a.radius + b.radius;
    if delta.length_sq() >= radius_sum * radius_sum {
        return None;
    }
    let (normal, distance) = delta.normalize_with_length();
    Some(Collision {
        a: a.id,
        b: b.id,
        contact: a.position.lerp(b.position, 0.5),
        normal,
        overlap: radius_sum - distance,
    })
}

#[inline]
fn wrap_jumped(before: Vec2, after: Vec2, bounds: Bounds) -> bool {
    (after.x - before.x).abs() > bounds.width * 0.5
        || (after.y - before.y).abs() > bounds.height * 0.5
}
