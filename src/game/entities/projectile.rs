use serde::{Deserialize, Serialize};

use crate::game::constants::{ms_to_secs, projectile};
use crate::game::entities::{Bounds, Color, DrawData, Entity, EntityId, EntityKind, Shape};
use crate::util::vec2::Vec2;

/// Spawn descriptor produced by `Ship::try_fire`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpawn {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// A fired shot. Instances are pooled: `reset` recycles a reclaimed
/// projectile without touching its id, which stays from true creation.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Milliseconds since firing (or since the last pool reuse).
    age_ms: f32,
    /// Cumulative distance flown in px; wrapping does not reset it.
    traveled: f32,
    active: bool,
}

impl Projectile {
    pub fn new(id: EntityId, spawn: ProjectileSpawn) -> Self {
        Self {
            id,
            position: spawn.position,
            velocity: spawn.velocity,
            age_ms: 0.0,
            traveled: 0.0,
            active: true,
        }
    }

    /// Relaunch a pooled instance. Everything except the id starts fresh.
    pub fn reset(&mut self, spawn: ProjectileSpawn) {
        self.position = spawn.position;
        self.velocity = spawn.velocity;
        self.age_ms = 0.0;
        self.traveled = 0.0;
        self.active = true;
    }

    pub fn age_ms(&self) -> f32 {
        self.age_ms
    }

    pub fn traveled(&self) -> f32 {
        self.traveled
    }

    pub fn is_expired(&self) -> bool {
        self.age_ms >= projectile::LIFESPAN_MS || self.traveled >= projectile::MAX_RANGE
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn config(&self) -> ProjectileConfig {
        ProjectileConfig {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            age_ms: self.age_ms,
            traveled: self.traveled,
            active: self.active,
        }
    }

    pub fn from_config(config: ProjectileConfig) -> Self {
        Self {
            id: config.id,
            position: config.position,
            velocity: config.velocity,
            age_ms: config.age_ms,
            traveled: config.traveled,
            active: config.active,
        }
    }
}

impl Entity for Projectile {
    fn kind(&self) -> EntityKind {
        EntityKind::Projectile
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn radius(&self) -> f32 {
        projectile::RADIUS
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn update(&mut self, dt_ms: f32, bounds: Bounds) {
        let step = self.velocity * ms_to_secs(dt_ms);
        self.position += step;
        self.traveled += step.length();
        self.age_ms += dt_ms;
        self.position = bounds.wrap(self.position);
        if self.is_expired() {
            self.active = false;
        }
    }

    fn draw_data(&self) -> DrawData {
        DrawData {
            kind: EntityKind::Projectile,
            position: self.position,
            rotation: 0.0,
            radius: projectile::RADIUS,
            color: Color::WHITE,
            alpha: 1.0,
            shape: Shape::Circle,
        }
    }
}

/// Flat snapshot of one projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileConfig {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub age_ms: f32,
    pub traveled: f32,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds {
        Bounds::new(800.0, 600.0)
    }

    fn spawn() -> ProjectileSpawn {
        // Fast enough that the 1000 px range budget runs out before the
        // 2000 ms age limit
        ProjectileSpawn {
            position: Vec2::new(400.0, 300.0),
            velocity: Vec2::new(550.0, 0.0),
        }
    }

    #[test]
    fn test_expires_by_age() {
        let mut p = Projectile::new(1, ProjectileSpawn {
            position: Vec2::new(400.0, 300.0),
            velocity: Vec2::ZERO,
        });
        p.update(1999.0, bounds());
        assert!(p.is_active(), "still inside the lifespan");
        p.update(1.0, bounds());
        assert!(!p.is_active(), "lifespan elapsed");
    }

    #[test]
    fn test_expires_by_travel_distance() {
        // 600 px/s empties the 1000 px range budget well before the
        // 2000 ms age limit
        let mut p = Projectile::new(1, ProjectileSpawn {
            position: Vec2::new(400.0, 300.0),
            velocity: Vec2::new(600.0, 0.0),
        });
        let mut elapsed = 0.0;
        while p.is_active() {
            p.update(16.0, bounds());
            elapsed += 16.0;
            assert!(elapsed < 2000.0, "range expiry should beat age expiry");
        }
        assert!(p.traveled() >= 1000.0);
    }

    #[test]
    fn test_travel_accumulates_across_wraps() {
        let mut p = Projectile::new(1, spawn());
        let mut wrapped = false;
        let mut last_x = p.position.x;
        while p.is_active() {
            p.update(16.0, bounds());
            if p.position.x < last_x {
                wrapped = true;
            }
            last_x = p.position.x;
        }
        assert!(wrapped, "shot should cross the right edge at least once");
        assert!(
            p.traveled() >= 1000.0,
            "wrapping must not reset the odometer: {}",
            p.traveled()
        );
    }

    #[test]
    fn test_reset_reuses_instance_but_keeps_id() {
        let mut p = Projectile::new(7, spawn());
        p.update(500.0, bounds());
        p.deactivate();
        let relaunch = ProjectileSpawn {
            position: Vec2::new(10.0, 10.0),
            velocity: Vec2::new(0.0, -450.0),
        };
        p.reset(relaunch);
        assert_eq!(p.id, 7, "pooled instances keep their original id");
        assert!(p.is_active());
        assert_eq!(p.age_ms(), 0.0);
        assert_eq!(p.traveled(), 0.0);
        assert_eq!(p.position, relaunch.position);
        assert_eq!(p.velocity, relaunch.velocity);
    }

    #[test]
    fn test_config_round_trip() {
        let mut p = Projectile::new(3, spawn());
        p.update(160.0, bounds());
        let restored = Projectile::from_config(p.config());
        assert_eq!(restored.id, p.id);
        assert_eq!(restored.position, p.position);
        assert_eq!(restored.age_ms(), p.age_ms());
        assert_eq!(restored.traveled(), p.traveled());
        assert_eq!(restored.is_active(), p.is_active());
    }
}
