use serde::{Deserialize, Serialize};

use crate::game::constants::{ms_to_secs, ship};
use crate::game::entities::{Bounds, Color, DrawData, Entity, EntityKind, ProjectileSpawn, Shape};
use crate::util::vec2::Vec2;

/// The player ship. Exactly one exists per session; it is never pooled
/// and never deactivated, it only respawns.
///
/// Rotation 0 points straight up; positive rotation turns clockwise.
#[derive(Debug, Clone)]
pub struct Ship {
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    /// Steering input for this frame: -1 (left), 0, or +1 (right).
    pub turning: f32,
    pub thrusting: bool,
    /// Remaining invulnerability in ms; > 0 means hits are ignored.
    invulnerable_ms: f32,
    /// Remaining cooldown until the next shot is allowed, in ms.
    fire_cooldown_ms: f32,
    pub color: Color,
}

impl Ship {
    pub fn new(position: Vec2, color: Color) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            turning: 0.0,
            thrusting: false,
            invulnerable_ms: 0.0,
            fire_cooldown_ms: 0.0,
            color,
        }
    }

    /// Unit vector the nose points along.
    #[inline]
    pub fn facing(&self) -> Vec2 {
        Vec2::UP.rotate(self.rotation)
    }

    /// Set this frame's steering state. `turn` is -1, 0 or +1.
    pub fn set_controls(&mut self, turn: f32, thrusting: bool) {
        self.turning = turn.clamp(-1.0, 1.0);
        self.thrusting = thrusting;
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ms > 0.0
    }

    pub fn invulnerable_ms_remaining(&self) -> f32 {
        self.invulnerable_ms
    }

    pub fn can_fire(&self) -> bool {
        self.fire_cooldown_ms <= 0.0
    }

    /// Fire if the cooldown allows it. The projectile starts just past the
    /// hull and inherits the ship's velocity on top of its muzzle speed.
    pub fn try_fire(&mut self) -> Option<ProjectileSpawn> {
        if !self.can_fire() {
            return None;
        }
        self.fire_cooldown_ms = ship::FIRE_INTERVAL_MS;
        let facing = self.facing();
        Some(ProjectileSpawn {
            position: self.position + facing * (ship::RADIUS + ship::MUZZLE_OFFSET),
            velocity: self.velocity + facing * ship::PROJECTILE_SPEED,
        })
    }

    /// Register an asteroid contact. While invulnerable the hit is ignored
    /// and `false` comes back. Otherwise the ship respawns at the screen
    /// center and reports `true`; deducting the life is the caller's job.
    pub fn hit_by_asteroid(&mut self, bounds: Bounds) -> bool {
        if self.is_invulnerable() {
            return false;
        }
        self.respawn(bounds.center());
        true
    }

    /// Reset to the respawn pose: centered, motionless, facing up, with a
    /// fresh invulnerability window.
    pub fn respawn(&mut self, center: Vec2) {
        self.position = center;
        self.velocity = Vec2::ZERO;
        self.rotation = 0.0;
        self.turning = 0.0;
        self.thrusting = false;
        self.invulnerable_ms = ship::INVULNERABILITY_MS;
    }

    pub fn config(&self) -> ShipConfig {
        ShipConfig {
            position: self.position,
            velocity: self.velocity,
            rotation: self.rotation,
            invulnerable_ms: self.invulnerable_ms,
            fire_cooldown_ms: self.fire_cooldown_ms,
            color: self.color,
        }
    }

    pub fn from_config(config: ShipConfig) -> Self {
        Self {
            position: config.position,
            velocity: config.velocity,
            rotation: config.rotation,
            turning: 0.0,
            thrusting: false,
            invulnerable_ms: config.invulnerable_ms,
            fire_cooldown_ms: config.fire_cooldown_ms,
            color: config.color,
        }
    }
}

impl Entity for Ship {
    fn kind(&self) -> EntityKind {
        EntityKind::Ship
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn radius(&self) -> f32 {
        ship::RADIUS
    }

    fn is_active(&self) -> bool {
        true
    }

    fn update(&mut self, dt_ms: f32, bounds: Bounds) {
        let dt = ms_to_secs(dt_ms);

        self.rotation += self.turning * ship::TURN_RATE * dt;
        if self.thrusting {
            self.velocity += self.facing() * (ship::THRUST * dt);
        }
        self.velocity *= 1.0 - ship::DRAG;
        self.velocity = self.velocity.clamp_length(ship::MAX_SPEED);
        self.position += self.velocity * dt;
        self.position = bounds.wrap(self.position);

        self.invulnerable_ms = (self.invulnerable_ms - dt_ms).max(0.0);
        self.fire_cooldown_ms = (self.fire_cooldown_ms - dt_ms).max(0.0);
    }

    fn draw_data(&self) -> DrawData {
        let r = ship::RADIUS;
        DrawData {
            kind: EntityKind::Ship,
            position: self.position,
            rotation: self.rotation,
            radius: r,
            color: self.color,
            // Invulnerable ships render translucent
            alpha: if self.is_invulnerable() { 0.5 } else { 1.0 },
            shape: Shape::Polygon(vec![
                Vec2::new(0.0, -r * 1.2),
                Vec2::new(-r * 0.8, r),
                Vec2::new(r * 0.8, r),
            ]),
        }
    }
}

/// Flat snapshot sufficient to reconstruct an equivalent ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipConfig {
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub invulnerable_ms: f32,
    pub fire_cooldown_ms: f32,
    pub color: Color,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn bounds() -> Bounds {
        Bounds::new(800.0, 600.0)
    }

    fn ship_at_center() -> Ship {
        Ship::new(bounds().center(), Color::SHIP)
    }

    #[test]
    fn test_new_ship_faces_up() {
        let ship = ship_at_center();
        assert!(ship.facing().approx_eq(Vec2::UP, EPSILON));
        assert_eq!(ship.velocity, Vec2::ZERO);
        assert!(!ship.is_invulnerable());
    }

    #[test]
    fn test_thrust_accelerates_along_facing() {
        let mut s = ship_at_center();
        s.set_controls(0.0, true);
        s.update(16.0, bounds());
        assert!(s.velocity.y < 0.0, "thrust while facing up must push up");
        assert!(s.velocity.x.abs() < EPSILON);
    }

    #[test]
    fn test_coasting_decays_velocity() {
        let mut s = ship_at_center();
        s.velocity = Vec2::new(100.0, 0.0);
        let before = s.velocity.length();
        s.update(16.0, bounds());
        let after = s.velocity.length();
        assert!(after < before, "drag must shed speed: {} -> {}", before, after);
        assert!(after > 0.0, "drag never fully stops the ship in one frame");
    }

    #[test]
    fn test_speed_clamped_at_max() {
        let mut s = ship_at_center();
        s.set_controls(0.0, true);
        // Burn long enough to saturate
        for _ in 0..2000 {
            s.update(16.0, bounds());
        }
        assert!(
            s.velocity.length() <= ship::MAX_SPEED + EPSILON,
            "speed {} exceeds cap",
            s.velocity.length()
        );
    }

    #[test]
    fn test_turning_changes_rotation() {
        let mut s = ship_at_center();
        s.set_controls(1.0, false);
        s.update(100.0, bounds());
        assert!(s.rotation > 0.0);
        s.set_controls(-1.0, false);
        s.update(200.0, bounds());
        assert!(s.rotation < 0.0);
    }

    #[test]
    fn test_hard_wrap_both_axes() {
        let mut s = ship_at_center();
        s.position = Vec2::new(799.0, 300.0);
        s.velocity = Vec2::new(200.0, 0.0);
        s.update(33.0, bounds());
        assert!(s.position.x < 10.0, "expected left-edge re-entry, got {:?}", s.position);

        let mut s = ship_at_center();
        s.position = Vec2::new(400.0, 1.0);
        s.velocity = Vec2::new(0.0, -200.0);
        s.update(33.0, bounds());
        assert!(s.position.y > 590.0, "expected bottom re-entry, got {:?}", s.position);
    }

    #[test]
    fn test_fire_rate_limited() {
        let mut s = ship_at_center();
        assert!(s.try_fire().is_some());
        assert!(s.try_fire().is_none(), "second shot inside the interval must be refused");
        // Not yet: one frame short of the interval
        s.update(ship::FIRE_INTERVAL_MS - 1.0, bounds());
        assert!(!s.can_fire());
        s.update(1.0, bounds());
        assert!(s.can_fire());
        assert!(s.try_fire().is_some());
    }

    #[test]
    fn test_muzzle_offset_and_velocity_inheritance() {
        let mut s = ship_at_center();
        s.velocity = Vec2::new(50.0, -20.0);
        let spawn = s.try_fire().unwrap();
        // Facing up: muzzle sits radius + offset above the ship
        let expected_pos = s.position + Vec2::UP * (ship::RADIUS + ship::MUZZLE_OFFSET);
        assert!(spawn.position.approx_eq(expected_pos, EPSILON));
        // Ship velocity is added, not replaced
        let expected_vel = s.velocity + Vec2::UP * ship::PROJECTILE_SPEED;
        assert!(spawn.velocity.approx_eq(expected_vel, EPSILON));
    }

    #[test]
    fn test_hit_respawns_at_center_facing_up() {
        let mut s = ship_at_center();
        s.position = Vec2::new(100.0, 100.0);
        s.velocity = Vec2::new(80.0, 80.0);
        s.rotation = 2.0;
        assert!(s.hit_by_asteroid(bounds()), "vulnerable ship must register the hit");
        assert_eq!(s.position, bounds().center());
        assert_eq!(s.velocity, Vec2::ZERO);
        assert!(s.facing().approx_eq(Vec2::UP, EPSILON));
        assert!(s.is_invulnerable());
        assert!((s.invulnerable_ms_remaining() - ship::INVULNERABILITY_MS).abs() < EPSILON);
    }

    #[test]
    fn test_hit_ignored_while_invulnerable() {
        let mut s = ship_at_center();
        assert!(s.hit_by_asteroid(bounds()));
        s.position = Vec2::new(50.0, 50.0);
        assert!(!s.hit_by_asteroid(bounds()), "hit inside the window must be ignored");
        assert_eq!(s.position, Vec2::new(50.0, 50.0), "ignored hit must not move the ship");
    }

    #[test]
    fn test_invulnerability_expires() {
        let mut s = ship_at_center();
        s.respawn(bounds().center());
        s.update(ship::INVULNERABILITY_MS - 1.0, bounds());
        assert!(s.is_invulnerable());
        s.update(2.0, bounds());
        assert!(!s.is_invulnerable());
        assert!(s.hit_by_asteroid(bounds()), "hits register again after the window");
    }

    #[test]
    fn test_config_round_trip() {
        let mut s = ship_at_center();
        s.velocity = Vec2::new(12.0, -34.0);
        s.rotation = 1.25;
        s.respawn(Vec2::new(10.0, 20.0));
        s.velocity = Vec2::new(5.0, 6.0);
        let restored = Ship::from_config(s.config());
        assert_eq!(restored.position, s.position);
        assert_eq!(restored.velocity, s.velocity);
        assert_eq!(restored.rotation, s.rotation);
        assert_eq!(restored.is_invulnerable(), s.is_invulnerable());
    }

    #[test]
    fn test_position_moves_continuously() {
        // No teleports while inside the playfield: each small step moves
        // the ship by at most velocity * dt
        let mut s = ship_at_center();
        s.velocity = Vec2::new(120.0, 60.0);
        let mut prev = s.position;
        for _ in 0..60 {
            s.update(16.0, bounds());
            let step = prev.distance_to(s.position);
            assert!(step < 10.0, "step {} too large for one frame", step);
            prev = s.position;
        }
    }
}
