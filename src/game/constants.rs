/// Screen dimensions - defaults, overridable via GameConfig
pub mod screen {
    /// Playfield width in pixels
    pub const WIDTH: f32 = 800.0;
    /// Playfield height in pixels
    pub const HEIGHT: f32 = 600.0;
}

/// Frame timing constants
pub mod frame {
    /// Slowest frame rate the simulation will honor
    pub const MIN_FPS: u32 = 30;
    /// Delta-time ceiling in milliseconds; longer frames are clamped so a
    /// lag spike cannot tunnel entities through each other
    pub const MAX_DELTA_MS: f32 = 1000.0 / 30.0;
    /// Nominal frame duration at 60 Hz, used by the demo pacer
    pub const TARGET_DELTA_MS: f32 = 1000.0 / 60.0;
}

/// Ship constants
pub mod ship {
    /// Collision radius in pixels
    pub const RADIUS: f32 = 12.0;
    /// Thrust acceleration in px/s^2
    pub const THRUST: f32 = 260.0;
    /// Turn rate in radians per second
    pub const TURN_RATE: f32 = 4.2;
    /// Fraction of velocity shed per update (multiplicative drag)
    /// Applied as: velocity *= (1.0 - DRAG)
    pub const DRAG: f32 = 0.008;
    /// Maximum speed in px/s, enforced after drag
    pub const MAX_SPEED: f32 = 420.0;
    /// Minimum time between shots in milliseconds
    pub const FIRE_INTERVAL_MS: f32 = 250.0;
    /// Muzzle distance past the hull, along the facing direction
    pub const MUZZLE_OFFSET: f32 = 5.0;
    /// Projectile muzzle speed in px/s, added to the ship's velocity
    pub const PROJECTILE_SPEED: f32 = 450.0;
    /// Invulnerability window after a respawn, in milliseconds
    pub const INVULNERABILITY_MS: f32 = 2000.0;
}

/// Asteroid constants
pub mod asteroid {
    /// Base radius range per size category, in pixels
    pub const LARGE_RADIUS_MIN: f32 = 35.0;
    pub const LARGE_RADIUS_MAX: f32 = 48.0;
    pub const MEDIUM_RADIUS_MIN: f32 = 18.0;
    pub const MEDIUM_RADIUS_MAX: f32 = 26.0;
    pub const SMALL_RADIUS_MIN: f32 = 8.0;
    pub const SMALL_RADIUS_MAX: f32 = 13.0;

    /// Score values - inverse to size, small rocks are the hardest targets
    pub const LARGE_POINTS: u32 = 20;
    pub const MEDIUM_POINTS: u32 = 50;
    pub const SMALL_POINTS: u32 = 100;

    /// Fragments produced when a large or medium asteroid splits
    pub const SPLIT_COUNT_MIN: u32 = 2;
    pub const SPLIT_COUNT_MAX: u32 = 3;
    /// Fragment launch speed range in px/s
    pub const FRAGMENT_SPEED_MIN: f32 = 50.0;
    pub const FRAGMENT_SPEED_MAX: f32 = 150.0;
    /// Fraction of the parent's velocity fragments inherit
    pub const PARENT_VELOCITY_FACTOR: f32 = 0.3;
    /// Fragment start offset along its launch direction, as a fraction of
    /// the parent's radius
    pub const FRAGMENT_OFFSET_FACTOR: f32 = 0.3;

    /// Outline vertex count range
    pub const VERTEX_COUNT_MIN: usize = 8;
    pub const VERTEX_COUNT_MAX: usize = 12;
    /// Per-vertex radius jitter as a fraction of the base radius
    pub const VERTEX_JITTER_MIN: f32 = 0.6;
    pub const VERTEX_JITTER_MAX: f32 = 1.4;

    /// Drift speed range for field-spawned asteroids, in px/s before the
    /// difficulty and level multipliers
    pub const FIELD_SPEED_MIN: f32 = 30.0;
    pub const FIELD_SPEED_MAX: f32 = 90.0;
    /// Spin range in radians per second (either direction)
    pub const MAX_ANGULAR_VELOCITY: f32 = 1.5;
}

/// Projectile constants
pub mod projectile {
    /// Collision radius in pixels - all projectiles are the same size
    pub const RADIUS: f32 = 3.0;
    /// Lifespan in milliseconds
    pub const LIFESPAN_MS: f32 = 2000.0;
    /// Maximum cumulative travel distance in pixels; crossing a wrapped
    /// screen keeps counting, so range outlives any single crossing
    pub const MAX_RANGE: f32 = 1000.0;
}

/// Particle effect tuning
pub mod particle {
    /// Explosion burst: count scales with the destroyed radius
    pub const EXPLOSION_COUNT_PER_RADIUS: f32 = 0.5;
    pub const EXPLOSION_COUNT_MIN: usize = 6;
    pub const EXPLOSION_COUNT_MAX: usize = 24;
    pub const EXPLOSION_SPEED_MIN: f32 = 40.0;
    pub const EXPLOSION_SPEED_MAX: f32 = 160.0;
    pub const EXPLOSION_LIFESPAN_MS_MIN: f32 = 400.0;
    pub const EXPLOSION_LIFESPAN_MS_MAX: f32 = 900.0;
    pub const EXPLOSION_SIZE_MIN: f32 = 1.5;
    pub const EXPLOSION_SIZE_MAX: f32 = 4.0;
    /// Drag (fraction of velocity shed per update) for explosion debris
    pub const EXPLOSION_DRAG: f32 = 0.02;

    /// Debris scatter: slow chunks that keep some of the source's motion
    pub const DEBRIS_COUNT: usize = 10;
    /// Fraction of the source velocity debris inherits
    pub const DEBRIS_INHERITANCE: f32 = 0.3;
    pub const DEBRIS_SPEED_MIN: f32 = 20.0;
    pub const DEBRIS_SPEED_MAX: f32 = 80.0;
    pub const DEBRIS_LIFESPAN_MS_MIN: f32 = 500.0;
    pub const DEBRIS_LIFESPAN_MS_MAX: f32 = 1200.0;
    pub const DEBRIS_SIZE_MIN: f32 = 1.0;
    pub const DEBRIS_SIZE_MAX: f32 = 3.0;
    pub const DEBRIS_DRAG: f32 = 0.015;
    /// Gentle downward pull on debris chunks, px/s^2
    pub const DEBRIS_GRAVITY: f32 = 50.0;

    /// Spark burst on projectile impact, aimed back along the impact
    pub const SPARK_COUNT: usize = 6;
    /// Full cone width for spark spread, in degrees
    pub const SPARK_CONE_DEGREES: f32 = 60.0;
    pub const SPARK_SPEED_MIN: f32 = 80.0;
    pub const SPARK_SPEED_MAX: f32 = 220.0;
    pub const SPARK_LIFESPAN_MS_MIN: f32 = 150.0;
    pub const SPARK_LIFESPAN_MS_MAX: f32 = 400.0;
    pub const SPARK_SIZE_MIN: f32 = 1.0;
    pub const SPARK_SIZE_MAX: f32 = 2.0;
    pub const SPARK_DRAG: f32 = 0.03;
}

/// Object pool constants
pub mod pool {
    /// Default cap on pooled projectiles and particles; instances reclaimed
    /// past this are dropped instead of pooled
    pub const MAX_POOL_SIZE: usize = 50;
}

/// Field spawn placement constants
pub mod spawn {
    /// Minimum distance between a spawned asteroid and the avoid position
    pub const SAFE_DISTANCE: f32 = 120.0;
    /// Placement attempts before giving up and keeping the last candidate
    pub const MAX_ATTEMPTS: u32 = 50;
}

/// Collision detection constants
pub mod collision {
    /// Spatial grid cell size in pixels
    pub const CELL_SIZE: f32 = 100.0;
    /// Entity count at or below which brute-force pairwise checking is
    /// used; above it the spatial grid takes over
    pub const BRUTE_FORCE_MAX: usize = 10;
}

/// Scoring and level progression constants
pub mod level {
    /// Flat bonus for clearing a level
    pub const CLEAR_BONUS: u32 = 500;
    /// Levels per additional asteroid in the starting field
    pub const ASTEROIDS_PER_STEP: u32 = 3;
    /// Speed multiplier growth per level past the first
    pub const SPEED_STEP: f32 = 0.05;
    /// Cap on the level-driven speed growth
    pub const SPEED_GROWTH_CAP: f32 = 0.5;
}

/// Convert a frame delta in milliseconds to seconds for integration.
#[inline]
pub fn ms_to_secs(dt_ms: f32) -> f32 {
    dt_ms * 0.001
}

/// Starting asteroid count for a level: one extra rock every three levels.
#[inline]
pub fn asteroids_for_level(base_count: u32, level: u32) -> u32 {
    base_count + level.saturating_sub(1) / level::ASTEROIDS_PER_STEP
}

/// Speed multiplier for a level: +5% per level past the first, capped at
/// +50%, on top of the difficulty's base multiplier.
#[inline]
pub fn speed_multiplier_for_level(base_multiplier: f32, level: u32) -> f32 {
    let growth = (level.saturating_sub(1) as f32 * level::SPEED_STEP).min(level::SPEED_GROWTH_CAP);
    base_multiplier * (1.0 + growth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clamp_matches_min_fps() {
        assert!((frame::MAX_DELTA_MS - 1000.0 / frame::MIN_FPS as f32).abs() < 0.001);
        assert!(frame::TARGET_DELTA_MS < frame::MAX_DELTA_MS);
    }

    #[test]
    fn test_ms_to_secs() {
        assert!((ms_to_secs(1000.0) - 1.0).abs() < 1e-6);
        assert!((ms_to_secs(16.667) - 0.016667).abs() < 1e-6);
    }

    #[test]
    fn test_drag_is_per_update_shed_fraction() {
        assert!(ship::DRAG > 0.0 && ship::DRAG < 0.1);
        assert!(particle::EXPLOSION_DRAG > 0.0 && particle::EXPLOSION_DRAG < 0.1);
    }

    #[test]
    fn test_asteroid_radius_ranges_ordered() {
        assert!(asteroid::SMALL_RADIUS_MIN < asteroid::SMALL_RADIUS_MAX);
        assert!(asteroid::MEDIUM_RADIUS_MIN < asteroid::MEDIUM_RADIUS_MAX);
        assert!(asteroid::LARGE_RADIUS_MIN < asteroid::LARGE_RADIUS_MAX);
        // Categories must not overlap or size-based reasoning breaks
        assert!(asteroid::SMALL_RADIUS_MAX < asteroid::MEDIUM_RADIUS_MIN);
        assert!(asteroid::MEDIUM_RADIUS_MAX < asteroid::LARGE_RADIUS_MIN);
    }

    #[test]
    fn test_points_inverse_to_size() {
        assert!(asteroid::SMALL_POINTS > asteroid::MEDIUM_POINTS);
        assert!(asteroid::MEDIUM_POINTS > asteroid::LARGE_POINTS);
    }

    #[test]
    fn test_split_ranges() {
        assert!(asteroid::SPLIT_COUNT_MIN <= asteroid::SPLIT_COUNT_MAX);
        assert!(asteroid::FRAGMENT_SPEED_MIN < asteroid::FRAGMENT_SPEED_MAX);
        assert!(asteroid::PARENT_VELOCITY_FACTOR > 0.0 && asteroid::PARENT_VELOCITY_FACTOR < 1.0);
    }

    #[test]
    fn test_vertex_jitter_brackets_base_radius() {
        assert!(asteroid::VERTEX_JITTER_MIN < 1.0);
        assert!(asteroid::VERTEX_JITTER_MAX > 1.0);
        assert!(asteroid::VERTEX_COUNT_MIN >= 3);
        assert!(asteroid::VERTEX_COUNT_MIN <= asteroid::VERTEX_COUNT_MAX);
    }

    #[test]
    fn test_projectile_range_exceeds_one_crossing() {
        // Range expiry must stay meaningful on a wrapped screen
        assert!(projectile::MAX_RANGE > screen::WIDTH);
        assert!(projectile::MAX_RANGE > screen::HEIGHT);
    }

    #[test]
    fn test_muzzle_clears_hull() {
        assert!(ship::MUZZLE_OFFSET > 0.0);
        assert!(ship::PROJECTILE_SPEED > ship::MAX_SPEED - ship::PROJECTILE_SPEED);
    }

    #[test]
    fn test_grid_cell_fits_largest_asteroid() {
        // A cell must cover the largest collision radius so the 3x3
        // neighborhood always sees every possible contact
        assert!(collision::CELL_SIZE >= 2.0 * asteroid::LARGE_RADIUS_MAX);
    }

    #[test]
    fn test_asteroids_for_level() {
        assert_eq!(asteroids_for_level(5, 1), 5);
        assert_eq!(asteroids_for_level(5, 3), 5);
        assert_eq!(asteroids_for_level(5, 4), 6);
        assert_eq!(asteroids_for_level(5, 7), 7);
        assert_eq!(asteroids_for_level(4, 10), 7);
    }

    #[test]
    fn test_speed_multiplier_for_level() {
        assert!((speed_multiplier_for_level(1.0, 1) - 1.0).abs() < 1e-6);
        assert!((speed_multiplier_for_level(1.0, 2) - 1.05).abs() < 1e-6);
        assert!((speed_multiplier_for_level(1.0, 11) - 1.5).abs() < 1e-6);
        // Growth saturates at +50%
        assert!((speed_multiplier_for_level(1.0, 50) - 1.5).abs() < 1e-6);
        assert!((speed_multiplier_for_level(1.3, 50) - 1.95).abs() < 1e-5);
    }

    #[test]
    fn test_safe_spawn_distance_positive() {
        assert!(spawn::SAFE_DISTANCE > ship::RADIUS + asteroid::LARGE_RADIUS_MAX);
        assert!(spawn::MAX_ATTEMPTS > 0);
    }
}
