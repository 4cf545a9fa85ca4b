use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f32::consts::TAU;

use crate::game::constants::{asteroid, ms_to_secs};
use crate::game::entities::{Bounds, Color, DrawData, Entity, EntityId, EntityKind, Shape};
use crate::util::vec2::Vec2;

/// Size category. Smaller rocks are faster targets and score higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    /// Base collision radius range for this category, in pixels.
    pub fn radius_range(&self) -> (f32, f32) {
        match self {
            AsteroidSize::Large => (asteroid::LARGE_RADIUS_MIN, asteroid::LARGE_RADIUS_MAX),
            AsteroidSize::Medium => (asteroid::MEDIUM_RADIUS_MIN, asteroid::MEDIUM_RADIUS_MAX),
            AsteroidSize::Small => (asteroid::SMALL_RADIUS_MIN, asteroid::SMALL_RADIUS_MAX),
        }
    }

    /// Score awarded when a rock of this size is destroyed.
    pub fn points(&self) -> u32 {
        match self {
            AsteroidSize::Large => asteroid::LARGE_POINTS,
            AsteroidSize::Medium => asteroid::MEDIUM_POINTS,
            AsteroidSize::Small => asteroid::SMALL_POINTS,
        }
    }

    /// The size fragments take, or `None` for rocks too small to split.
    pub fn smaller(&self) -> Option<AsteroidSize> {
        match self {
            AsteroidSize::Large => Some(AsteroidSize::Medium),
            AsteroidSize::Medium => Some(AsteroidSize::Small),
            AsteroidSize::Small => None,
        }
    }
}

/// Spawn descriptor: everything a new asteroid needs except its identity
/// and shape, which the manager and RNG supply at registration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsteroidSpawn {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: AsteroidSize,
}

/// A drifting rock with an irregular polygon outline.
#[derive(Debug, Clone)]
pub struct Asteroid {
    // Hot data: touched every frame
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub angular_velocity: f32,
    active: bool,
    // Cold data: fixed at creation
    pub size: AsteroidSize,
    radius: f32,
    /// Outline offsets relative to the center, rolled once at creation.
    /// The shape never changes afterwards, wraps and splits included.
    vertices: Vec<Vec2>,
    pub color: Color,
}

impl Asteroid {
    pub fn new(id: EntityId, spawn: AsteroidSpawn, rng: &mut impl Rng) -> Self {
        let (min_r, max_r) = spawn.size.radius_range();
        let radius = rng.gen_range(min_r..max_r);
        Self {
            id,
            position: spawn.position,
            velocity: spawn.velocity,
            rotation: rng.gen_range(0.0..TAU),
            angular_velocity: rng
                .gen_range(-asteroid::MAX_ANGULAR_VELOCITY..asteroid::MAX_ANGULAR_VELOCITY),
            active: true,
            size: spawn.size,
            radius,
            vertices: Self::roll_outline(radius, rng),
            color: Color::ROCK,
        }
    }

    /// 8-12 vertices at evenly spaced angles, each pushed in or out by the
    /// jitter range around the base radius.
    fn roll_outline(radius: f32, rng: &mut impl Rng) -> Vec<Vec2> {
        let count = rng.gen_range(asteroid::VERTEX_COUNT_MIN..=asteroid::VERTEX_COUNT_MAX);
        (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * TAU;
                let r =
                    radius * rng.gen_range(asteroid::VERTEX_JITTER_MIN..asteroid::VERTEX_JITTER_MAX);
                Vec2::from_angle(angle) * r
            })
            .collect()
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Break into fragments of the next-smaller size. Always deactivates
    /// the parent; small rocks return no fragments. Each fragment launches
    /// along a random direction at 50-150 px/s plus 30% of the parent's
    /// velocity, starting 30% of the parent's radius out along the same
    /// direction.
    pub fn split(&mut self, rng: &mut impl Rng) -> SmallVec<[AsteroidSpawn; 3]> {
        self.active = false;
        let mut fragments = SmallVec::new();
        let Some(next_size) = self.size.smaller() else {
            return fragments;
        };
        let count = rng.gen_range(asteroid::SPLIT_COUNT_MIN..=asteroid::SPLIT_COUNT_MAX);
        for _ in 0..count {
            let direction = Vec2::from_angle(rng.gen_range(0.0..TAU));
            let speed =
                rng.gen_range(asteroid::FRAGMENT_SPEED_MIN..asteroid::FRAGMENT_SPEED_MAX);
            fragments.push(AsteroidSpawn {
                position: self.position
                    + direction * (self.radius * asteroid::FRAGMENT_OFFSET_FACTOR),
                velocity: direction * speed
                    + self.velocity * asteroid::PARENT_VELOCITY_FACTOR,
                size: next_size,
            });
        }
        fragments
    }

    pub fn config(&self) -> AsteroidConfig {
        AsteroidConfig {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            rotation: self.rotation,
            angular_velocity: self.angular_velocity,
            size: self.size,
            radius: self.radius,
            vertices: self.vertices.clone(),
            color: self.color,
            active: self.active,
        }
    }

    pub fn from_config(config: AsteroidConfig) -> Self {
        Self {
            id: config.id,
            position: config.position,
            velocity: config.velocity,
            rotation: config.rotation,
            angular_velocity: config.angular_velocity,
            active: config.active,
            size: config.size,
            radius: config.radius,
            vertices: config.vertices,
            color: config.color,
        }
    }
}

impl Entity for Asteroid {
    fn kind(&self) -> EntityKind {
        EntityKind::Asteroid
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn update(&mut self, dt_ms: f32, bounds: Bounds) {
        let dt = ms_to_secs(dt_ms);
        self.position += self.velocity * dt;
        self.rotation += self.angular_velocity * dt;
        // Buffered wrap: the whole outline drifts off screen before the
        // rock re-enters on the far side
        self.position = bounds.wrap_buffered(self.position, self.radius);
    }

    fn draw_data(&self) -> DrawData {
        DrawData {
            kind: EntityKind::Asteroid,
            position: self.position,
            rotation: self.rotation,
            radius: self.radius,
            color: self.color,
            alpha: 1.0,
            shape: Shape::Polygon(self.vertices.clone()),
        }
    }
}

/// Flat snapshot of one asteroid, outline included so the shape survives
/// save and restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidConfig {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub angular_velocity: f32,
    pub size: AsteroidSize,
    pub radius: f32,
    pub vertices: Vec<Vec2>,
    pub color: Color,
    pub active: bool,
}
