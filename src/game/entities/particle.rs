use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::game::constants::{ms_to_secs, particle};
use crate::game::entities::{Bounds, Color, DrawData, Entity, EntityKind, Shape};
use crate::util::vec2::Vec2;

/// Cosmetic effect requests, dispatched by the manager to one generator
/// each. Closed set: there is no unknown-kind path to misroute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleEffect {
    /// Radial burst where something blew up; bigger radius, more embers.
    Explosion { center: Vec2, radius: f32 },
    /// Slow chunks that keep a share of the source's motion.
    Debris { center: Vec2, source_velocity: Vec2 },
    /// Short-lived cone aimed back against the impact direction.
    Sparks { center: Vec2, impact_direction: Vec2 },
}

impl ParticleEffect {
    /// Roll the spawn batch for this effect.
    pub fn spawns(&self, rng: &mut impl Rng) -> Vec<ParticleSpawn> {
        match *self {
            ParticleEffect::Explosion { center, radius } => {
                let count = ((radius * particle::EXPLOSION_COUNT_PER_RADIUS) as usize)
                    .clamp(particle::EXPLOSION_COUNT_MIN, particle::EXPLOSION_COUNT_MAX);
                (0..count)
                    .map(|_| {
                        let direction = Vec2::from_angle(rng.gen_range(0.0..TAU));
                        let speed = rng
                            .gen_range(particle::EXPLOSION_SPEED_MIN..particle::EXPLOSION_SPEED_MAX);
                        ParticleSpawn {
                            position: center,
                            velocity: direction * speed,
                            color: Color::EMBER,
                            size: rng.gen_range(
                                particle::EXPLOSION_SIZE_MIN..particle::EXPLOSION_SIZE_MAX,
                            ),
                            lifespan_ms: rng.gen_range(
                                particle::EXPLOSION_LIFESPAN_MS_MIN
                                    ..particle::EXPLOSION_LIFESPAN_MS_MAX,
                            ),
                            drag: particle::EXPLOSION_DRAG,
                            gravity: 0.0,
                        }
                    })
                    .collect()
            }
            ParticleEffect::Debris {
                center,
                source_velocity,
            } => (0..particle::DEBRIS_COUNT)
                .map(|_| {
                    let direction = Vec2::from_angle(rng.gen_range(0.0..TAU));
                    let speed =
                        rng.gen_range(particle::DEBRIS_SPEED_MIN..particle::DEBRIS_SPEED_MAX);
                    ParticleSpawn {
                        position: center,
                        velocity: direction * speed
                            + source_velocity * particle::DEBRIS_INHERITANCE,
                        color: Color::ASH,
                        size: rng.gen_range(particle::DEBRIS_SIZE_MIN..particle::DEBRIS_SIZE_MAX),
                        lifespan_ms: rng.gen_range(
                            particle::DEBRIS_LIFESPAN_MS_MIN..particle::DEBRIS_LIFESPAN_MS_MAX,
                        ),
                        drag: particle::DEBRIS_DRAG,
                        gravity: particle::DEBRIS_GRAVITY,
                    }
                })
                .collect(),
            ParticleEffect::Sparks {
                center,
                impact_direction,
            } => {
                // Sparks fly back against the impact
                let base_angle = (-impact_direction).angle();
                let half_cone = particle::SPARK_CONE_DEGREES.to_radians() * 0.5;
                (0..particle::SPARK_COUNT)
                    .map(|_| {
                        let angle = base_angle + rng.gen_range(-half_cone..half_cone);
                        let speed =
                            rng.gen_range(particle::SPARK_SPEED_MIN..particle::SPARK_SPEED_MAX);
                        ParticleSpawn {
                            position: center,
                            velocity: Vec2::from_angle(angle) * speed,
                            color: Color::SPARK,
                            size: rng
                                .gen_range(particle::SPARK_SIZE_MIN..particle::SPARK_SIZE_MAX),
                            lifespan_ms: rng.gen_range(
                                particle::SPARK_LIFESPAN_MS_MIN..particle::SPARK_LIFESPAN_MS_MAX,
                            ),
                            drag: particle::SPARK_DRAG,
                            gravity: 0.0,
                        }
                    })
                    .collect()
            }
        }
    }
}

/// Spawn descriptor for one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpawn {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Color,
    pub size: f32,
    pub lifespan_ms: f32,
    pub drag: f32,
    pub gravity: f32,
}

/// A cosmetic particle. Never collision-checked; it shrinks and fades over
/// its lifespan, then deactivates. Pooled like projectiles but carries no
/// id since nothing ever references one.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Color,
    /// Size at spawn; rendered size shrinks toward zero over the lifespan.
    size: f32,
    age_ms: f32,
    lifespan_ms: f32,
    /// Fraction of velocity shed per update.
    drag: f32,
    /// Downward acceleration in px/s^2; zero for most effects.
    gravity: f32,
    active: bool,
}

impl Particle {
    pub fn new(spawn: ParticleSpawn) -> Self {
        Self {
            position: spawn.position,
            velocity: spawn.velocity,
            color: spawn.color,
            size: spawn.size,
            age_ms: 0.0,
            lifespan_ms: spawn.lifespan_ms,
            drag: spawn.drag,
            gravity: spawn.gravity,
            active: true,
        }
    }

    /// Recycle a pooled instance.
    pub fn reset(&mut self, spawn: ParticleSpawn) {
        *self = Self::new(spawn);
    }

    /// Remaining life as a 1 -> 0 fraction.
    pub fn life_fraction(&self) -> f32 {
        if self.lifespan_ms <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age_ms / self.lifespan_ms).clamp(0.0, 1.0)
    }

    pub fn current_size(&self) -> f32 {
        self.size * self.life_fraction()
    }

    pub fn alpha(&self) -> f32 {
        self.life_fraction()
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Flat state snapshot for save/restore.
    pub fn config(&self) -> ParticleConfig {
        ParticleConfig {
            position: self.position,
            velocity: self.velocity,
            color: self.color,
            size: self.size,
            age_ms: self.age_ms,
            lifespan_ms: self.lifespan_ms,
            drag: self.drag,
            gravity: self.gravity,
            active: self.active,
        }
    }

    pub fn from_config(config: ParticleConfig) -> Self {
        Self {
            position: config.position,
            velocity: config.velocity,
            color: config.color,
            size: config.size,
            age_ms: config.age_ms,
            lifespan_ms: config.lifespan_ms,
            drag: config.drag,
            gravity: config.gravity,
            active: config.active,
        }
    }
}

/// Serializable mirror of a particle's full state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Color,
    pub size: f32,
    pub age_ms: f32,
    pub lifespan_ms: f32,
    pub drag: f32,
    pub gravity: f32,
    pub active: bool,
}

impl Entity for Particle {
    fn kind(&self) -> EntityKind {
        EntityKind::Particle
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn radius(&self) -> f32 {
        self.current_size()
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn update(&mut self, dt_ms: f32, _bounds: Bounds) {
        let dt = ms_to_secs(dt_ms);
        self.velocity *= 1.0 - self.drag;
        self.velocity.y += self.gravity * dt;
        self.position += self.velocity * dt;
        self.age_ms += dt_ms;
        if self.age_ms >= self.lifespan_ms {
            self.active = false;
        }
    }

    fn draw_data(&self) -> DrawData {
        DrawData {
            kind: EntityKind::Particle,
            position: self.position,
            rotation: 0.0,
            radius: self.current_size(),
            color: self.color,
            alpha: self.alpha(),
            shape: Shape::Circle,
        }
    }
}
