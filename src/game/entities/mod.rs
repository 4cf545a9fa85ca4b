pub mod asteroid;
pub mod particle;
pub mod projectile;
pub mod ship;

pub use asteroid::{Asteroid, AsteroidSize, AsteroidSpawn};
pub use particle::{Particle, ParticleEffect};
pub use projectile::{Projectile, ProjectileSpawn};
pub use ship::Ship;

use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

/// Monotonically increasing entity identifier, issued by the manager.
/// Pooled instances keep the id from their true creation.
pub type EntityId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Ship,
    Asteroid,
    Projectile,
    Particle,
}

/// Playfield bounds used for screen wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Hard wrap: crossing an edge teleports to the opposite edge.
    pub fn wrap(&self, position: Vec2) -> Vec2 {
        self.wrap_buffered(position, 0.0)
    }

    /// Wrap with slack: the position may travel `buffer` past an edge
    /// before being teleported to just outside the opposite edge.
    pub fn wrap_buffered(&self, mut position: Vec2, buffer: f32) -> Vec2 {
        if position.x < -buffer {
            position.x = self.width + buffer;
        } else if position.x > self.width + buffer {
            position.x = -buffer;
        }
        if position.y < -buffer {
            position.y = self.height + buffer;
        } else if position.y > self.height + buffer {
            position.y = -buffer;
        }
        position
    }
}

impl Default for Bounds {
    fn default() -> Self {
        use crate::game::constants::screen;
        Self::new(screen::WIDTH, screen::HEIGHT)
    }
}

/// Common capability surface over the concrete entity types. The manager
/// stores concrete vectors per kind; this trait is the seam the physics
/// pass and render assembly work through.
pub trait Entity {
    fn kind(&self) -> EntityKind;
    fn position(&self) -> Vec2;
    fn velocity(&self) -> Vec2;
    fn radius(&self) -> f32;
    fn is_active(&self) -> bool;
    /// Advance by `dt_ms` milliseconds inside `bounds`. Time is always
    /// threaded in from the frame loop; entities never read a clock.
    fn update(&mut self, dt_ms: f32, bounds: Bounds);
    fn draw_data(&self) -> DrawData;
}

/// Borrowed view over one concrete entity, tagged by kind.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Ship(&'a Ship),
    Asteroid(&'a Asteroid),
    Projectile(&'a Projectile),
    Particle(&'a Particle),
}

impl EntityRef<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Ship(_) => EntityKind::Ship,
            EntityRef::Asteroid(_) => EntityKind::Asteroid,
            EntityRef::Projectile(_) => EntityKind::Projectile,
            EntityRef::Particle(_) => EntityKind::Particle,
        }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            EntityRef::Ship(s) => s.position(),
            EntityRef::Asteroid(a) => a.position(),
            EntityRef::Projectile(p) => p.position(),
            EntityRef::Particle(p) => p.position(),
        }
    }

    pub fn draw_data(&self) -> DrawData {
        match self {
            EntityRef::Ship(s) => s.draw_data(),
            EntityRef::Asteroid(a) => a.draw_data(),
            EntityRef::Projectile(p) => p.draw_data(),
            EntityRef::Particle(p) => p.draw_data(),
        }
    }
}

/// Collision identity: which entity a collider snapshot stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderId {
    Ship,
    Asteroid(EntityId),
    Projectile(EntityId),
}

impl ColliderId {
    /// Packs the variant tag and id into one u64 so collision pairs can be
    /// deduplicated through plain integer keys instead of allocated ones.
    #[inline]
    pub fn packed(&self) -> u64 {
        // Top two bits carry the kind; entity ids stay far below 2^62.
        match self {
            ColliderId::Ship => 0,
            ColliderId::Asteroid(id) => (1 << 62) | id,
            ColliderId::Projectile(id) => (2 << 62) | id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            ColliderId::Ship => EntityKind::Ship,
            ColliderId::Asteroid(_) => EntityKind::Asteroid,
            ColliderId::Projectile(_) => EntityKind::Projectile,
        }
    }
}

/// Lightweight copyable snapshot used by collision detection. Built per
/// frame from the active entities; never aliases live entity state.
#[derive(Debug, Clone, Copy)]
pub struct Collider {
    pub id: ColliderId,
    pub position: Vec2,
    pub radius: f32,
}

impl Collider {
    pub fn new(id: ColliderId, position: Vec2, radius: f32) -> Self {
        Self {
            id,
            position,
            radius,
        }
    }
}

/// RGB color carried by drawable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Color = Color::rgb(240, 240, 240);
    pub const SHIP: Color = Color::rgb(120, 200, 255);
    pub const ROCK: Color = Color::rgb(160, 150, 140);
    pub const EMBER: Color = Color::rgb(255, 140, 40);
    pub const ASH: Color = Color::rgb(130, 130, 130);
    pub const SPARK: Color = Color::rgb(255, 230, 90);
}

/// Outline shape for the render layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle,
    /// Vertex offsets relative to the entity position, pre-rotation.
    Polygon(Vec<Vec2>),
}

/// Owned per-entity render payload. Rendering reads a snapshot; nothing
/// here borrows live simulation state.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawData {
    pub kind: EntityKind,
    pub position: Vec2,
    pub rotation: f32,
    pub radius: f32,
    pub color: Color,
    pub alpha: f32,
    pub shape: Shape,
}
