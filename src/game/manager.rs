//! Entity ownership and lifecycle
//!
//! The manager owns every asteroid, projectile and particle, plus the
//! bounded reuse pools and the id counter. Nothing else mutates the
//! collections; the orchestrator goes through the operations here.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::constants::{asteroid as asteroid_consts, pool, spawn};
use crate::game::entities::asteroid::AsteroidConfig;
use crate::game::entities::particle::{ParticleConfig, ParticleSpawn};
use crate::game::entities::projectile::ProjectileConfig;
use crate::game::entities::{
    Asteroid, AsteroidSize, AsteroidSpawn, Bounds, Collider, ColliderId, DrawData, Entity,
    EntityId, EntityKind, EntityRef, Particle, ParticleEffect, Projectile, ProjectileSpawn,
};
use crate::game::state::Difficulty;
use crate::util::vec2::Vec2;

/// Active entity counts plus pool occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub asteroids: usize,
    pub projectiles: usize,
    pub particles: usize,
    pub pooled_projectiles: usize,
    pub pooled_particles: usize,
}

pub struct EntityManager {
    asteroids: Vec<Asteroid>,
    projectiles: Vec<Projectile>,
    particles: Vec<Particle>,
    projectile_pool: Vec<Projectile>,
    particle_pool: Vec<Particle>,
    /// Cap on each pool; reclaimed instances past it are dropped.
    max_pool_size: usize,
    /// Last issued id. Ids are only handed out at true creation; pooled
    /// instances keep theirs.
    next_entity_id: EntityId,
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityManager {
    pub fn new() -> Self {
        Self::with_pool_capacity(pool::MAX_POOL_SIZE)
    }

    pub fn with_pool_capacity(max_pool_size: usize) -> Self {
        Self {
            asteroids: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            projectile_pool: Vec::with_capacity(max_pool_size),
            particle_pool: Vec::with_capacity(max_pool_size),
            max_pool_size,
            next_entity_id: 0,
        }
    }

    fn next_id(&mut self) -> EntityId {
        self.next_entity_id += 1;
        self.next_entity_id
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    pub fn create_asteroid(&mut self, spawn: AsteroidSpawn, rng: &mut impl Rng) -> EntityId {
        let id = self.next_id();
        self.asteroids.push(Asteroid::new(id, spawn, rng));
        id
    }

    /// Spawn a field of `count` asteroids with uniform random placement,
    /// none closer than the safe distance to `avoid`. Placement retries up
    /// to the attempt cap and then keeps the last candidate. The size mix
    /// is keyed by difficulty; drift speed scales with `speed_multiplier`.
    pub fn create_asteroid_field(
        &mut self,
        count: u32,
        avoid: Vec2,
        difficulty: Difficulty,
        speed_multiplier: f32,
        bounds: Bounds,
        rng: &mut impl Rng,
    ) {
        for _ in 0..count {
            let size = Self::roll_size(difficulty, rng);
            let position = Self::place_clear_of(avoid, bounds, rng);
            let direction = Vec2::from_angle(rng.gen_range(0.0..std::f32::consts::TAU));
            let speed = rng
                .gen_range(asteroid_consts::FIELD_SPEED_MIN..asteroid_consts::FIELD_SPEED_MAX)
                * speed_multiplier;
            self.create_asteroid(
                AsteroidSpawn {
                    position,
                    velocity: direction * speed,
                    size,
                },
                rng,
            );
        }
        debug!(
            count,
            ?difficulty,
            speed_multiplier,
            "spawned asteroid field"
        );
    }

    /// Weighted size roll. Easy fields skew large and slow to carve up;
    /// hard fields skew small.
    fn roll_size(difficulty: Difficulty, rng: &mut impl Rng) -> AsteroidSize {
        let weights = difficulty.asteroid_size_weights();
        let total: f32 = weights.iter().map(|(_, w)| w).sum();
        let mut roll = rng.gen_range(0.0..total);
        for (size, weight) in weights {
            if roll < weight {
                return size;
            }
            roll -= weight;
        }
        AsteroidSize::Large
    }

    /// Uniform position over the playfield, resampled while it lands
    /// within the safe distance of `avoid`. After the attempt budget the
    /// last candidate is kept - crowded screens stay playable at the
    /// price of an occasional close spawn.
    fn place_clear_of(avoid: Vec2, bounds: Bounds, rng: &mut impl Rng) -> Vec2 {
        let mut candidate = Vec2::ZERO;
        for attempt in 0..spawn::MAX_ATTEMPTS {
            candidate = Vec2::new(
                rng.gen_range(0.0..bounds.width),
                rng.gen_range(0.0..bounds.height),
            );
            if candidate.distance_sq_to(avoid) >= spawn::SAFE_DISTANCE * spawn::SAFE_DISTANCE {
                return candidate;
            }
            if attempt + 1 == spawn::MAX_ATTEMPTS {
                debug!(?candidate, "placement attempts exhausted, keeping last");
            }
        }
        candidate
    }

    /// Launch a projectile, pool-first: a reclaimed instance is relaunched
    /// with its original id, otherwise a fresh one is created.
    pub fn create_projectile(&mut self, spawn: ProjectileSpawn) -> EntityId {
        if let Some(mut recycled) = self.projectile_pool.pop() {
            recycled.reset(spawn);
            let id = recycled.id;
            self.projectiles.push(recycled);
            id
        } else {
            let id = self.next_id();
            self.projectiles.push(Projectile::new(id, spawn));
            id
        }
    }

    /// Spawn the particle batch for one effect, pool-first per particle.
    pub fn create_particle_effect(&mut self, effect: ParticleEffect, rng: &mut impl Rng) {
        for spawn in effect.spawns(rng) {
            self.spawn_particle(spawn);
        }
    }

    fn spawn_particle(&mut self, spawn: ParticleSpawn) {
        if let Some(mut recycled) = self.particle_pool.pop() {
            recycled.reset(spawn);
            self.particles.push(recycled);
        } else {
            self.particles.push(Particle::new(spawn));
        }
    }

    // ------------------------------------------------------------------
    // Destruction
    // ------------------------------------------------------------------

    /// Destroy an asteroid: explosion burst sized by its radius, split
    /// into registered fragments, parent deactivated - all in one call,
    /// so no frame ever sees parent and fragments live together.
    ///
    /// Returns the destroyed size for scoring, or `None` when the id is
    /// unknown or already inactive (stale ids never double-score).
    pub fn destroy_asteroid(
        &mut self,
        id: EntityId,
        rng: &mut impl Rng,
    ) -> Option<AsteroidSize> {
        let Some(index) = self
            .asteroids
            .iter()
            .position(|a| a.id == id && a.is_active())
        else {
            debug!(id, "ignoring destroy for unknown or inactive asteroid");
            return None;
        };
        let center = self.asteroids[index].position();
        let radius = self.asteroids[index].radius();
        let size = self.asteroids[index].size;
        let fragments = self.asteroids[index].split(rng);
        self.create_particle_effect(
            ParticleEffect::Explosion { center, radius },
            rng,
        );
        for fragment in fragments {
            self.create_asteroid(fragment, rng);
        }
        Some(size)
    }

    /// Destroy a projectile with a spark burst against its travel
    /// direction. Returns false when the id is unknown or already spent;
    /// repeat calls for the same id do nothing, so one projectile can
    /// never claim two rocks in the same frame.
    pub fn destroy_projectile(&mut self, id: EntityId, rng: &mut impl Rng) -> bool {
        let Some(index) = self
            .projectiles
            .iter()
            .position(|p| p.id == id && p.is_active())
        else {
            return false;
        };
        let center = self.projectiles[index].position();
        let impact_direction = self.projectiles[index].velocity().normalize();
        self.projectiles[index].deactivate();
        self.create_particle_effect(
            ParticleEffect::Sparks {
                center,
                impact_direction,
            },
            rng,
        );
        true
    }

    // ------------------------------------------------------------------
    // Frame upkeep
    // ------------------------------------------------------------------

    /// Advance every active entity, then reclaim the inactive ones.
    pub fn update(&mut self, dt_ms: f32, bounds: Bounds) {
        self.for_each_active_entity_mut(&mut |entity: &mut dyn Entity| {
            entity.update(dt_ms, bounds);
        });
        self.reclaim_inactive();
    }

    /// Drop inactive asteroids; return inactive projectiles and particles
    /// to their pools while capacity lasts, dropping the rest. Runs before
    /// the next collision pass so deactivated entities never linger in the
    /// active collections across frames.
    pub fn reclaim_inactive(&mut self) {
        self.asteroids.retain(|a| a.is_active());

        let mut index = 0;
        while index < self.projectiles.len() {
            if self.projectiles[index].is_active() {
                index += 1;
                continue;
            }
            let reclaimed = self.projectiles.swap_remove(index);
            if self.projectile_pool.len() < self.max_pool_size {
                self.projectile_pool.push(reclaimed);
            }
        }

        let mut index = 0;
        while index < self.particles.len() {
            if self.particles[index].is_active() {
                index += 1;
                continue;
            }
            let reclaimed = self.particles.swap_remove(index);
            if self.particle_pool.len() < self.max_pool_size {
                self.particle_pool.push(reclaimed);
            }
        }
    }

    /// Deactivate and drop everything, pools included.
    pub fn clear_all_entities(&mut self) {
        self.asteroids.clear();
        self.projectiles.clear();
        self.particles.clear();
        self.projectile_pool.clear();
        self.particle_pool.clear();
    }

    pub fn for_each_active_entity_mut(&mut self, f: &mut dyn FnMut(&mut dyn Entity)) {
        for a in self.asteroids.iter_mut().filter(|a| a.is_active()) {
            f(a);
        }
        for p in self.projectiles.iter_mut().filter(|p| p.is_active()) {
            f(p);
        }
        for p in self.particles.iter_mut().filter(|p| p.is_active()) {
            f(p);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Collision snapshots for the active asteroids and projectiles. The
    /// ship is not managed here; the caller appends its collider.
    pub fn active_colliders(&self) -> Vec<Collider> {
        let mut colliders = Vec::with_capacity(self.asteroids.len() + self.projectiles.len());
        colliders.extend(self.asteroids.iter().filter(|a| a.is_active()).map(|a| {
            Collider::new(ColliderId::Asteroid(a.id), a.position(), a.radius())
        }));
        colliders.extend(self.projectiles.iter().filter(|p| p.is_active()).map(|p| {
            Collider::new(ColliderId::Projectile(p.id), p.position(), p.radius())
        }));
        colliders
    }

    /// Active entities of one kind. `Ship` yields nothing - the ship is
    /// not a managed entity.
    pub fn entities_by_kind(&self, kind: EntityKind) -> Vec<EntityRef<'_>> {
        match kind {
            EntityKind::Ship => Vec::new(),
            EntityKind::Asteroid => self
                .asteroids
                .iter()
                .filter(|a| a.is_active())
                .map(EntityRef::Asteroid)
                .collect(),
            EntityKind::Projectile => self
                .projectiles
                .iter()
                .filter(|p| p.is_active())
                .map(EntityRef::Projectile)
                .collect(),
            EntityKind::Particle => self
                .particles
                .iter()
                .filter(|p| p.is_active())
                .map(EntityRef::Particle)
                .collect(),
        }
    }

    pub fn entity_counts(&self) -> EntityCounts {
        EntityCounts {
            asteroids: self.asteroids.iter().filter(|a| a.is_active()).count(),
            projectiles: self.projectiles.iter().filter(|p| p.is_active()).count(),
            particles: self.particles.iter().filter(|p| p.is_active()).count(),
            pooled_projectiles: self.projectile_pool.len(),
            pooled_particles: self.particle_pool.len(),
        }
    }

    /// Render payload for the drawable managed entities, ship excluded.
    pub fn draw_entities(&self) -> Vec<DrawData> {
        self.asteroids
            .iter()
            .filter(|a| a.is_active())
            .map(|a| a.draw_data())
            .chain(
                self.projectiles
                    .iter()
                    .filter(|p| p.is_active())
                    .map(|p| p.draw_data()),
            )
            .collect()
    }

    pub fn draw_particles(&self) -> Vec<DrawData> {
        self.particles
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.draw_data())
            .collect()
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> ManagerSnapshot {
        ManagerSnapshot {
            next_entity_id: self.next_entity_id,
            asteroids: self.asteroids.iter().map(|a| a.config()).collect(),
            projectiles: self.projectiles.iter().map(|p| p.config()).collect(),
            particles: self.particles.iter().map(|p| p.config()).collect(),
        }
    }

    /// Rebuild from a snapshot. Pools restart empty; id monotonicity is
    /// preserved through the saved counter.
    pub fn restore(snapshot: ManagerSnapshot, max_pool_size: usize) -> Self {
        let mut manager = Self::with_pool_capacity(max_pool_size);
        manager.next_entity_id = snapshot.next_entity_id;
        manager.asteroids = snapshot
            .asteroids
            .into_iter()
            .map(Asteroid::from_config)
            .collect();
        manager.projectiles = snapshot
            .projectiles
            .into_iter()
            .map(Projectile::from_config)
            .collect();
        manager.particles = snapshot
            .particles
            .into_iter()
            .map(Particle::from_config)
            .collect();
        manager
    }
}

/// Flat snapshot of the managed entities and the id counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerSnapshot {
    pub next_entity_id: EntityId,
    pub asteroids: Vec<AsteroidConfig>,
    pub projectiles: Vec<ProjectileConfig>,
    pub particles: Vec<ParticleConfig>,
}
