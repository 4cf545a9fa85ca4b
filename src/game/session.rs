//! Session orchestration
//!
//! `Game` owns the whole simulation: state machine, entities, physics
//! and the ship. `advance_frame` runs one frame in a fixed order -
//! input, steering and auto-fire, movement, reclaim, collision
//! detection, resolution, level completion - and reports what happened
//! as a list of events for the embedding layer.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::GameConfig;
use crate::game::constants::{frame, level as level_consts};
use crate::game::entities::ship::ShipConfig;
use crate::game::entities::{
    AsteroidSize, Bounds, Collider, ColliderId, Color, DrawData, Entity, EntityId, ParticleEffect,
    Ship,
};
use crate::game::input::InputState;
use crate::game::manager::{EntityManager, ManagerSnapshot};
use crate::game::physics::{Collision, PhysicsEngine};
use crate::game::state::{Difficulty, GamePhase, GameState, UiSnapshot};

/// What a frame did, for the embedding layer to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    ShotFired {
        projectile: EntityId,
    },
    AsteroidDestroyed {
        asteroid: EntityId,
        size: AsteroidSize,
        points: u32,
    },
    ShipHit {
        lives_left: u32,
    },
    ExtraLife {
        lives: u32,
    },
    LevelComplete {
        level: u32,
        bonus: u32,
    },
    GameOver {
        score: u32,
        level: u32,
    },
}

/// Owned render payload for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    /// Ship (while one is in play) followed by asteroids and projectiles.
    pub entities: Vec<DrawData>,
    pub particles: Vec<DrawData>,
    pub ui: UiSnapshot,
}

pub struct Game {
    config: GameConfig,
    bounds: Bounds,
    state: GameState,
    manager: EntityManager,
    physics: PhysicsEngine,
    ship: Ship,
    rng: StdRng,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let bounds = config.bounds();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: GameState::new(config.difficulty),
            manager: EntityManager::with_pool_capacity(config.max_pool_size),
            physics: PhysicsEngine::new(bounds),
            ship: Ship::new(bounds.center(), Color::SHIP),
            bounds,
            rng,
            config,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn manager(&self) -> &EntityManager {
        &self.manager
    }

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Everything currently simulated, for pacing diagnostics.
    pub fn entity_total(&self) -> usize {
        let counts = self.manager.entity_counts();
        let ship = matches!(
            self.state.phase(),
            GamePhase::Playing | GamePhase::Paused
        ) as usize;
        ship + counts.asteroids + counts.projectiles + counts.particles
    }

    /// Begin a session: fresh ship at the center, fresh field around it.
    /// Returns false when the phase does not allow starting.
    pub fn start_new_game(&mut self, difficulty: Difficulty, color: Color) -> bool {
        if !self.state.start_new_game(difficulty) {
            return false;
        }
        self.manager.clear_all_entities();
        self.ship = Ship::new(self.bounds.center(), color);
        self.seed_field();
        true
    }

    /// Abandon the session and clear the playfield.
    pub fn return_to_menu(&mut self) {
        if self.state.phase() == GamePhase::Menu {
            return;
        }
        self.state.return_to_menu();
        self.manager.clear_all_entities();
    }

    /// Run one frame. `dt_ms` is wall time since the last frame; it is
    /// clamped so a stalled frame slows the game down instead of
    /// teleporting everything.
    pub fn advance_frame(&mut self, dt_ms: f32, input: &InputState) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let dt_ms = dt_ms.clamp(0.0, frame::MAX_DELTA_MS);

        // Pause and escape stay responsive in every phase
        if input.pause {
            self.state.toggle_pause();
        }
        if input.escape {
            self.return_to_menu();
        }
        if !self.state.is_playing() {
            return events;
        }

        self.state.accrue_time(dt_ms);

        // Steering is held state; firing is automatic whenever the
        // cooldown allows
        self.ship.set_controls(input.turn_direction(), input.thrust);
        if let Some(spawn) = self.ship.try_fire() {
            let projectile = self.manager.create_projectile(spawn);
            self.state.record_shot_fired();
            events.push(GameEvent::ShotFired { projectile });
        }

        let report = self
            .physics
            .update_entities(&mut self.ship, &mut self.manager, dt_ms);
        trace!(updated = report.updated, wraps = report.wraps, "advanced");
        self.manager.reclaim_inactive();

        let mut colliders = self.manager.active_colliders();
        colliders.push(Collider::new(
            ColliderId::Ship,
            self.ship.position(),
            self.ship.radius(),
        ));
        let collisions = self.physics.detect_collisions(&colliders);
        for hit in &collisions {
            self.resolve_hit(hit, &mut events);
        }

        if self.state.is_playing() && self.manager.entity_counts().asteroids == 0 {
            self.complete_level(&mut events);
        }

        events
    }

    fn resolve_hit(&mut self, hit: &Collision, events: &mut Vec<GameEvent>) {
        match (hit.a, hit.b) {
            (ColliderId::Ship, ColliderId::Asteroid(_)) => {
                let crash_site = self.ship.position();
                let crash_velocity = self.ship.velocity();
                if self.ship.hit_by_asteroid(self.bounds) {
                    self.manager.create_particle_effect(
                        ParticleEffect::Debris {
                            center: crash_site,
                            source_velocity: crash_velocity,
                        },
                        &mut self.rng,
                    );
                    let lives_left = self.state.lose_life();
                    events.push(GameEvent::ShipHit { lives_left });
                    if self.state.phase() == GamePhase::GameOver {
                        events.push(GameEvent::GameOver {
                            score: self.state.score(),
                            level: self.state.level(),
                        });
                    }
                }
            }
            (ColliderId::Asteroid(asteroid), ColliderId::Projectile(projectile)) => {
                // A spent projectile cannot claim a second rock this frame
                if !self.manager.destroy_projectile(projectile, &mut self.rng) {
                    return;
                }
                if let Some(size) = self.manager.destroy_asteroid(asteroid, &mut self.rng) {
                    let granted = self.state.record_asteroid_destroyed(size);
                    events.push(GameEvent::AsteroidDestroyed {
                        asteroid,
                        size,
                        points: size.points(),
                    });
                    if granted {
                        events.push(GameEvent::ExtraLife {
                            lives: self.state.lives(),
                        });
                    }
                }
            }
            // Rocks grind past each other and shots pass through the
            // ship; both pairs are detected but carry no game response.
            _ => {}
        }
    }

    fn complete_level(&mut self, events: &mut Vec<GameEvent>) {
        let completed = self.state.level();
        let granted = self.state.award_level_bonus();
        events.push(GameEvent::LevelComplete {
            level: completed,
            bonus: level_consts::CLEAR_BONUS,
        });
        if granted {
            events.push(GameEvent::ExtraLife {
                lives: self.state.lives(),
            });
        }
        self.state.advance_level();
        self.seed_field();
    }

    fn seed_field(&mut self) {
        let count = self.state.asteroid_count_for_level();
        let multiplier = self.state.speed_multiplier_for_level();
        self.manager.create_asteroid_field(
            count,
            self.ship.position(),
            self.state.difficulty(),
            multiplier,
            self.bounds,
            &mut self.rng,
        );
        debug!(level = self.state.level(), count, "field seeded");
    }

    /// Assemble the owned render payload for this frame.
    pub fn render_frame(&self) -> RenderFrame {
        let mut entities = Vec::new();
        if matches!(
            self.state.phase(),
            GamePhase::Playing | GamePhase::Paused
        ) {
            entities.push(self.ship.draw_data());
        }
        entities.extend(self.manager.draw_entities());
        RenderFrame {
            entities,
            particles: self.manager.draw_particles(),
            ui: self.state.ui_snapshot(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            bounds: self.bounds,
            state: self.state.clone(),
            ship: self.ship.config(),
            entities: self.manager.snapshot(),
        }
    }

    /// Rebuild a session from a snapshot. The RNG and pools restart
    /// fresh; everything observable is restored.
    pub fn restore(config: GameConfig, snapshot: SessionSnapshot) -> Self {
        let bounds = snapshot.bounds;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: snapshot.state,
            manager: EntityManager::restore(snapshot.entities, config.max_pool_size),
            physics: PhysicsEngine::new(bounds),
            ship: Ship::from_config(snapshot.ship),
            bounds,
            rng,
            config,
        }
    }
}

/// Full serializable session: state, ship and entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub bounds: Bounds,
    pub state: GameState,
    pub ship: ShipConfig,
    pub entities: ManagerSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::ms_to_secs;
    use crate::game::entities::AsteroidSpawn;
    use crate::util::vec2::Vec2;

    fn fixed_game() -> Game {
        let config = GameConfig {
            seed: Some(0x0a57_e801),
            ..GameConfig::default()
        };
        Game::new(config)
    }

    fn idle() -> InputState {
        InputState::default()
    }

    /// A playing session with the seeded field removed and a single
    /// motionless rock overlapping the ship, offset sideways so the
    /// upward stream of auto-fired shots never touches it.
    fn game_with_ship_contact(difficulty: Difficulty) -> Game {
        let mut game = fixed_game();
        assert!(game.start_new_game(difficulty, Color::SHIP));
        game.manager.clear_all_entities();
        let rock = game.ship.position() + Vec2::new(18.0, 0.0);
        game.manager.create_asteroid(
            AsteroidSpawn {
                position: rock,
                velocity: Vec2::ZERO,
                size: AsteroidSize::Small,
            },
            &mut game.rng,
        );
        game
    }

    fn count_shots(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::ShotFired { .. }))
            .count()
    }

    #[test]
    fn test_start_new_game_seeds_medium_field() {
        let mut game = fixed_game();
        assert!(game.start_new_game(Difficulty::Medium, Color::SHIP));
        assert_eq!(game.state().lives(), 3);
        assert_eq!(game.state().level(), 1);
        assert_eq!(game.manager().entity_counts().asteroids, 5);
        let ship = game.ship().position();
        for a in game.manager().asteroids() {
            assert!(a.position().distance_to(ship) >= 120.0);
        }
    }

    #[test]
    fn test_full_clear_advances_level_with_bonus() {
        let mut game = fixed_game();
        game.start_new_game(Difficulty::Medium, Color::SHIP);

        // Carve the whole field down, fragments included, crediting the
        // score exactly as projectile hits would
        let mut expected = 0u32;
        loop {
            let ids: Vec<EntityId> = game
                .manager
                .asteroids()
                .iter()
                .filter(|a| a.is_active())
                .map(|a| a.id)
                .collect();
            if ids.is_empty() {
                break;
            }
            for id in ids {
                if let Some(size) = game.manager.destroy_asteroid(id, &mut game.rng) {
                    expected += size.points();
                    game.state.record_asteroid_destroyed(size);
                }
            }
            game.manager.reclaim_inactive();
        }
        assert!(expected > 0);

        let events = game.advance_frame(16.0, &idle());
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::LevelComplete { level: 1, bonus: 500 })));
        assert_eq!(game.state().score(), expected + 500);
        assert_eq!(game.state().level(), 2);

        // Fresh field sized by the level formula, clear of the ship
        assert_eq!(
            game.manager().entity_counts().asteroids,
            game.state().asteroid_count_for_level() as usize
        );
        let ship = game.ship().position();
        for a in game.manager().asteroids() {
            assert!(a.position().distance_to(ship) >= 120.0);
        }
    }

    #[test]
    fn test_ship_hit_respawns_with_protection() {
        let mut game = game_with_ship_contact(Difficulty::Medium);
        let events = game.advance_frame(16.0, &idle());
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::ShipHit { lives_left: 2 })));
        assert_eq!(game.state().lives(), 2);
        assert_eq!(game.ship().position(), game.bounds().center());
        assert_eq!(game.ship().velocity(), Vec2::ZERO);
        assert!(game.ship().is_invulnerable());
    }

    #[test]
    fn test_second_hit_inside_window_ignored() {
        let mut game = game_with_ship_contact(Difficulty::Medium);
        game.advance_frame(16.0, &idle());
        assert_eq!(game.state().lives(), 2);

        // The rock still overlaps the respawned ship; stay inside the
        // 2000 ms window the whole time
        for _ in 0..100 {
            game.advance_frame(16.0, &idle());
        }
        assert_eq!(game.state().lives(), 2, "protected ship must not lose lives");

        // Ride out the window; the standing contact hits again
        let mut hit_again = false;
        for _ in 0..40 {
            let events = game.advance_frame(16.0, &idle());
            if events.iter().any(|e| matches!(e, GameEvent::ShipHit { .. })) {
                hit_again = true;
                break;
            }
        }
        assert!(hit_again, "expired window must expose the ship again");
        assert_eq!(game.state().lives(), 1);
    }

    #[test]
    fn test_game_over_freezes_session() {
        let mut game = game_with_ship_contact(Difficulty::Hard);
        assert_eq!(game.state().lives(), 2);
        game.advance_frame(16.0, &idle());
        assert_eq!(game.state().lives(), 1);

        // Wait out the protection window, then take the final hit
        let mut over = false;
        for _ in 0..200 {
            let events = game.advance_frame(16.0, &idle());
            if events
                .iter()
                .any(|e| matches!(e, GameEvent::GameOver { .. }))
            {
                over = true;
                break;
            }
        }
        assert!(over);
        assert_eq!(game.state().phase(), GamePhase::GameOver);

        let score_at_end = game.state().score();
        for _ in 0..10 {
            let events = game.advance_frame(16.0, &idle());
            assert!(events.is_empty(), "dead sessions emit nothing");
        }
        assert_eq!(game.state().score(), score_at_end);

        // GameOver -> Playing is allowed again
        assert!(game.start_new_game(Difficulty::Medium, Color::SHIP));
        assert_eq!(game.state().lives(), 3);
    }

    #[test]
    fn test_auto_fire_cadence() {
        let mut game = fixed_game();
        game.start_new_game(Difficulty::Medium, Color::SHIP);
        let mut shots = 0;
        for _ in 0..100 {
            shots += count_shots(&game.advance_frame(16.0, &idle()));
        }
        // 250 ms cooldown at 16 ms frames: frames 0, 16, 32, ...
        assert_eq!(shots, 7);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut game = fixed_game();
        game.start_new_game(Difficulty::Medium, Color::SHIP);

        // A stalled frame advances by the clamp ceiling, not by wall time
        let before: Vec<(EntityId, Vec2, Vec2)> = game
            .manager()
            .asteroids()
            .iter()
            .map(|a| (a.id, a.position(), a.velocity()))
            .collect();
        game.advance_frame(10_000.0, &idle());
        assert_eq!(game.state().elapsed_ms(), frame::MAX_DELTA_MS);
        let step = ms_to_secs(frame::MAX_DELTA_MS);
        for (id, position, velocity) in before {
            let moved = game
                .manager()
                .asteroids()
                .iter()
                .find(|a| a.id == id)
                .unwrap()
                .position();
            assert!(moved.approx_eq(position + velocity * step, 1e-3));
        }

        // A negative delta is a dead frame: nothing moves, nothing accrues
        let held: Vec<Vec2> = game
            .manager()
            .asteroids()
            .iter()
            .map(|a| a.position())
            .collect();
        game.advance_frame(-5.0, &idle());
        let after: Vec<Vec2> = game
            .manager()
            .asteroids()
            .iter()
            .map(|a| a.position())
            .collect();
        assert_eq!(after, held);
        assert_eq!(game.state().elapsed_ms(), frame::MAX_DELTA_MS);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut game = fixed_game();
        game.start_new_game(Difficulty::Medium, Color::SHIP);
        game.advance_frame(16.0, &idle());
        let positions: Vec<Vec2> = game
            .manager()
            .asteroids()
            .iter()
            .map(|a| a.position())
            .collect();
        let elapsed = game.state().elapsed_ms();

        let pause = InputState {
            pause: true,
            ..InputState::default()
        };
        game.advance_frame(16.0, &pause);
        assert_eq!(game.state().phase(), GamePhase::Paused);

        for _ in 0..20 {
            assert!(game.advance_frame(16.0, &idle()).is_empty());
        }
        let frozen: Vec<Vec2> = game
            .manager()
            .asteroids()
            .iter()
            .map(|a| a.position())
            .collect();
        assert_eq!(frozen, positions, "paused entities must not move");
        assert_eq!(game.state().elapsed_ms(), elapsed);

        game.advance_frame(16.0, &pause);
        assert_eq!(game.state().phase(), GamePhase::Playing);
    }

    #[test]
    fn test_escape_returns_to_menu_and_clears() {
        let mut game = fixed_game();
        game.start_new_game(Difficulty::Medium, Color::SHIP);
        game.advance_frame(16.0, &idle());
        let escape = InputState {
            escape: true,
            ..InputState::default()
        };
        game.advance_frame(16.0, &escape);
        assert_eq!(game.state().phase(), GamePhase::Menu);
        assert_eq!(game.manager().entity_counts().asteroids, 0);
        assert_eq!(game.manager().entity_counts().projectiles, 0);
    }

    #[test]
    fn test_render_frame_layers() {
        let mut game = fixed_game();
        let menu_frame = game.render_frame();
        assert!(menu_frame.entities.is_empty());

        game.start_new_game(Difficulty::Medium, Color::SHIP);
        let frame = game.render_frame();
        assert_eq!(frame.entities.len(), 1 + 5, "ship plus the seeded field");
        assert_eq!(
            frame.entities[0].kind,
            crate::game::entities::EntityKind::Ship
        );
        assert_eq!(frame.ui.lives, 3);
    }

    #[test]
    fn test_snapshot_restores_session() {
        let mut game = fixed_game();
        game.start_new_game(Difficulty::Hard, Color::SHIP);
        for _ in 0..30 {
            game.advance_frame(16.0, &idle());
        }
        let snapshot = game.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);

        let mut restored = Game::restore(game.config().clone(), back);
        assert_eq!(restored.state(), game.state());
        assert_eq!(
            restored.manager().entity_counts().asteroids,
            game.manager().entity_counts().asteroids
        );
        assert_eq!(restored.ship().position(), game.ship().position());

        // The restored session keeps simulating
        restored.advance_frame(16.0, &idle());
    }

    #[test]
    fn test_dead_frames_in_menu() {
        let mut game = fixed_game();
        assert!(game.advance_frame(16.0, &idle()).is_empty());
        assert_eq!(game.entity_total(), 0);
    }
}
