//! Score, lives, level and phase bookkeeping
//!
//! `GameState` is the single authority on score and phase. Calls that
//! make no sense in the current phase are ignored rather than errored;
//! the session loop never has to branch on phase before reporting.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::game::constants::{
    asteroids_for_level, level as level_consts, speed_multiplier_for_level,
};
use crate::game::entities::AsteroidSize;

/// Difficulty presets. Each row fixes the starting lives, how many rocks
/// seed a level, the baseline drift speed and how much score buys an
/// extra life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse a difficulty label, case-insensitive. Unknown labels fall
    /// back to Medium with a warning instead of failing startup.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" | "normal" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            other => {
                warn!(value = other, "unknown difficulty, using medium");
                Difficulty::Medium
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn starting_lives(&self) -> u32 {
        match self {
            Difficulty::Easy => 4,
            Difficulty::Medium => 3,
            Difficulty::Hard => 2,
        }
    }

    /// Asteroid count seeding level 1; later levels grow from this.
    pub fn base_asteroid_count(&self) -> u32 {
        match self {
            Difficulty::Easy => 4,
            Difficulty::Medium => 5,
            Difficulty::Hard => 6,
        }
    }

    pub fn base_speed_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 1.3,
        }
    }

    /// Score distance between extra-life thresholds.
    pub fn extra_life_interval(&self) -> u32 {
        match self {
            Difficulty::Easy => 5_000,
            Difficulty::Medium => 7_500,
            Difficulty::Hard => 10_000,
        }
    }

    /// Size mix for freshly seeded fields. Easy skews toward large rocks
    /// that are slow to carve up; hard leads with the small fast ones.
    pub fn asteroid_size_weights(&self) -> [(AsteroidSize, f32); 3] {
        match self {
            Difficulty::Easy => [
                (AsteroidSize::Large, 0.55),
                (AsteroidSize::Medium, 0.30),
                (AsteroidSize::Small, 0.15),
            ],
            Difficulty::Medium => [
                (AsteroidSize::Large, 0.40),
                (AsteroidSize::Medium, 0.35),
                (AsteroidSize::Small, 0.25),
            ],
            Difficulty::Hard => [
                (AsteroidSize::Large, 0.25),
                (AsteroidSize::Medium, 0.40),
                (AsteroidSize::Small, 0.35),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Where points came from, for score logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSource {
    Asteroid(AsteroidSize),
    LevelBonus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    phase: GamePhase,
    difficulty: Difficulty,
    score: u32,
    lives: u32,
    level: u32,
    shots_fired: u32,
    shots_hit: u32,
    asteroids_destroyed: u32,
    /// Wall time spent in the Playing phase, in ms.
    elapsed_ms: f32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Difficulty::Medium)
    }
}

impl GameState {
    /// A fresh state sitting in the menu.
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            phase: GamePhase::Menu,
            difficulty,
            score: 0,
            lives: difficulty.starting_lives(),
            level: 1,
            shots_fired: 0,
            shots_hit: 0,
            asteroids_destroyed: 0,
            elapsed_ms: 0.0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn shots_fired(&self) -> u32 {
        self.shots_fired
    }

    pub fn shots_hit(&self) -> u32 {
        self.shots_hit
    }

    pub fn asteroids_destroyed(&self) -> u32 {
        self.asteroids_destroyed
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Hit rate over the session, 0.0 before the first shot.
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.shots_hit as f32 / self.shots_fired as f32
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    // ------------------------------------------------------------------
    // Phase transitions
    // ------------------------------------------------------------------

    /// Menu/GameOver -> Playing, resetting every session counter.
    /// Returns false (and changes nothing) from Playing or Paused.
    pub fn start_new_game(&mut self, difficulty: Difficulty) -> bool {
        match self.phase {
            GamePhase::Menu | GamePhase::GameOver => {
                *self = Self::new(difficulty);
                self.phase = GamePhase::Playing;
                info!(difficulty = difficulty.label(), lives = self.lives, "new game");
                true
            }
            _ => {
                debug!(phase = ?self.phase, "ignoring start_new_game");
                false
            }
        }
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
        } else {
            debug!(phase = ?self.phase, "ignoring pause");
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        } else {
            debug!(phase = ?self.phase, "ignoring resume");
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => {}
        }
    }

    /// Take one life; hitting zero ends the game. Returns the lives left.
    pub fn lose_life(&mut self) -> u32 {
        if self.phase != GamePhase::Playing {
            debug!(phase = ?self.phase, "ignoring lose_life");
            return self.lives;
        }
        self.lives = self.lives.saturating_sub(1);
        debug!(lives = self.lives, "life lost");
        if self.lives == 0 {
            self.end_game();
        }
        self.lives
    }

    pub fn end_game(&mut self) {
        match self.phase {
            GamePhase::Playing | GamePhase::Paused => {
                self.phase = GamePhase::GameOver;
                info!(
                    score = self.score,
                    level = self.level,
                    elapsed_ms = self.elapsed_ms,
                    accuracy = self.accuracy(),
                    "game over"
                );
            }
            _ => debug!(phase = ?self.phase, "ignoring end_game"),
        }
    }

    pub fn return_to_menu(&mut self) {
        match self.phase {
            GamePhase::Playing | GamePhase::Paused | GamePhase::GameOver => {
                self.phase = GamePhase::Menu;
            }
            GamePhase::Menu => {}
        }
    }

    // ------------------------------------------------------------------
    // Scoring and statistics
    // ------------------------------------------------------------------

    /// Add points while Playing. Crossing an extra-life threshold grants
    /// exactly one life per call, however many thresholds the jump spans.
    /// Returns whether a life was granted.
    pub fn add_score(&mut self, points: u32, source: ScoreSource) -> bool {
        if self.phase != GamePhase::Playing {
            debug!(points, ?source, phase = ?self.phase, "ignoring score outside play");
            return false;
        }
        let interval = self.difficulty.extra_life_interval();
        let old_bucket = self.score / interval;
        self.score += points;
        let new_bucket = self.score / interval;
        debug!(points, ?source, total = self.score, "score");
        if new_bucket > old_bucket {
            self.lives += 1;
            info!(score = self.score, lives = self.lives, "extra life");
            true
        } else {
            false
        }
    }

    pub fn record_shot_fired(&mut self) {
        if self.phase == GamePhase::Playing {
            self.shots_fired += 1;
        }
    }

    /// Count a destroyed asteroid and score it by size. Returns whether
    /// the points crossed an extra-life threshold.
    pub fn record_asteroid_destroyed(&mut self, size: AsteroidSize) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.asteroids_destroyed += 1;
        self.shots_hit += 1;
        self.add_score(size.points(), ScoreSource::Asteroid(size))
    }

    /// Flat bonus for clearing a level.
    pub fn award_level_bonus(&mut self) -> bool {
        self.add_score(level_consts::CLEAR_BONUS, ScoreSource::LevelBonus)
    }

    /// Bump the level counter; the caller seeds the next field from the
    /// level formulas. Returns the new level.
    pub fn advance_level(&mut self) -> u32 {
        if self.phase == GamePhase::Playing {
            self.level += 1;
            info!(level = self.level, "level up");
        }
        self.level
    }

    pub fn asteroid_count_for_level(&self) -> u32 {
        asteroids_for_level(self.difficulty.base_asteroid_count(), self.level)
    }

    pub fn speed_multiplier_for_level(&self) -> f32 {
        speed_multiplier_for_level(self.difficulty.base_speed_multiplier(), self.level)
    }

    /// Accrue session time; only the Playing phase counts.
    pub fn accrue_time(&mut self, dt_ms: f32) {
        if self.phase == GamePhase::Playing {
            self.elapsed_ms += dt_ms;
        }
    }

    pub fn ui_snapshot(&self) -> UiSnapshot {
        UiSnapshot {
            score: self.score,
            lives: self.lives,
            level: self.level,
            difficulty: self.difficulty,
            phase: self.phase,
            is_paused: self.phase == GamePhase::Paused,
            is_game_over: self.phase == GamePhase::GameOver,
        }
    }
}

/// Per-frame HUD payload handed to the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiSnapshot {
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub difficulty: Difficulty,
    pub phase: GamePhase,
    pub is_paused: bool,
    pub is_game_over: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(difficulty: Difficulty) -> GameState {
        let mut state = GameState::new(difficulty);
        assert!(state.start_new_game(difficulty));
        state
    }

    #[test]
    fn test_difficulty_table() {
        assert_eq!(Difficulty::Easy.starting_lives(), 4);
        assert_eq!(Difficulty::Medium.starting_lives(), 3);
        assert_eq!(Difficulty::Hard.starting_lives(), 2);
        assert_eq!(Difficulty::Medium.base_asteroid_count(), 5);
        assert!(Difficulty::Easy.base_speed_multiplier() < 1.0);
        assert!(Difficulty::Hard.base_speed_multiplier() > 1.0);
    }

    #[test]
    fn test_difficulty_from_name() {
        assert_eq!(Difficulty::from_name("easy"), Difficulty::Easy);
        assert_eq!(Difficulty::from_name(" HARD "), Difficulty::Hard);
        assert_eq!(Difficulty::from_name("normal"), Difficulty::Medium);
        assert_eq!(Difficulty::from_name("nightmare"), Difficulty::Medium);
    }

    #[test]
    fn test_size_weights_sum_to_one() {
        for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let total: f32 = d.asteroid_size_weights().iter().map(|(_, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-6, "{:?} weights sum {}", d, total);
        }
    }

    #[test]
    fn test_start_resets_counters() {
        let mut state = playing(Difficulty::Medium);
        state.add_score(120, ScoreSource::LevelBonus);
        state.advance_level();
        state.end_game();
        assert!(state.start_new_game(Difficulty::Hard));
        assert_eq!(state.phase(), GamePhase::Playing);
        assert_eq!(state.score(), 0);
        assert_eq!(state.level(), 1);
        assert_eq!(state.lives(), 2);
        assert_eq!(state.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn test_start_ignored_while_playing() {
        let mut state = playing(Difficulty::Medium);
        state.add_score(100, ScoreSource::LevelBonus);
        assert!(!state.start_new_game(Difficulty::Easy));
        assert_eq!(state.score(), 100, "restart mid-game must not wipe the session");
        assert_eq!(state.difficulty(), Difficulty::Medium);
    }

    #[test]
    fn test_pause_resume_cycle() {
        let mut state = playing(Difficulty::Medium);
        state.pause();
        assert_eq!(state.phase(), GamePhase::Paused);
        state.pause();
        assert_eq!(state.phase(), GamePhase::Paused, "double pause is a no-op");
        state.resume();
        assert_eq!(state.phase(), GamePhase::Playing);

        let mut menu = GameState::new(Difficulty::Medium);
        menu.pause();
        assert_eq!(menu.phase(), GamePhase::Menu, "pause outside play is ignored");
    }

    #[test]
    fn test_return_to_menu_from_pause() {
        let mut state = playing(Difficulty::Medium);
        state.pause();
        state.return_to_menu();
        assert_eq!(state.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_lose_life_to_game_over() {
        let mut state = playing(Difficulty::Hard);
        assert_eq!(state.lose_life(), 1);
        assert_eq!(state.phase(), GamePhase::Playing);
        assert_eq!(state.lose_life(), 0);
        assert_eq!(state.phase(), GamePhase::GameOver);
        // Dead sessions stay dead
        assert_eq!(state.lose_life(), 0);
        assert_eq!(state.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_score_ignored_outside_play() {
        let mut state = playing(Difficulty::Hard);
        state.lose_life();
        state.lose_life();
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert!(!state.add_score(500, ScoreSource::LevelBonus));
        assert!(!state.record_asteroid_destroyed(AsteroidSize::Large));
        assert_eq!(state.score(), 0);
        assert_eq!(state.asteroids_destroyed(), 0);
    }

    #[test]
    fn test_extra_life_on_threshold_crossing() {
        let mut state = playing(Difficulty::Medium);
        state.add_score(7_400, ScoreSource::LevelBonus);
        assert_eq!(state.lives(), 3);
        assert!(
            state.add_score(200, ScoreSource::LevelBonus),
            "crossing 7500 grants a life"
        );
        assert_eq!(state.lives(), 4);
        assert!(
            !state.add_score(200, ScoreSource::LevelBonus),
            "same bucket, no second grant"
        );
        assert_eq!(state.lives(), 4);
    }

    #[test]
    fn test_extra_life_single_grant_per_call() {
        let mut state = playing(Difficulty::Medium);
        // One jump across three thresholds still grants exactly one life
        assert!(state.add_score(24_000, ScoreSource::LevelBonus));
        assert_eq!(state.lives(), 4);
    }

    #[test]
    fn test_record_asteroid_destroyed_scores_by_size() {
        let mut state = playing(Difficulty::Medium);
        state.record_shot_fired();
        state.record_shot_fired();
        state.record_asteroid_destroyed(AsteroidSize::Large);
        state.record_asteroid_destroyed(AsteroidSize::Small);
        assert_eq!(state.score(), 120);
        assert_eq!(state.asteroids_destroyed(), 2);
        assert_eq!(state.shots_hit(), 2);
        assert_eq!(state.accuracy(), 1.0);
    }

    #[test]
    fn test_level_bonus_and_advance() {
        let mut state = playing(Difficulty::Medium);
        state.award_level_bonus();
        assert_eq!(state.score(), 500);
        assert_eq!(state.advance_level(), 2);
    }

    #[test]
    fn test_level_formulas_through_difficulty() {
        let mut state = playing(Difficulty::Medium);
        assert_eq!(state.asteroid_count_for_level(), 5);
        assert!((state.speed_multiplier_for_level() - 1.0).abs() < 1e-6);
        for _ in 0..3 {
            state.advance_level();
        }
        // Level 4: one growth step in count, +15% speed
        assert_eq!(state.asteroid_count_for_level(), 6);
        assert!((state.speed_multiplier_for_level() - 1.15).abs() < 1e-6);
        for _ in 0..20 {
            state.advance_level();
        }
        assert!(
            (state.speed_multiplier_for_level() - 1.5).abs() < 1e-6,
            "speed growth caps at +50%"
        );
    }

    #[test]
    fn test_elapsed_only_accrues_while_playing() {
        let mut state = playing(Difficulty::Medium);
        state.accrue_time(100.0);
        state.pause();
        state.accrue_time(100.0);
        state.resume();
        state.accrue_time(50.0);
        assert_eq!(state.elapsed_ms(), 150.0);
    }

    #[test]
    fn test_ui_snapshot_flags() {
        let mut state = playing(Difficulty::Medium);
        state.pause();
        let ui = state.ui_snapshot();
        assert!(ui.is_paused);
        assert!(!ui.is_game_over);
        assert_eq!(ui.lives, 3);
        assert_eq!(ui.phase, GamePhase::Paused);
    }

    #[test]
    fn test_state_serde_round_trip() {
        let mut state = playing(Difficulty::Hard);
        state.add_score(230, ScoreSource::LevelBonus);
        state.accrue_time(1234.5);
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
