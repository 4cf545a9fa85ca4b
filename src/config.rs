use thiserror::Error;

use crate::game::constants::{pool, screen, spawn};
use crate::game::entities::Bounds;
use crate::game::state::Difficulty;

/// Game configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Playfield width in pixels
    pub screen_width: f32,
    /// Playfield height in pixels
    pub screen_height: f32,
    /// Difficulty preset for new sessions
    pub difficulty: Difficulty,
    /// Cap on the projectile and particle reuse pools
    pub max_pool_size: usize,
    /// Fixed RNG seed; None seeds from entropy
    pub seed: Option<u64>,
    /// Frames the scripted demo session runs for
    pub demo_frames: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: screen::WIDTH,
            screen_height: screen::HEIGHT,
            difficulty: Difficulty::Medium,
            max_pool_size: pool::MAX_POOL_SIZE,
            seed: None,
            demo_frames: 600,
        }
    }
}

impl GameConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(width) = std::env::var("ASTEROIDS_WIDTH") {
            if let Ok(parsed) = width.parse::<f32>() {
                config.screen_width = parsed;
            } else {
                tracing::warn!("Invalid ASTEROIDS_WIDTH '{}', using default", width);
            }
        }

        if let Ok(height) = std::env::var("ASTEROIDS_HEIGHT") {
            if let Ok(parsed) = height.parse::<f32>() {
                config.screen_height = parsed;
            } else {
                tracing::warn!("Invalid ASTEROIDS_HEIGHT '{}', using default", height);
            }
        }

        if let Ok(difficulty) = std::env::var("ASTEROIDS_DIFFICULTY") {
            // Unknown labels warn and fall back inside from_name
            config.difficulty = Difficulty::from_name(&difficulty);
        }

        if let Ok(pool_size) = std::env::var("ASTEROIDS_POOL_SIZE") {
            if let Ok(parsed) = pool_size.parse::<usize>() {
                config.max_pool_size = parsed;
            } else {
                tracing::warn!("Invalid ASTEROIDS_POOL_SIZE '{}', using default", pool_size);
            }
        }

        if let Ok(seed) = std::env::var("ASTEROIDS_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.seed = Some(parsed);
            } else {
                tracing::warn!("Invalid ASTEROIDS_SEED '{}', ignoring", seed);
            }
        }

        if let Ok(frames) = std::env::var("ASTEROIDS_DEMO_FRAMES") {
            if let Ok(parsed) = frames.parse::<u32>() {
                config.demo_frames = parsed;
            } else {
                tracing::warn!("Invalid ASTEROIDS_DEMO_FRAMES '{}', using default", frames);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.screen_width.is_finite() || !self.screen_height.is_finite() {
            return Err(ConfigError::ScreenNotFinite);
        }
        // The safe-spawn ring must fit the playfield
        let min_dimension = spawn::SAFE_DISTANCE * 2.0;
        if self.screen_width < min_dimension || self.screen_height < min_dimension {
            return Err(ConfigError::ScreenTooSmall {
                width: self.screen_width,
                height: self.screen_height,
                min: min_dimension,
            });
        }
        if self.max_pool_size > 4096 {
            return Err(ConfigError::PoolSizeOutOfRange(self.max_pool_size));
        }
        Ok(())
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.screen_width, self.screen_height)
    }
}

/// Configuration validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("screen dimensions must be finite numbers")]
    ScreenNotFinite,
    #[error("screen {width}x{height} too small, both dimensions must be at least {min}")]
    ScreenTooSmall { width: f32, height: f32, min: f32 },
    #[error("pool size {0} is out of range (max 4096)")]
    PoolSizeOutOfRange(usize),
}
