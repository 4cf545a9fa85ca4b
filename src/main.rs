mod config;
mod game;
mod util;

use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, Level};

use crate::config::GameConfig;
use crate::game::constants::frame;
use crate::game::entities::Color;
use crate::game::frame::FrameMonitor;
use crate::game::input::{Action, InputFeed, InputTracker};
use crate::game::session::{Game, GameEvent};
use crate::game::state::GamePhase;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Astrobelt v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = GameConfig::load_or_default();
    config.validate()?;
    info!(
        "Configuration loaded: {}x{}, difficulty={}",
        config.screen_width,
        config.screen_height,
        config.difficulty.label()
    );

    let feed = InputFeed::default();
    let pilot = feed.sender();
    let mut tracker = InputTracker::new();
    let mut monitor = FrameMonitor::new();

    let demo_frames = config.demo_frames;
    let difficulty = config.difficulty;
    let mut game = Game::new(config);
    game.start_new_game(difficulty, Color::SHIP);

    let budget = Duration::from_secs_f32(frame::TARGET_DELTA_MS / 1000.0);

    // Scripted autopilot: sweep the nose back and forth with thrust
    // bursts so the auto-fire rakes across the field.
    for frame_index in 0..demo_frames {
        let started = Instant::now();
        monitor.frame_start();

        match frame_index % 240 {
            0 => {
                let _ = pilot.press(Action::RotateRight);
            }
            90 => {
                let _ = pilot.release(Action::RotateRight);
            }
            100 => {
                let _ = pilot.press(Action::Thrust);
            }
            140 => {
                let _ = pilot.release(Action::Thrust);
            }
            150 => {
                let _ = pilot.press(Action::RotateLeft);
            }
            230 => {
                let _ = pilot.release(Action::RotateLeft);
            }
            _ => {}
        }

        let input = tracker.fold(feed.drain());
        // Fixed simulation delta; the monitor watches the real cadence
        let events = game.advance_frame(frame::TARGET_DELTA_MS, &input);
        for event in &events {
            match event {
                GameEvent::AsteroidDestroyed { size, points, .. } => {
                    info!(?size, points, "asteroid destroyed")
                }
                GameEvent::ShipHit { lives_left } => info!(lives_left, "ship hit"),
                GameEvent::ExtraLife { lives } => info!(lives, "extra life"),
                GameEvent::LevelComplete { level, bonus } => {
                    info!(level, bonus, "level cleared")
                }
                GameEvent::GameOver { score, level } => info!(score, level, "game over"),
                GameEvent::ShotFired { .. } => {}
            }
        }

        monitor.frame_end(game.entity_total());
        if frame_index % 300 == 299 {
            info!("pace: {}", monitor.status_line());
        }

        if game.state().phase() == GamePhase::GameOver {
            break;
        }

        if let Some(remaining) = budget.checked_sub(started.elapsed()) {
            thread::sleep(remaining);
        }
    }

    let ui = game.state().ui_snapshot();
    info!(
        score = ui.score,
        level = ui.level,
        lives = ui.lives,
        "demo finished"
    );
    println!("{}", serde_json::to_string_pretty(&game.snapshot())?);

    Ok(())
}
