//! Frame pacing diagnostics
//!
//! Tracks real frame durations over a rolling window and classifies how
//! the loop is keeping up. Diagnostics only: the simulation consumes the
//! clamped delta regardless of what the monitor says.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::game::constants::frame;

/// How the frame loop is holding up against the 60 fps budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePace {
    /// Average frame fits the budget.
    Smooth,
    /// Over budget but under the clamp floor; visible stutter.
    Degraded,
    /// Past the delta clamp; the simulation is running slower than real
    /// time.
    Overloaded,
}

impl FramePace {
    pub fn is_healthy(&self) -> bool {
        matches!(self, FramePace::Smooth)
    }

    /// Whether frames are long enough that the delta clamp dilates time.
    pub fn dilates_time(&self) -> bool {
        matches!(self, FramePace::Overloaded)
    }
}

/// Rolling-window frame duration monitor.
pub struct FrameMonitor {
    samples: VecDeque<Duration>,
    max_samples: usize,
    budget: Duration,
    /// Duration past which the delta clamp engages.
    clamp_floor: Duration,
    pace: FramePace,
    frame_start: Option<Instant>,
    last_entity_count: usize,
}

impl FrameMonitor {
    pub fn new() -> Self {
        Self {
            // Two seconds of samples at the target rate
            samples: VecDeque::with_capacity(120),
            max_samples: 120,
            budget: Duration::from_secs_f32(frame::TARGET_DELTA_MS / 1000.0),
            clamp_floor: Duration::from_secs_f32(frame::MAX_DELTA_MS / 1000.0),
            pace: FramePace::Smooth,
            frame_start: None,
            last_entity_count: 0,
        }
    }

    pub fn frame_start(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    pub fn frame_end(&mut self, entity_count: usize) {
        if let Some(start) = self.frame_start.take() {
            self.record_frame(start.elapsed());
            self.last_entity_count = entity_count;
        }
    }

    fn record_frame(&mut self, duration: Duration) {
        self.samples.push_back(duration);
        while self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
        self.update_pace();
    }

    fn update_pace(&mut self) {
        // Not enough data to call it yet
        if self.samples.len() < 10 {
            return;
        }
        let avg = self.average_frame();
        self.pace = if avg <= self.budget {
            FramePace::Smooth
        } else if avg <= self.clamp_floor {
            FramePace::Degraded
        } else {
            FramePace::Overloaded
        };
    }

    pub fn average_frame(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let sum: Duration = self.samples.iter().sum();
        sum / self.samples.len() as u32
    }

    pub fn p95_frame(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted: Vec<_> = self.samples.iter().copied().collect();
        sorted.sort();
        let idx = (sorted.len() as f32 * 0.95) as usize;
        sorted
            .get(idx.min(sorted.len() - 1))
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    pub fn pace(&self) -> FramePace {
        self.pace
    }

    pub fn budget_usage_percent(&self) -> f32 {
        (self.average_frame().as_secs_f32() / self.budget.as_secs_f32()) * 100.0
    }

    pub fn last_entity_count(&self) -> usize {
        self.last_entity_count
    }

    /// One-line summary for heartbeat logging.
    pub fn status_line(&self) -> String {
        format!(
            "{:?} - avg {:.2}ms, p95 {:.2}ms, {:.0}% budget, {} entities",
            self.pace,
            self.average_frame().as_secs_f32() * 1000.0,
            self.p95_frame().as_secs_f32() * 1000.0,
            self.budget_usage_percent(),
            self.last_entity_count
        )
    }
}

impl Default for FrameMonitor {
    fn default() -> Self {
        Self::new()
    }
}
