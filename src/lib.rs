//! Astrobelt simulation core
//!
//! Headless, render-agnostic core for an asteroid-field arcade game:
//! entity lifecycle with pooling, wrapping physics, dual-strategy
//! collision detection and the score/lives/level session state machine.
//! An embedding layer supplies input commands and wall-clock deltas and
//! consumes draw data, UI snapshots and per-frame events.

pub mod config;
pub mod util;
pub mod game;
