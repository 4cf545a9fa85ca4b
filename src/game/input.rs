//! Input plumbing between the embedding layer and the frame loop
//!
//! Key handlers push `InputCommand`s through a bounded lock-free channel;
//! the frame loop drains them once per frame and folds them into an
//! `InputState`. Held actions stay set across frames, pause/escape are
//! one-frame pulses debounced against key auto-repeat.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use thiserror::Error;

/// Logical actions. There is no fire action: firing is automatic while
/// playing, gated by the ship's cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    RotateLeft,
    RotateRight,
    Thrust,
    Pause,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Press(Action),
    Release(Action),
}

/// Per-frame action surface consumed by the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub thrust: bool,
    /// One-frame pulse; toggles pause.
    pub pause: bool,
    /// One-frame pulse; leaves for the menu.
    pub escape: bool,
}

impl InputState {
    /// Signed turn input for the ship: -1 left, +1 right, 0 when both or
    /// neither key is held.
    pub fn turn_direction(&self) -> f32 {
        match (self.rotate_left, self.rotate_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InputFeedError {
    /// Channel full; the command is dropped at the source.
    #[error("input feed is full")]
    Full,
    /// Frame loop side has gone away.
    #[error("input feed is disconnected")]
    Disconnected,
}

/// Bounded command channel. Key handlers hold cloned `InputSender`s and
/// never block; the frame loop drains everything pending at frame start.
pub struct InputFeed {
    sender: Sender<InputCommand>,
    receiver: Receiver<InputCommand>,
    capacity: usize,
}

impl InputFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// A clonable handle for the input-producing side.
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    /// Drain all commands pending for this frame, in submission order.
    pub fn drain(&self) -> Vec<InputCommand> {
        self.receiver.try_iter().collect()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InputFeed {
    fn default() -> Self {
        // Plenty for the key events one player can produce between frames
        Self::new(64)
    }
}

#[derive(Clone)]
pub struct InputSender {
    sender: Sender<InputCommand>,
}

impl InputSender {
    #[inline]
    pub fn try_send(&self, command: InputCommand) -> Result<(), InputFeedError> {
        self.sender.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => InputFeedError::Full,
            TrySendError::Disconnected(_) => InputFeedError::Disconnected,
        })
    }

    #[inline]
    pub fn press(&self, action: Action) -> Result<(), InputFeedError> {
        self.try_send(InputCommand::Press(action))
    }

    #[inline]
    pub fn release(&self, action: Action) -> Result<(), InputFeedError> {
        self.try_send(InputCommand::Release(action))
    }
}

/// Folds drained commands into held state plus edge pulses.
#[derive(Debug, Default)]
pub struct InputTracker {
    rotate_left: bool,
    rotate_right: bool,
    thrust: bool,
    pause_held: bool,
    escape_held: bool,
    pause_pulse: bool,
    escape_pulse: bool,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, command: InputCommand) {
        match command {
            InputCommand::Press(Action::RotateLeft) => self.rotate_left = true,
            InputCommand::Release(Action::RotateLeft) => self.rotate_left = false,
            InputCommand::Press(Action::RotateRight) => self.rotate_right = true,
            InputCommand::Release(Action::RotateRight) => self.rotate_right = false,
            InputCommand::Press(Action::Thrust) => self.thrust = true,
            InputCommand::Release(Action::Thrust) => self.thrust = false,
            // Auto-repeat sends repeated presses while held; only the
            // first one of each press/release cycle may pulse.
            InputCommand::Press(Action::Pause) => {
                if !self.pause_held {
                    self.pause_held = true;
                    self.pause_pulse = true;
                }
            }
            InputCommand::Release(Action::Pause) => self.pause_held = false,
            InputCommand::Press(Action::Escape) => {
                if !self.escape_held {
                    self.escape_held = true;
                    self.escape_pulse = true;
                }
            }
            InputCommand::Release(Action::Escape) => self.escape_held = false,
        }
    }

    /// The state for this frame. Consumes the pending pulses.
    pub fn frame_state(&mut self) -> InputState {
        let state = InputState {
            rotate_left: self.rotate_left,
            rotate_right: self.rotate_right,
            thrust: self.thrust,
            pause: self.pause_pulse,
            escape: self.escape_pulse,
        };
        self.pause_pulse = false;
        self.escape_pulse = false;
        state
    }

    /// Apply a batch of drained commands and return the frame state.
    pub fn fold(&mut self, commands: impl IntoIterator<Item = InputCommand>) -> InputState {
        for command in commands {
            self.apply(command);
        }
        self.frame_state()
    }
}
