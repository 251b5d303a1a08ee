// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-letter control state shared between the lanes and the agents.
//!
//! A letter moves through [`ControlState::Search`], [`ControlState::Settle`]
//! and [`ControlState::Lock`] in that order and never goes back. The timers and
//! stuck-tracking fields are owned here so that every heuristic lane reads and
//! writes the same record.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

pub use crate::physics::BodyState as LetterKinematics;

/// Lifecycle of a letter's controller.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ControlState {
    /// Falling or travelling toward the target.
    #[default]
    Search,
    /// Inside the positional tolerance, stability is being confirmed.
    Settle,
    /// Terminal: the body is frozen as a kinematic pose holder.
    Lock,
}

impl ControlState {
    /// Returns `true` for the terminal state.
    pub fn is_locked(self) -> bool {
        self == ControlState::Lock
    }
}

impl std::fmt::Display for ControlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ControlState::Search => "SEARCH",
            ControlState::Settle => "SETTLE",
            ControlState::Lock => "LOCK",
        };
        f.write_str(label)
    }
}

/// Millisecond accumulators driven by the tick increment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LetterTimers {
    /// Time the settle condition has held without interruption.
    pub settle: f32,
    /// Time the letter has been flipped and motionless.
    pub recovery: f32,
    /// Time the letter has been stuck away from its target.
    pub slide: f32,
    /// Time since the last stuck-window check.
    pub pos_check: f32,
}

/// Mutable controller record for one letter.
#[derive(Debug, Clone, Default)]
pub struct LetterControl {
    state: ControlState,
    /// Heuristic timers.
    pub timers: LetterTimers,
    /// Horizontal anchor recorded at the last stuck-window check.
    pub last_x: Option<f32>,
    /// Result of the most recent stuck-window check.
    pub is_stuck_moving: bool,
}

impl LetterControl {
    /// A fresh controller in [`ControlState::Search`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Moves the state forward to `next`.
    ///
    /// Returns `false` and leaves the state untouched when `next` is not
    /// strictly ahead of the current state.
    pub fn advance_to(&mut self, next: ControlState) -> bool {
        if next > self.state {
            self.state = next;
            true
        } else {
            false
        }
    }
}

/// Something a lane did to a letter during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// Entered [`ControlState::Settle`].
    Settling,
    /// Entered [`ControlState::Lock`] at the given pose.
    Locked {
        /// Frozen position.
        position: Vec2,
        /// Frozen rotation.
        rotation: f32,
    },
    /// The orientation-recovery monitor kicked a flipped letter.
    RecoveryKick {
        /// Linear velocity that was set.
        linvel: Vec2,
        /// Angular velocity that was set.
        angvel: f32,
    },
    /// The slide-assist monitor kicked a stuck letter toward its target.
    SlideKick {
        /// Linear velocity that was set.
        linvel: Vec2,
    },
}
