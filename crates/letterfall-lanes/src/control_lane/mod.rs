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

//! Control Lanes
//!
//! Per-letter strategies run by the letter agent every tick, in this order:
//!
//! 1. [`ProximityDampingLane`] tames round letters near their slot.
//! 2. [`OrientationRecoveryLane`] kicks letters lying on their side.
//! 3. [`SlideAssistLane`] shoves letters stuck away from their slot.
//! 4. [`SettleLane`] moves the lifecycle forward and locks stable letters.
//!
//! The [`ControlPolicyLane`] runs afterwards, in a separate batch, for every
//! letter that is still active.

mod damping_lane;
mod policy_lane;
mod recovery_lane;
mod settle_lane;
mod slide_lane;

pub use damping_lane::ProximityDampingLane;
pub use policy_lane::{ControlPolicyLane, PolicyImpulse};
pub use recovery_lane::OrientationRecoveryLane;
pub use settle_lane::SettleLane;
pub use slide_lane::SlideAssistLane;

use letterfall_core::config::SimulationConfig;
use letterfall_core::lane::{Lane, LaneError};
use letterfall_core::math::Vec2;
use letterfall_core::physics::{PhysicsWorld, RigidBodyHandle};
use letterfall_core::{ControlEvent, LetterControl, LetterKinematics};
use rand::RngCore;

/// Everything a lane may read or touch for one letter during one tick.
pub struct LetterContext<'a> {
    /// The shared physics world.
    pub world: &'a mut dyn PhysicsWorld,
    /// The letter's body.
    pub body: RigidBodyHandle,
    /// The letter's character.
    pub character: char,
    /// Resting pose (x, y).
    pub target: Vec2,
    /// The letter's controller record.
    pub control: &'a mut LetterControl,
    /// Body state sampled once at the start of the letter's update.
    pub kinematics: LetterKinematics,
    /// Timer increment for this tick, in milliseconds.
    pub dt_ms: f32,
    /// Source of randomness for corrective kicks.
    pub rng: &'a mut dyn RngCore,
    /// Sink for what happened this tick.
    pub events: &'a mut Vec<ControlEvent>,
}

impl LetterContext<'_> {
    /// Horizontal distance between the sampled position and the target.
    pub fn distance(&self) -> f32 {
        (self.target.x - self.kinematics.position.x).abs()
    }

    /// Records an event for the tick report.
    pub fn emit(&mut self, event: ControlEvent) {
        self.events.push(event);
    }
}

/// A lane acting on a single letter.
pub trait LetterLane: Lane {
    /// Runs the strategy for one letter. Never called on locked letters.
    fn execute(&self, ctx: &mut LetterContext<'_>) -> Result<(), LaneError>;
}

/// The heuristic monitors followed by the settling lane, in execution order.
pub fn standard_lanes(config: &SimulationConfig) -> Vec<Box<dyn LetterLane>> {
    vec![
        Box::new(ProximityDampingLane::new(config.damping.clone())),
        Box::new(OrientationRecoveryLane::new(config.recovery.clone())),
        Box::new(SlideAssistLane::new(config.slide.clone())),
        Box::new(SettleLane::new(config.settle.clone())),
    ]
}
