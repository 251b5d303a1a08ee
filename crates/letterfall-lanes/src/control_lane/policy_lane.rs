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

use letterfall_core::config::PolicyConfig;
use letterfall_core::lane::{Lane, LaneError, LaneKind};
use letterfall_core::math::{sign, Vec2, PI};
use letterfall_core::physics::BodyState;

use super::LetterContext;
use crate::inference_lane::Brain;

/// The impulses the policy applied to one letter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolicyImpulse {
    /// Horizontal linear impulse.
    pub force_x: f32,
    /// Torque impulse.
    pub torque: f32,
}

/// Feeds the letter's state through the network and applies the resulting impulses.
///
/// The network only decides magnitudes: the push always points toward the
/// target and the torque always points toward upright.
#[derive(Debug, Clone, Default)]
pub struct ControlPolicyLane {
    config: PolicyConfig,
}

impl ControlPolicyLane {
    /// Creates the lane with its tuning.
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Builds the 4-value observation for a body aiming at `target_x`.
    pub fn observe(&self, state: &BodyState, target_x: f32) -> [f32; 4] {
        let cfg = &self.config;
        let position_error = target_x - state.position.x;
        let rotation_error = -state.rotation;
        [
            position_error / cfg.position_scale,
            state.linvel.x * cfg.velocity_scale,
            rotation_error / PI,
            state.angvel * cfg.velocity_scale,
        ]
    }

    /// Maps a raw action onto signed impulses.
    pub fn impulse(&self, state: &BodyState, target_x: f32, action: &[f32]) -> PolicyImpulse {
        let cfg = &self.config;
        let a0 = action.first().copied().unwrap_or(0.0);
        let a1 = action.get(1).copied().unwrap_or(0.0);
        PolicyImpulse {
            force_x: sign(target_x - state.position.x) * a0.abs() * cfg.force_gain,
            torque: sign(-state.rotation) * a1.abs() * cfg.torque_gain,
        }
    }

    /// Runs the policy for one letter.
    ///
    /// Airborne letters get light damping and no impulse (`Ok(None)`).
    /// An observation the network cannot take is returned as an error.
    pub fn apply(
        &self,
        ctx: &mut LetterContext<'_>,
        brain: &Brain,
    ) -> Result<Option<PolicyImpulse>, LaneError> {
        let state = ctx.world.body_state(ctx.body);
        if state.position.y >= self.config.grounded_height {
            ctx.world
                .set_linear_damping(ctx.body, self.config.airborne_damping);
            ctx.world
                .set_angular_damping(ctx.body, self.config.airborne_damping);
            return Ok(None);
        }

        let observation = self.observe(&state, ctx.target.x);
        let action = brain.predict(&observation)?;
        let impulse = self.impulse(&state, ctx.target.x, &action);

        ctx.world
            .apply_impulse(ctx.body, Vec2::new(impulse.force_x, 0.0));
        ctx.world.apply_torque_impulse(ctx.body, impulse.torque);
        log::trace!(
            "Policy on '{}': obs {:?} -> force {:.3}, torque {:.3}",
            ctx.character,
            observation,
            impulse.force_x,
            impulse.torque
        );
        Ok(Some(impulse))
    }
}

impl Lane for ControlPolicyLane {
    fn strategy_name(&self) -> &'static str {
        "ControlPolicy"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Policy
    }
}
