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

use letterfall_core::config::SettleConfig;
use letterfall_core::lane::{Lane, LaneError, LaneKind};
use letterfall_core::math::Vec2;
use letterfall_core::physics::BodyType;
use letterfall_core::{ControlEvent, ControlState};

use super::{LetterContext, LetterLane};

/// Drives `Search -> Settle -> Lock` and freezes letters that held still.
#[derive(Debug, Clone, Default)]
pub struct SettleLane {
    config: SettleConfig,
}

impl SettleLane {
    /// Creates the lane with its tuning.
    pub fn new(config: SettleConfig) -> Self {
        Self { config }
    }

    fn is_stable(&self, ctx: &LetterContext<'_>) -> bool {
        let cfg = &self.config;
        ctx.distance() < cfg.position_tolerance
            && ctx.kinematics.linvel.x.abs() < cfg.velocity_tolerance
            && ctx.kinematics.rotation.abs() < cfg.rotation_tolerance
    }

    /// Turns the body into a kinematic pose holder at its current pose.
    fn lock(&self, ctx: &mut LetterContext<'_>) {
        let position = ctx.world.translation(ctx.body);
        let rotation = ctx.world.rotation(ctx.body);

        ctx.world.set_body_type(ctx.body, BodyType::Kinematic);
        ctx.world.set_body_pose(ctx.body, position, rotation);
        ctx.world.set_linvel(ctx.body, Vec2::ZERO);
        ctx.world.set_angvel(ctx.body, 0.0);

        log::info!(
            "Letter '{}' locked at ({:.2}, {:.2})",
            ctx.character,
            position.x,
            position.y
        );
        ctx.emit(ControlEvent::Locked { position, rotation });
    }
}

impl Lane for SettleLane {
    fn strategy_name(&self) -> &'static str {
        "Settle"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Settle
    }
}

impl LetterLane for SettleLane {
    fn execute(&self, ctx: &mut LetterContext<'_>) -> Result<(), LaneError> {
        if ctx.control.state() == ControlState::Search
            && ctx.distance() < self.config.position_tolerance
            && ctx.control.advance_to(ControlState::Settle)
        {
            log::debug!("Letter '{}' is settling", ctx.character);
            ctx.emit(ControlEvent::Settling);
        }

        if ctx.control.state() != ControlState::Settle {
            return Ok(());
        }

        if !self.is_stable(ctx) {
            ctx.control.timers.settle = 0.0;
            return Ok(());
        }

        ctx.control.timers.settle += ctx.dt_ms;
        if ctx.control.timers.settle >= self.config.confirm_ms
            && ctx.control.advance_to(ControlState::Lock)
        {
            self.lock(ctx);
        }
        Ok(())
    }
}
