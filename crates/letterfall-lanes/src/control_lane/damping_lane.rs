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

use letterfall_core::config::DampingConfig;
use letterfall_core::lane::{Lane, LaneError, LaneKind};
use letterfall_core::math::sign;

use super::{LetterContext, LetterLane};

/// Raises damping and caps spin as round letters close in on their slot.
///
/// Round glyphs roll freely, so near the target they get heavier damping, a
/// spin cap that tightens with proximity and a small torque toward upright.
/// Every other letter, and round letters further away, get the baseline damping.
#[derive(Debug, Clone, Default)]
pub struct ProximityDampingLane {
    config: DampingConfig,
}

impl ProximityDampingLane {
    /// Creates the lane with its tuning.
    pub fn new(config: DampingConfig) -> Self {
        Self { config }
    }
}

impl Lane for ProximityDampingLane {
    fn strategy_name(&self) -> &'static str {
        "ProximityDamping"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Heuristic
    }
}

impl LetterLane for ProximityDampingLane {
    fn execute(&self, ctx: &mut LetterContext<'_>) -> Result<(), LaneError> {
        let cfg = &self.config;
        let dist = ctx.distance();

        if !cfg.applies_to(ctx.character) || dist >= cfg.radius {
            ctx.world.set_angular_damping(ctx.body, cfg.base_angular);
            ctx.world.set_linear_damping(ctx.body, cfg.base_linear);
            return Ok(());
        }

        let proximity = 1.0 - dist / cfg.radius;
        ctx.world
            .set_angular_damping(ctx.body, cfg.base_angular + proximity * cfg.angular_gain);
        ctx.world
            .set_linear_damping(ctx.body, cfg.base_linear + proximity * cfg.linear_gain);

        let spin = ctx.world.angvel(ctx.body);
        let max_spin = cfg.max_spin * (1.0 - proximity * cfg.spin_reduction);
        if spin.abs() > max_spin {
            ctx.world.set_angvel(ctx.body, sign(spin) * max_spin);
        }

        if dist < cfg.upright_distance && spin.abs() < cfg.upright_max_spin {
            let torque = -ctx.kinematics.rotation * cfg.upright_gain * proximity;
            ctx.world.apply_torque_impulse(ctx.body, torque);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_lane::test_support::Rig;
    use approx::assert_relative_eq;
    use letterfall_core::math::Vec2;
    use letterfall_core::physics::PhysicsWorld;

    fn lane() -> ProximityDampingLane {
        ProximityDampingLane::new(DampingConfig::default())
    }

    #[test]
    fn non_round_letters_get_baseline() {
        let mut rig = Rig::new('t', Vec2::new(0.0, 0.7), 0.0, Vec2::new(0.0, 0.7));
        rig.run(&lane(), 16.6).unwrap();
        assert_eq!(rig.world.damping(rig.body), Some((0.5, 2.0)));
        assert_eq!(rig.world.impulse_count(rig.body), 0);
    }

    #[test]
    fn damping_scales_with_proximity() {
        // dist 0.3 -> proximity 0.5
        let mut rig = Rig::new('o', Vec2::new(0.3, 0.7), 0.0, Vec2::new(0.0, 0.7));
        rig.run(&lane(), 16.6).unwrap();
        let (linear, angular) = rig.world.damping(rig.body).unwrap();
        assert_relative_eq!(angular, 2.0 + 0.5 * 15.0, epsilon = 1e-5);
        assert_relative_eq!(linear, 0.5 + 0.5 * 5.0, epsilon = 1e-5);
    }

    #[test]
    fn spin_is_capped_near_target() {
        let mut rig = Rig::new('c', Vec2::new(0.3, 0.7), 0.0, Vec2::new(0.0, 0.7));
        rig.world.set_angvel(rig.body, -10.0);
        rig.run(&lane(), 16.6).unwrap();
        // cap = 4 * (1 - 0.5 * 0.8)
        assert_relative_eq!(rig.world.angvel(rig.body), -2.4, epsilon = 1e-5);
    }

    #[test]
    fn upright_torque_only_when_close_and_calm() {
        // dist 0.12 -> proximity 0.8
        let mut rig = Rig::new('u', Vec2::new(0.12, 0.7), 0.05, Vec2::new(0.0, 0.7));
        rig.run(&lane(), 16.6).unwrap();
        assert_eq!(rig.world.impulse_count(rig.body), 1);
        assert_relative_eq!(
            rig.world.angvel(rig.body),
            -0.05 * 2.0 * 0.8,
            epsilon = 1e-5
        );

        let mut spinning = Rig::new('u', Vec2::new(0.12, 0.7), 0.05, Vec2::new(0.0, 0.7));
        spinning.world.set_angvel(spinning.body, 1.5);
        spinning.run(&lane(), 16.6).unwrap();
        assert_eq!(spinning.world.impulse_count(spinning.body), 0);
    }
}
