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

use letterfall_core::config::RecoveryConfig;
use letterfall_core::lane::{Lane, LaneError, LaneKind};
use letterfall_core::math::{normalize_angle, Vec2};
use letterfall_core::ControlEvent;
use rand::Rng;

use super::{LetterContext, LetterLane};

/// Tosses a letter that has been lying on its side for too long.
#[derive(Debug, Clone, Default)]
pub struct OrientationRecoveryLane {
    config: RecoveryConfig,
}

impl OrientationRecoveryLane {
    /// Creates the lane with its tuning.
    pub fn new(config: RecoveryConfig) -> Self {
        Self { config }
    }
}

impl Lane for OrientationRecoveryLane {
    fn strategy_name(&self) -> &'static str {
        "OrientationRecovery"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Heuristic
    }
}

impl LetterLane for OrientationRecoveryLane {
    fn execute(&self, ctx: &mut LetterContext<'_>) -> Result<(), LaneError> {
        let cfg = &self.config;
        let rotation = normalize_angle(ctx.kinematics.rotation);
        let velocity = ctx.kinematics.linvel;
        let flipped = rotation.abs() > cfg.flip_threshold;
        let still = velocity.x.abs() < cfg.still_speed && velocity.y.abs() < cfg.still_speed;

        if !(flipped && still) {
            ctx.control.timers.recovery = 0.0;
            return Ok(());
        }

        ctx.control.timers.recovery += ctx.dt_ms;
        if ctx.control.timers.recovery >= cfg.wait_ms {
            let linvel = Vec2::new(
                (ctx.rng.random::<f32>() - 0.5) * cfg.kick_spread_x,
                cfg.kick_up,
            );
            let angvel = (ctx.rng.random::<f32>() - 0.5) * cfg.spin_spread;
            ctx.world.set_linvel(ctx.body, linvel);
            ctx.world.set_angvel(ctx.body, angvel);
            ctx.control.timers.recovery = 0.0;

            log::warn!(
                "Kicking flipped letter '{}' (rotation {:.2} rad)",
                ctx.character,
                rotation
            );
            ctx.emit(ControlEvent::RecoveryKick { linvel, angvel });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_lane::test_support::Rig;
    use letterfall_core::math::FRAC_PI_2;
    use letterfall_core::physics::PhysicsWorld;

    fn lane() -> OrientationRecoveryLane {
        OrientationRecoveryLane::new(RecoveryConfig::default())
    }

    fn kicks(events: &[ControlEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, ControlEvent::RecoveryKick { .. }))
            .count()
    }

    #[test]
    fn kicks_exactly_at_the_wait() {
        let mut rig = Rig::new('h', Vec2::new(0.0, 5.0), FRAC_PI_2, Vec2::new(0.0, 0.0));
        for _ in 0..29 {
            rig.run(&lane(), 100.0).unwrap();
        }
        assert_eq!(kicks(&rig.events), 0);
        assert_eq!(rig.control.timers.recovery, 2900.0);

        rig.run(&lane(), 100.0).unwrap();
        assert_eq!(kicks(&rig.events), 1);
        assert_eq!(rig.control.timers.recovery, 0.0);

        let linvel = rig.world.linvel(rig.body);
        assert_eq!(linvel.y, 5.0);
        assert!(linvel.x.abs() <= 5.0);
        assert!(rig.world.angvel(rig.body).abs() <= 15.0);
    }

    #[test]
    fn motion_resets_the_timer() {
        let mut rig = Rig::new('h', Vec2::new(0.0, 5.0), FRAC_PI_2, Vec2::new(0.0, 0.0));
        for _ in 0..20 {
            rig.run(&lane(), 100.0).unwrap();
        }
        rig.world.set_linvel(rig.body, Vec2::new(0.0, -1.0));
        rig.run(&lane(), 100.0).unwrap();
        assert_eq!(rig.control.timers.recovery, 0.0);
        assert_eq!(kicks(&rig.events), 0);
    }

    #[test]
    fn upright_letters_are_left_alone() {
        // a full turn normalises back to upright
        let mut rig = Rig::new(
            'h',
            Vec2::new(0.0, 5.0),
            2.0 * std::f32::consts::PI + 0.1,
            Vec2::new(0.0, 0.0),
        );
        for _ in 0..40 {
            rig.run(&lane(), 100.0).unwrap();
        }
        assert_eq!(kicks(&rig.events), 0);
        assert_eq!(rig.control.timers.recovery, 0.0);
    }
}
