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

use letterfall_core::config::SlideConfig;
use letterfall_core::lane::{Lane, LaneError, LaneKind};
use letterfall_core::math::Vec2;
use letterfall_core::ControlEvent;

use super::{LetterContext, LetterLane};

/// Detects letters wedged away from their slot and hops them toward it.
///
/// Movement is sampled once per check window against an anchor. A letter
/// that barely moved keeps its old anchor, so a slow creep still adds up to
/// "stuck" across windows instead of being forgiven every time.
#[derive(Debug, Clone, Default)]
pub struct SlideAssistLane {
    config: SlideConfig,
}

impl SlideAssistLane {
    /// Creates the lane with its tuning.
    pub fn new(config: SlideConfig) -> Self {
        Self { config }
    }

    fn check_window(&self, ctx: &mut LetterContext<'_>) {
        let cfg = &self.config;
        let x = ctx.kinematics.position.x;
        let control = &mut *ctx.control;

        match control.last_x {
            // First window: nothing to compare against yet.
            None => {
                control.last_x = Some(x);
                control.is_stuck_moving = false;
            }
            Some(anchor) => {
                let moved = (x - anchor).abs();
                if moved < cfg.creep_threshold {
                    control.is_stuck_moving = true;
                } else {
                    let threshold = if cfg.is_hooked(ctx.character) {
                        cfg.hooked_stuck_threshold
                    } else {
                        cfg.stuck_threshold
                    };
                    control.is_stuck_moving = moved < threshold;
                    control.last_x = Some(x);
                }
            }
        }
        control.timers.pos_check = 0.0;
    }
}

impl Lane for SlideAssistLane {
    fn strategy_name(&self) -> &'static str {
        "SlideAssist"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Heuristic
    }
}

impl LetterLane for SlideAssistLane {
    fn execute(&self, ctx: &mut LetterContext<'_>) -> Result<(), LaneError> {
        let cfg = &self.config;

        ctx.control.timers.pos_check += ctx.dt_ms;
        if ctx.control.timers.pos_check > cfg.check_window_ms {
            self.check_window(ctx);
        }

        let dist = ctx.distance();
        let in_range = dist > cfg.min_distance && dist < cfg.max_distance;
        if !(in_range && ctx.control.is_stuck_moving) {
            ctx.control.timers.slide = (ctx.control.timers.slide - cfg.decay_per_tick).max(0.0);
            return Ok(());
        }

        let hooked = cfg.is_hooked(ctx.character);
        let wait = if hooked {
            cfg.hooked_wait_ms
        } else {
            cfg.wait_ms
        };

        ctx.control.timers.slide += ctx.dt_ms;
        if ctx.control.timers.slide > wait {
            let direction = if ctx.target.x > ctx.kinematics.position.x {
                1.0
            } else {
                -1.0
            };
            let speed = (dist * cfg.speed_per_distance).max(cfg.min_speed);
            let hop = if hooked { cfg.hooked_hop } else { cfg.hop };
            let linvel = Vec2::new(direction * speed, hop);

            ctx.world.set_linvel(ctx.body, linvel);
            ctx.control.timers.slide = 0.0;
            ctx.control.is_stuck_moving = false;

            log::warn!(
                "Sliding stuck letter '{}' toward its slot ({:.2} away)",
                ctx.character,
                dist
            );
            ctx.emit(ControlEvent::SlideKick { linvel });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_lane::test_support::Rig;
    use letterfall_core::physics::PhysicsWorld;

    fn lane() -> SlideAssistLane {
        SlideAssistLane::new(SlideConfig::default())
    }

    /// Ticks at which a slide kick was emitted, 1-based.
    fn kick_ticks(rig: &mut Rig, ticks: usize, dt_ms: f32) -> Vec<usize> {
        let lane = lane();
        let mut at = Vec::new();
        for tick in 1..=ticks {
            let before = rig.events.len();
            rig.run(&lane, dt_ms).unwrap();
            if rig.events[before..]
                .iter()
                .any(|e| matches!(e, ControlEvent::SlideKick { .. }))
            {
                at.push(tick);
            }
        }
        at
    }

    #[test]
    fn first_window_only_anchors() {
        let mut rig = Rig::new('h', Vec2::new(2.0, 0.7), 0.0, Vec2::new(0.0, 0.7));
        for _ in 0..6 {
            rig.run(&lane(), 100.0).unwrap();
        }
        assert_eq!(rig.control.last_x, Some(2.0));
        assert!(!rig.control.is_stuck_moving);
        assert_eq!(rig.control.timers.pos_check, 0.0);
    }

    #[test]
    fn motionless_letter_gets_one_kick_per_wait() {
        // windows close at ticks 6, 12, 18...; stuck from tick 12, 31 ticks of
        // accumulation exceed the 3000 ms wait.
        let mut rig = Rig::new('h', Vec2::new(2.0, 0.7), 0.0, Vec2::new(0.0, 0.7));
        assert_eq!(kick_ticks(&mut rig, 100, 100.0), vec![42, 78]);

        let linvel = rig.world.linvel(rig.body);
        assert_eq!(linvel, Vec2::new(-3.0, 1.5));
    }

    #[test]
    fn hooked_letters_wait_less_and_hop_higher() {
        let mut rig = Rig::new('k', Vec2::new(-1.0, 0.7), 0.0, Vec2::new(0.0, 0.7));
        // stuck from tick 12, 11 ticks exceed the 1000 ms wait
        assert_eq!(kick_ticks(&mut rig, 30, 100.0)[0], 22);
        assert_eq!(rig.world.linvel(rig.body), Vec2::new(1.5, 2.5));
    }

    #[test]
    fn out_of_range_decays_the_timer() {
        let mut rig = Rig::new('h', Vec2::new(0.1, 0.7), 0.0, Vec2::new(0.0, 0.7));
        rig.control.timers.slide = 25.0;
        rig.control.is_stuck_moving = true;
        for _ in 0..3 {
            rig.run(&lane(), 16.6).unwrap();
        }
        assert_eq!(rig.control.timers.slide, 0.0);
        assert!(rig.events.is_empty());
    }

    #[test]
    fn creeping_letter_keeps_its_anchor() {
        let mut rig = Rig::new('h', Vec2::new(2.0, 0.7), 0.0, Vec2::new(0.0, 0.7));
        rig.control.last_x = Some(2.0);
        rig.world.set_body_pose(rig.body, Vec2::new(1.99, 0.7), 0.0);
        for _ in 0..6 {
            rig.run(&lane(), 100.0).unwrap();
        }
        assert!(rig.control.is_stuck_moving);
        assert_eq!(rig.control.last_x, Some(2.0));

        rig.world.set_body_pose(rig.body, Vec2::new(1.9, 0.7), 0.0);
        for _ in 0..6 {
            rig.run(&lane(), 100.0).unwrap();
        }
        assert!(!rig.control.is_stuck_moving);
        assert_eq!(rig.control.last_x, Some(1.9));
    }
}
