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

//! Per-letter presentation state handed to whatever draws the scene.

use letterfall_core::config::OverlayConfig;
use letterfall_core::control::LetterTimers;
use letterfall_core::math::Vec2;
use letterfall_core::physics::BodyState;
use letterfall_lanes::control_lane::PolicyImpulse;

const STRETCH: f32 = 0.1;
const SCALE_RELAX: f32 = 0.1;
const TRAIL_MIN_SPEED: f32 = 5.0;
const TRAIL_INTERVAL_MS: f32 = 60.0;
const TRAIL_FADE: f32 = 0.04;
const TRAIL_SHRINK: f32 = 0.98;
const TRAIL_SPAWN_OPACITY: f32 = 0.3;
const TRAIL_OPACITY: f32 = 0.2;

/// A fading afterimage left behind a fast letter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trail {
    /// Pose when the trail was dropped.
    pub position: Vec2,
    /// Rotation when the trail was dropped.
    pub rotation: f32,
    /// Remaining life in `(0, 1]`.
    pub life: f32,
    /// Current opacity.
    pub opacity: f32,
    /// Current scale.
    pub scale: Vec2,
}

/// Outline of the pose a letter is aiming for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostPose {
    /// Target position.
    pub position: Vec2,
    /// Target rotation, always upright.
    pub rotation: f32,
}

/// What a renderer needs to draw one letter.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualState {
    /// Body position.
    pub position: Vec2,
    /// Body rotation.
    pub rotation: f32,
    /// Squash and stretch factors.
    pub scale: Vec2,
    /// Live afterimages, oldest first.
    pub trails: Vec<Trail>,
    /// Target outline, when ghosts are shown.
    pub ghost: Option<GhostPose>,
    /// How close a corrective kick is, from 0 to 1.
    pub strain: f32,
    /// Last policy impulse, when muscles are shown.
    pub muscle: Option<PolicyImpulse>,
    /// `false` once the letter has locked.
    pub active: bool,
    trail_timer: f32,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            trails: Vec::new(),
            ghost: None,
            strain: 0.0,
            muscle: None,
            active: true,
            trail_timer: 0.0,
        }
    }
}

impl VisualState {
    /// Refreshes everything from this tick's body state.
    ///
    /// `strain_window_ms` is the wait before a corrective kick; the strain
    /// glow reaches 1 when either timer gets there.
    #[allow(clippy::too_many_arguments)]
    pub fn sync(
        &mut self,
        state: &BodyState,
        locked: bool,
        timers: &LetterTimers,
        target: Vec2,
        impulse: Option<PolicyImpulse>,
        dt_ms: f32,
        overlay: &OverlayConfig,
        strain_window_ms: f32,
    ) {
        self.position = state.position;
        self.rotation = state.rotation;
        self.active = !locked;

        if locked {
            self.scale = Vec2::lerp(self.scale, Vec2::ONE, SCALE_RELAX);
            self.strain = 0.0;
        } else {
            let squash = 1.0 + (state.linvel.y * 0.1).abs() * STRETCH;
            self.scale = Vec2::new(1.0 / squash, squash);
            self.strain = if strain_window_ms > 0.0 {
                (timers.recovery.max(timers.slide) / strain_window_ms).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }

        self.trail_timer += dt_ms;
        if !locked && state.linvel.length() > TRAIL_MIN_SPEED && self.trail_timer > TRAIL_INTERVAL_MS
        {
            self.trails.push(Trail {
                position: state.position,
                rotation: state.rotation,
                life: 1.0,
                opacity: TRAIL_SPAWN_OPACITY,
                scale: self.scale,
            });
            self.trail_timer = 0.0;
        }
        for trail in &mut self.trails {
            trail.life -= TRAIL_FADE;
            trail.opacity = trail.life * TRAIL_OPACITY;
            trail.scale = trail.scale * TRAIL_SHRINK;
        }
        self.trails.retain(|trail| trail.life > 0.0);

        self.ghost = overlay.show_ghosts.then_some(GhostPose {
            position: target,
            rotation: 0.0,
        });
        self.muscle = if overlay.show_muscles && !locked {
            impulse
        } else {
            None
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn moving(vx: f32, vy: f32) -> BodyState {
        BodyState {
            position: Vec2::new(1.0, 2.0),
            linvel: Vec2::new(vx, vy),
            ..Default::default()
        }
    }

    fn sync(visual: &mut VisualState, state: &BodyState, locked: bool, overlay: &OverlayConfig) {
        visual.sync(
            state,
            locked,
            &LetterTimers::default(),
            Vec2::new(0.5, 0.7),
            Some(PolicyImpulse {
                force_x: 1.0,
                torque: 0.5,
            }),
            16.6,
            overlay,
            3000.0,
        );
    }

    #[test]
    fn falling_letters_stretch_and_locked_ones_relax() {
        let mut visual = VisualState::default();
        let overlay = OverlayConfig::default();
        sync(&mut visual, &moving(0.0, -10.0), false, &overlay);
        assert_relative_eq!(visual.scale.y, 1.1, epsilon = 1e-6);
        assert_relative_eq!(visual.scale.x, 1.0 / 1.1, epsilon = 1e-6);

        sync(&mut visual, &moving(0.0, 0.0), true, &overlay);
        assert!(visual.scale.y < 1.1 && visual.scale.y > 1.0);
        assert!(!visual.active);
    }

    #[test]
    fn fast_letters_leave_fading_trails() {
        let mut visual = VisualState::default();
        let overlay = OverlayConfig::default();
        for _ in 0..4 {
            sync(&mut visual, &moving(6.0, 0.0), false, &overlay);
        }
        // the timer passes 60 ms on the fourth tick
        assert_eq!(visual.trails.len(), 1);
        assert_relative_eq!(visual.trails[0].life, 0.96, epsilon = 1e-6);

        for _ in 0..30 {
            sync(&mut visual, &moving(0.0, 0.0), false, &overlay);
        }
        assert!(visual.trails.is_empty());
    }

    #[test]
    fn overlays_follow_the_toggles() {
        let mut visual = VisualState::default();
        sync(&mut visual, &moving(0.0, 0.0), false, &OverlayConfig::default());
        assert_eq!(visual.ghost, None);
        assert_eq!(visual.muscle, None);

        let overlay = OverlayConfig {
            show_ghosts: true,
            show_muscles: true,
        };
        sync(&mut visual, &moving(0.0, 0.0), false, &overlay);
        assert_eq!(visual.ghost.map(|g| g.position), Some(Vec2::new(0.5, 0.7)));
        assert!(visual.muscle.is_some());
    }

    #[test]
    fn strain_tracks_the_longest_timer() {
        let mut visual = VisualState::default();
        let timers = LetterTimers {
            recovery: 1500.0,
            slide: 600.0,
            ..Default::default()
        };
        visual.sync(
            &moving(0.0, 0.0),
            false,
            &timers,
            Vec2::ZERO,
            None,
            16.6,
            &OverlayConfig::default(),
            3000.0,
        );
        assert_relative_eq!(visual.strain, 0.5);
    }
}
