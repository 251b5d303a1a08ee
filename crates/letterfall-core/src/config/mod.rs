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

//! # Simulation Configuration
//!
//! Every tunable of the settling controller lives here, grouped by the lane or
//! agent that consumes it. `Default` reproduces the stock tuning, and every
//! section is `#[serde(default)]` so a TOML file only needs to name the values
//! it changes.

use serde::{Deserialize, Serialize};

/// How timer increments are derived each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimeStepMode {
    /// Every tick advances the timers by the same amount, whatever the wall clock says.
    Fixed {
        /// Milliseconds added per tick.
        nominal_ms: f32,
    },
    /// Timers advance by the elapsed time the caller measured, clamped.
    Measured {
        /// Upper bound on a single increment, guards against long stalls.
        max_measured_ms: f32,
    },
}

impl TimeStepMode {
    /// Resolves the increment for one tick given the caller's measurement.
    pub fn increment_ms(&self, measured_ms: f32) -> f32 {
        match *self {
            TimeStepMode::Fixed { nominal_ms } => nominal_ms,
            TimeStepMode::Measured { max_measured_ms } => {
                measured_ms.min(max_measured_ms).max(0.0)
            }
        }
    }
}

impl Default for TimeStepMode {
    fn default() -> Self {
        TimeStepMode::Fixed { nominal_ms: 16.6 }
    }
}

/// Timing of the simulation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Timer increment policy.
    pub step_mode: TimeStepMode,
    /// Physics integration step in seconds.
    pub physics_dt: f32,
    /// World gravity along y.
    pub gravity_y: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            step_mode: TimeStepMode::default(),
            physics_dt: 1.0 / 60.0,
            gravity_y: -10.0,
        }
    }
}

/// Learned control policy scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Height under which a letter counts as grounded.
    pub grounded_height: f32,
    /// Damping applied to both channels while airborne.
    pub airborne_damping: f32,
    /// Position error divisor in the observation.
    pub position_scale: f32,
    /// Velocity and angular velocity multiplier in the observation.
    pub velocity_scale: f32,
    /// Horizontal impulse per unit of action.
    pub force_gain: f32,
    /// Torque impulse per unit of action.
    pub torque_gain: f32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            grounded_height: 1.0,
            airborne_damping: 0.1,
            position_scale: 5.0,
            velocity_scale: 0.2,
            force_gain: 8.0,
            torque_gain: 2.0,
        }
    }
}

/// Settle and lock thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    /// Horizontal distance under which a letter counts as on target.
    pub position_tolerance: f32,
    /// Maximum horizontal speed for a stable letter.
    pub velocity_tolerance: f32,
    /// Maximum absolute rotation for a stable letter.
    pub rotation_tolerance: f32,
    /// Uninterrupted stable time required to lock, in milliseconds.
    pub confirm_ms: f32,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            position_tolerance: 0.2,
            velocity_tolerance: 0.1,
            rotation_tolerance: 0.1,
            confirm_ms: 1000.0,
        }
    }
}

/// Flip recovery monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Normalised rotation above which a letter counts as flipped.
    pub flip_threshold: f32,
    /// Speed under which a flipped letter counts as stuck, per axis.
    pub still_speed: f32,
    /// Time a letter must stay flipped and still before the kick.
    pub wait_ms: f32,
    /// Horizontal kick spread; the kick is `(r - 0.5) * spread`.
    pub kick_spread_x: f32,
    /// Upward kick velocity.
    pub kick_up: f32,
    /// Angular kick spread; the spin is `(r - 0.5) * spread`.
    pub spin_spread: f32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            flip_threshold: 0.8,
            still_speed: 0.5,
            wait_ms: 3000.0,
            kick_spread_x: 10.0,
            kick_up: 5.0,
            spin_spread: 30.0,
        }
    }
}

/// Slide assist monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideConfig {
    /// Length of the stuck-check window.
    pub check_window_ms: f32,
    /// Movement under which the anchor is kept so slow creep accumulates.
    pub creep_threshold: f32,
    /// Movement under which a regular letter counts as stuck.
    pub stuck_threshold: f32,
    /// Movement under which a hooked letter counts as stuck.
    pub hooked_stuck_threshold: f32,
    /// Letters that slide earlier and hop higher.
    pub hooked_chars: String,
    /// Minimum target distance for a kick.
    pub min_distance: f32,
    /// Maximum target distance for a kick.
    pub max_distance: f32,
    /// Stuck time before a regular letter is kicked.
    pub wait_ms: f32,
    /// Stuck time before a hooked letter is kicked.
    pub hooked_wait_ms: f32,
    /// Hop velocity for regular letters.
    pub hop: f32,
    /// Hop velocity for hooked letters.
    pub hooked_hop: f32,
    /// Horizontal speed per unit of distance.
    pub speed_per_distance: f32,
    /// Floor on the horizontal kick speed.
    pub min_speed: f32,
    /// Slide timer decay per tick when the conditions fail.
    pub decay_per_tick: f32,
}

impl SlideConfig {
    /// Returns `true` for letters using the hooked thresholds.
    pub fn is_hooked(&self, character: char) -> bool {
        self.hooked_chars.contains(character)
    }
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            check_window_ms: 500.0,
            creep_threshold: 0.02,
            stuck_threshold: 0.05,
            hooked_stuck_threshold: 0.04,
            hooked_chars: "kj".to_owned(),
            min_distance: 0.2,
            max_distance: 5.0,
            wait_ms: 3000.0,
            hooked_wait_ms: 1000.0,
            hop: 1.5,
            hooked_hop: 2.5,
            speed_per_distance: 1.5,
            min_speed: 1.0,
            decay_per_tick: 10.0,
        }
    }
}

/// Proximity-scaled damping for round letters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DampingConfig {
    /// Letters that receive the proximity damping.
    pub round_chars: String,
    /// Distance at which proximity starts rising from zero.
    pub radius: f32,
    /// Angular damping outside the radius.
    pub base_angular: f32,
    /// Linear damping outside the radius.
    pub base_linear: f32,
    /// Extra angular damping at full proximity.
    pub angular_gain: f32,
    /// Extra linear damping at full proximity.
    pub linear_gain: f32,
    /// Spin cap far from the target.
    pub max_spin: f32,
    /// Fraction of the spin cap removed at full proximity.
    pub spin_reduction: f32,
    /// Distance under which the upright torque kicks in.
    pub upright_distance: f32,
    /// Spin under which the upright torque kicks in.
    pub upright_max_spin: f32,
    /// Upright torque per radian of tilt at full proximity.
    pub upright_gain: f32,
}

impl DampingConfig {
    /// Returns `true` for letters that receive the proximity damping.
    pub fn applies_to(&self, character: char) -> bool {
        self.round_chars.contains(character)
    }
}

impl Default for DampingConfig {
    fn default() -> Self {
        Self {
            round_chars: "celoguy".to_owned(),
            radius: 0.6,
            base_angular: 2.0,
            base_linear: 0.5,
            angular_gain: 15.0,
            linear_gain: 5.0,
            max_spin: 4.0,
            spin_reduction: 0.8,
            upright_distance: 0.2,
            upright_max_spin: 1.0,
            upright_gain: 2.0,
        }
    }
}

/// Word layout and spawn placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between consecutive letters.
    pub spacing: f32,
    /// Resting height before the per-letter baseline offset.
    pub baseline_y: f32,
    /// Spawn height.
    pub spawn_height: f32,
    /// Fraction of the visible width used for spawn positions.
    pub spawn_spread: f32,
    /// Width of the spawn rotation range, centred on upright.
    pub spawn_tilt: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: 0.4,
            baseline_y: 0.7,
            spawn_height: 8.0,
            spawn_spread: 0.8,
            spawn_tilt: std::f32::consts::PI,
        }
    }
}

/// Arena and camera framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Narrow viewports get a wider minimum frustum and more padding.
    pub narrow: bool,
    /// Minimum frustum height on regular viewports.
    pub min_frustum: f32,
    /// Minimum frustum height on narrow viewports.
    pub narrow_min_frustum: f32,
    /// Horizontal padding around the word on regular viewports.
    pub padding: f32,
    /// Horizontal padding around the word on narrow viewports.
    pub narrow_padding: f32,
    /// Frustum height before the first word is framed.
    pub initial_frustum: f32,
    /// Fraction of the remaining frustum gap closed each tick.
    pub ease_factor: f32,
    /// Floor height.
    pub floor_y: f32,
    /// Floor half-width.
    pub floor_half_width: f32,
    /// Floor half-thickness.
    pub floor_half_height: f32,
    /// Wall half-thickness.
    pub wall_half_width: f32,
    /// Wall half-height.
    pub wall_half_height: f32,
    /// Wall centre height.
    pub wall_y: f32,
}

impl ArenaConfig {
    /// Minimum frustum height for the configured viewport.
    pub fn min_frustum(&self) -> f32 {
        if self.narrow {
            self.narrow_min_frustum
        } else {
            self.min_frustum
        }
    }

    /// Horizontal padding for the configured viewport.
    pub fn padding(&self) -> f32 {
        if self.narrow {
            self.narrow_padding
        } else {
            self.padding
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            aspect: 16.0 / 9.0,
            narrow: false,
            min_frustum: 12.0,
            narrow_min_frustum: 25.0,
            padding: 6.0,
            narrow_padding: 12.0,
            initial_frustum: 15.0,
            ease_factor: 0.15,
            floor_y: -0.1,
            floor_half_width: 50.0,
            floor_half_height: 0.1,
            wall_half_width: 0.5,
            wall_half_height: 100.0,
            wall_y: 5.0,
        }
    }
}

/// Debug overlay toggles read by the visual sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Show the ghost target pose of every letter.
    pub show_ghosts: bool,
    /// Show the impulse the control policy applied to every letter.
    pub show_muscles: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Loop timing.
    pub timing: TimingConfig,
    /// Control policy.
    pub policy: PolicyConfig,
    /// Settle and lock.
    pub settle: SettleConfig,
    /// Flip recovery.
    pub recovery: RecoveryConfig,
    /// Slide assist.
    pub slide: SlideConfig,
    /// Proximity damping.
    pub damping: DampingConfig,
    /// Word layout.
    pub layout: LayoutConfig,
    /// Arena framing.
    pub arena: ArenaConfig,
    /// Debug overlay.
    pub overlay: OverlayConfig,
    /// Seed of the driver's random generator. `None` seeds from entropy.
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_mode_ignores_measurement() {
        let mode = TimeStepMode::default();
        assert_eq!(mode.increment_ms(250.0), 16.6);
    }

    #[test]
    fn measured_mode_clamps() {
        let mode = TimeStepMode::Measured {
            max_measured_ms: 50.0,
        };
        assert_eq!(mode.increment_ms(20.0), 20.0);
        assert_eq!(mode.increment_ms(400.0), 50.0);
        assert_eq!(mode.increment_ms(-3.0), 0.0);
    }

    #[test]
    fn negative_measured_cap_stalls_timers_instead_of_panicking() {
        let mode = TimeStepMode::Measured {
            max_measured_ms: -5.0,
        };
        assert_eq!(mode.increment_ms(20.0), 0.0);
        assert_eq!(mode.increment_ms(f32::NAN), 0.0);
    }

    #[test]
    fn character_sets() {
        let config = SimulationConfig::default();
        assert!(config.slide.is_hooked('k'));
        assert!(!config.slide.is_hooked('h'));
        assert!(config.damping.applies_to('o'));
        assert!(!config.damping.applies_to('t'));
    }

    #[test]
    fn json_roundtrip_keeps_step_mode() {
        let mut config = SimulationConfig::default();
        config.timing.step_mode = TimeStepMode::Measured {
            max_measured_ms: 33.0,
        };
        let text = serde_json::to_string(&config).unwrap();
        let back: SimulationConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
