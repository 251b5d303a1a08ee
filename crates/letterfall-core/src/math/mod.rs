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

//! Planar math primitives.
//!
//! The simulation lives in the XY plane: positions and velocities are [`Vec2`],
//! rotations are signed scalars in **radians**.

// --- Fundamental Constants ---

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub use std::f32::consts::{FRAC_PI_2, PI, TAU};

pub mod vector;

pub use self::vector::Vec2;

// --- Utility Functions ---

/// Wraps an angle into the half-open interval `(-PI, PI]`.
///
/// # Examples
///
/// ```
/// use letterfall_core::math::{normalize_angle, TAU};
/// assert!((normalize_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
/// assert!((normalize_angle(-0.5) + 0.5).abs() < 1e-6);
/// ```
#[inline]
pub fn normalize_angle(radians: f32) -> f32 {
    let wrapped = radians.sin().atan2(radians.cos());
    // atan2 returns [-PI, PI]; fold the lower bound onto the upper one.
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Returns the sign of `value` as `-1.0`, `0.0` or `1.0`.
///
/// Unlike [`f32::signum`], zero (of either sign) maps to `0.0`, so a zero
/// error never produces a corrective push.
#[inline]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Moves `current` toward `target` by the fraction `factor` of the remaining gap.
#[inline]
pub fn ease_toward(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(2.5), 1.0);
        assert_eq!(sign(-0.001), -1.0);
    }

    #[test]
    fn normalize_angle_wraps_into_half_open_range() {
        assert_relative_eq!(normalize_angle(FRAC_PI_2), FRAC_PI_2, epsilon = 1e-5);
        assert_relative_eq!(normalize_angle(TAU + 0.25), 0.25, epsilon = 1e-5);
        assert_relative_eq!(normalize_angle(-TAU - 0.25), -0.25, epsilon = 1e-5);
        let flipped = normalize_angle(-PI);
        assert!(flipped > 0.0, "-PI must fold onto +PI, got {flipped}");
    }

    #[test]
    fn ease_toward_clamps_factor() {
        assert_relative_eq!(ease_toward(10.0, 20.0, 0.15), 11.5);
        assert_relative_eq!(ease_toward(10.0, 20.0, 4.0), 20.0);
    }
}
