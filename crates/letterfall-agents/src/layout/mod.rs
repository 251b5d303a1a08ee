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

//! Horizontal layout of a word: where each letter should come to rest.

use letterfall_core::config::LayoutConfig;
use letterfall_core::math::Vec2;

/// Advance width of characters missing from the metrics table.
pub const DEFAULT_ADVANCE: f32 = 1.4;

/// Horizontal footprint of a character.
pub fn advance_width(character: char) -> f32 {
    match character {
        'c' | 'e' | 'o' | 'u' | 'y' => 1.2,
        'i' | 'j' | 'l' => 0.4,
        'k' | 'r' | 't' => 1.0,
        'm' | 'w' => 2.4,
        _ => DEFAULT_ADVANCE,
    }
}

/// Horizontal nudge applied to a character's slot centre.
pub fn kerning(character: char) -> f32 {
    match character {
        'j' => -0.35,
        'r' => 0.1,
        _ => 0.0,
    }
}

/// Vertical offset of a character's resting pose from the common baseline.
pub fn baseline_offset(character: char) -> f32 {
    match character {
        'f' => -0.6,
        'g' => -0.7,
        'j' => -0.9,
        'i' => -0.1,
        'x' => -0.05,
        'l' => 0.3,
        't' => 0.1,
        'h' | 'm' | 'n' | 'r' => -0.7,
        _ => 0.0,
    }
}

/// Where one character of the word belongs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterSlot {
    /// Position of the character in the word.
    pub index: usize,
    /// The character.
    pub character: char,
    /// Resting pose.
    pub target: Vec2,
}

/// Every character of a word laid out centred on `x = 0`.
///
/// Characters without a body still take up room, so a space separates the
/// words around it.
#[derive(Debug, Clone, PartialEq)]
pub struct WordLayout {
    slots: Vec<LetterSlot>,
    total_width: f32,
}

impl WordLayout {
    /// Lays out `word` with the given spacing and baseline.
    pub fn new(word: &str, config: &LayoutConfig) -> Self {
        let total_width = Self::measure(word, config.spacing);
        let mut cursor = -total_width / 2.0;

        let slots = word
            .chars()
            .enumerate()
            .map(|(index, character)| {
                let width = advance_width(character);
                let slot = LetterSlot {
                    index,
                    character,
                    target: Vec2::new(
                        cursor + width / 2.0 + kerning(character),
                        config.baseline_y + baseline_offset(character),
                    ),
                };
                cursor += width + config.spacing;
                slot
            })
            .collect();

        Self { slots, total_width }
    }

    /// Width of `word` from the left edge of its first character to the
    /// right edge of its last one.
    pub fn measure(word: &str, spacing: f32) -> f32 {
        let (sum, count) = word
            .chars()
            .fold((0.0, 0usize), |(sum, count), c| (sum + advance_width(c), count + 1));
        if count == 0 {
            0.0
        } else {
            sum + spacing * (count - 1) as f32
        }
    }

    /// All slots in word order.
    pub fn slots(&self) -> &[LetterSlot] {
        &self.slots
    }

    /// Total width as returned by [`WordLayout::measure`].
    pub fn total_width(&self) -> f32 {
        self.total_width
    }
}
