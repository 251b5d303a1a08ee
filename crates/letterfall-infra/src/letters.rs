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

//! Letter shape catalogue.
//!
//! Each lowercase character maps to a compound rigid body: a handful of ball
//! and cuboid colliders glued to one dynamic body. Lookup is a table keyed by
//! character; anything missing from the table spawns nothing.

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_4;

use letterfall_core::math::Vec2;
use letterfall_core::physics::{
    BodyType, ColliderDesc, ColliderShape, CollisionGroups, LetterFactory, PhysicsWorld,
    RigidBodyDesc, RigidBodyHandle,
};

/// One collider of a letter, relative to the letter's body.
#[derive(Debug, Clone, PartialEq)]
pub struct LetterPart {
    /// Collider geometry.
    pub shape: ColliderShape,
    /// Offset from the body origin.
    pub offset: Vec2,
    /// Local rotation in radians.
    pub rotation: f32,
    /// Friction coefficient.
    pub friction: f32,
    /// Density, drives the body's mass and centre of mass.
    pub density: f32,
}

impl LetterPart {
    fn ball(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Ball(radius),
            offset: Vec2::ZERO,
            rotation: 0.0,
            friction: 0.5,
            density: 1.0,
        }
    }

    fn cuboid(hx: f32, hy: f32) -> Self {
        Self {
            shape: ColliderShape::Cuboid(Vec2::new(hx, hy)),
            ..Self::ball(0.0)
        }
    }

    fn at(mut self, x: f32, y: f32) -> Self {
        self.offset = Vec2::new(x, y);
        self
    }

    fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    fn friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    fn density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }
}

/// Body settings and colliders for one character.
#[derive(Debug, Clone, PartialEq)]
pub struct LetterShape {
    /// Angular damping at spawn.
    pub angular_damping: f32,
    /// Linear damping at spawn.
    pub linear_damping: f32,
    /// Colliders attached to the body.
    pub parts: Vec<LetterPart>,
}

impl LetterShape {
    fn new(angular_damping: f32, parts: Vec<LetterPart>) -> Self {
        Self {
            angular_damping,
            linear_damping: 0.5,
            parts,
        }
    }

    fn linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }
}

/// Character to shape lookup, usable as a [`LetterFactory`].
#[derive(Debug, Clone)]
pub struct LetterCatalogue {
    shapes: HashMap<char, LetterShape>,
}

impl Default for LetterCatalogue {
    fn default() -> Self {
        Self::new()
    }
}

impl LetterCatalogue {
    /// The built-in lowercase alphabet.
    pub fn new() -> Self {
        let ball = LetterPart::ball;
        let cuboid = LetterPart::cuboid;
        let stem = || cuboid(0.2, 0.35);

        let table = [
            ('a', LetterShape::new(1.0, vec![
                ball(0.7).friction(0.7),
                cuboid(0.2, 0.7).at(0.5, 0.0),
            ])),
            ('b', LetterShape::new(2.0, vec![
                ball(0.7).friction(0.8),
                cuboid(0.2, 1.0).at(-0.5, 0.3),
            ])),
            ('c', LetterShape::new(10.0, vec![ball(0.7)])),
            ('d', LetterShape::new(2.0, vec![
                ball(0.7).friction(0.8),
                cuboid(0.2, 1.0).at(0.5, 0.3),
            ])),
            ('e', LetterShape::new(10.0, vec![
                ball(0.7),
                cuboid(0.5, 0.17).at(0.15, 0.0),
            ])),
            ('f', LetterShape::new(30.0, vec![
                cuboid(0.2, 0.55).at(-0.15, 0.45).friction(1.1),
                cuboid(0.3, 0.15).at(0.35, 1.15).friction(1.1),
                cuboid(0.4, 0.2).at(0.25, 0.3).friction(1.1),
            ]).linear_damping(30.0)),
            ('g', LetterShape::new(10.0, vec![ball(0.7).at(0.0, 0.7)])),
            ('h', LetterShape::new(3.0, vec![
                ball(0.7).at(0.0, 0.7).friction(0.8),
                stem().at(0.5, 0.35),
                cuboid(0.2, 1.0).at(-0.5, 1.0),
            ])),
            ('i', LetterShape::new(2.5, vec![
                stem().at(0.0, -0.25).density(10.0).friction(1.5),
                stem().at(0.0, 0.45).density(0.5),
                cuboid(0.2, 0.2).at(0.0, 1.2).density(0.1),
            ])),
            ('j', LetterShape::new(10.0, vec![
                cuboid(0.2, 0.2).at(0.3, 0.4).density(35.0).friction(1.2),
                cuboid(0.2, 0.5).at(0.3, 1.1).density(5.0).friction(1.2),
                cuboid(0.2, 0.2).at(0.3, 1.9).density(0.1),
            ]).linear_damping(5.0)),
            ('k', LetterShape::new(3.0, vec![
                cuboid(0.2, 1.05).at(-0.5, 0.35).friction(1.0),
                cuboid(0.4, 0.2).at(-0.017, -0.283).rotated(-FRAC_PI_4).friction(1.0),
                cuboid(0.4, 0.2).at(-0.017, 0.283).rotated(FRAC_PI_4).friction(1.0),
            ])),
            ('l', LetterShape::new(2.5, vec![
                cuboid(0.2, 0.2).at(0.0, -0.8).density(20.0).friction(1.5),
                cuboid(0.2, 0.8).at(0.0, 0.2).density(0.5),
            ]).linear_damping(0.1)),
            ('m', LetterShape::new(0.5, vec![
                ball(0.7).at(-0.5, 0.7),
                ball(0.7).at(0.5, 0.7),
                stem().at(-1.0, 0.35).friction(0.1),
                stem().at(1.0, 0.35).friction(0.1),
            ]).linear_damping(0.1)),
            ('n', LetterShape::new(2.5, vec![
                ball(0.7).at(0.0, 0.7).friction(0.8),
                stem().at(-0.5, 0.35),
                stem().at(0.5, 0.35),
            ])),
            ('o', LetterShape::new(10.0, vec![ball(0.7)])),
            ('p', LetterShape::new(1.5, vec![
                ball(0.7).friction(0.7),
                cuboid(0.2, 0.7).at(-0.5, 0.0),
            ])),
            ('q', LetterShape::new(1.5, vec![
                ball(0.7).friction(0.7),
                cuboid(0.2, 0.7).at(0.5, 0.0),
            ])),
            ('r', LetterShape::new(1.5, vec![
                stem().at(-0.5, 0.35).friction(1.0),
                ball(0.7).at(0.0, 0.7).friction(0.8),
            ])),
            ('s', LetterShape::new(2.5, vec![cuboid(0.7, 0.7).friction(1.1)])),
            ('t', LetterShape::new(2.5, vec![
                cuboid(0.2, 0.4).at(0.0, -0.4).density(6.0),
                cuboid(0.2, 0.4).at(0.0, 0.6).density(0.1),
                cuboid(0.6, 0.2).at(0.0, 0.4).density(0.1),
            ])),
            ('u', LetterShape::new(10.0, vec![
                ball(0.7),
                stem().at(-0.5, 0.35),
                stem().at(0.5, 0.35),
            ])),
            ('v', LetterShape::new(2.0, vec![
                cuboid(0.25, 0.1).at(0.0, -0.6).friction(1.2),
                cuboid(0.2, 0.65).at(-0.35, -0.005).rotated(0.45),
                cuboid(0.2, 0.65).at(0.35, -0.005).rotated(-0.45),
            ])),
            ('w', LetterShape::new(0.5, vec![
                ball(0.7).at(-0.5, 0.0).friction(0.8),
                ball(0.7).at(0.5, 0.0).friction(0.8),
                stem().at(-1.0, 0.35),
                stem().at(0.0, 0.35),
                stem().at(1.0, 0.35),
            ])),
            ('x', LetterShape::new(2.0, vec![cuboid(0.7, 0.7).friction(1.0)])),
            ('y', LetterShape::new(10.0, vec![
                ball(0.7),
                stem().at(-0.5, 0.35),
                stem().at(0.5, 0.35),
            ])),
            ('z', LetterShape::new(2.5, vec![cuboid(0.7, 0.7).friction(1.1)])),
        ];

        Self {
            shapes: table.into_iter().collect(),
        }
    }

    /// Shape for a character, if it has one.
    pub fn shape(&self, character: char) -> Option<&LetterShape> {
        self.shapes.get(&character)
    }

    /// Number of characters with a shape.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` when the catalogue holds no shape.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl LetterFactory for LetterCatalogue {
    fn supports(&self, character: char) -> bool {
        self.shapes.contains_key(&character)
    }

    fn spawn(
        &self,
        world: &mut dyn PhysicsWorld,
        character: char,
        position: Vec2,
        rotation: f32,
    ) -> Option<RigidBodyHandle> {
        let shape = self.shape(character)?;
        let body = world.add_body(RigidBodyDesc {
            position,
            rotation,
            body_type: BodyType::Dynamic,
            linear_damping: shape.linear_damping,
            angular_damping: shape.angular_damping,
            can_sleep: false,
            ccd_enabled: true,
            ..Default::default()
        });

        for part in &shape.parts {
            world.add_collider(ColliderDesc {
                parent_body: Some(body),
                position: part.offset,
                rotation: part.rotation,
                shape: part.shape.clone(),
                friction: part.friction,
                density: part.density,
                collision_groups: CollisionGroups::LETTER,
            });
        }
        log::trace!("Spawned '{character}' with {} colliders", shape.parts.len());
        Some(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letterfall_core::physics::MemoryWorld;

    #[test]
    fn covers_the_lowercase_alphabet() {
        let catalogue = LetterCatalogue::new();
        assert_eq!(catalogue.len(), 26);
        assert!(('a'..='z').all(|c| catalogue.supports(c)));
        for c in [' ', '?', 'A', '1'] {
            assert!(!catalogue.supports(c), "{c:?} should have no shape");
        }
    }

    #[test]
    fn spawn_attaches_every_part() {
        let catalogue = LetterCatalogue::new();
        let mut world = MemoryWorld::new();

        let w = catalogue
            .spawn(&mut world, 'w', Vec2::new(1.0, 8.0), 0.3)
            .unwrap();
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.collider_count(), 5);
        assert_eq!(world.translation(w), Vec2::new(1.0, 8.0));
        assert_eq!(world.body_type(w), Some(BodyType::Dynamic));

        world.remove_body(w);
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn unknown_characters_spawn_nothing() {
        let catalogue = LetterCatalogue::new();
        let mut world = MemoryWorld::new();
        assert!(catalogue.spawn(&mut world, ' ', Vec2::ZERO, 0.0).is_none());
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn spawn_uses_shape_damping() {
        let catalogue = LetterCatalogue::new();
        let mut world = MemoryWorld::new();
        let f = catalogue.spawn(&mut world, 'f', Vec2::ZERO, 0.0).unwrap();
        assert_eq!(world.damping(f), Some((30.0, 30.0)));
        let a = catalogue.spawn(&mut world, 'a', Vec2::ZERO, 0.0).unwrap();
        assert_eq!(world.damping(a), Some((0.5, 1.0)));
    }
}
