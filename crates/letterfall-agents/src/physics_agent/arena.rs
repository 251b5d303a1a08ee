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

//! Floor and side walls around the word.

use letterfall_core::config::ArenaConfig;
use letterfall_core::math::{ease_toward, Vec2, EPSILON};
use letterfall_core::physics::{
    BodyType, ColliderDesc, ColliderHandle, ColliderShape, PhysicsWorld, RigidBodyDesc,
    RigidBodyHandle,
};

/// The static geometry letters land on and bounce off.
///
/// The visible height (the frustum) eases toward a target sized to the
/// current word, and the side walls follow the visible edges.
#[derive(Debug)]
pub struct Arena {
    config: ArenaConfig,
    floor: Option<RigidBodyHandle>,
    walls: Option<[ColliderHandle; 2]>,
    wall_x: Option<f32>,
    current_frustum: f32,
    target_frustum: f32,
}

impl Arena {
    /// An arena with no geometry yet.
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            current_frustum: config.initial_frustum,
            target_frustum: config.initial_frustum,
            config,
            floor: None,
            walls: None,
            wall_x: None,
        }
    }

    /// Creates the fixed floor. Does nothing if it already exists.
    pub fn install_floor(&mut self, world: &mut dyn PhysicsWorld) {
        if self.floor.is_some() {
            return;
        }
        let cfg = &self.config;
        let floor = world.add_body(RigidBodyDesc {
            position: Vec2::new(0.0, cfg.floor_y),
            body_type: BodyType::Static,
            ..Default::default()
        });
        let mut ground = ColliderDesc::new(ColliderShape::Cuboid(Vec2::new(
            cfg.floor_half_width,
            cfg.floor_half_height,
        )));
        ground.parent_body = Some(floor);
        world.add_collider(ground);
        self.floor = Some(floor);
    }

    /// Frustum height that fits a word of the given width.
    pub fn frustum_for(&self, word_width: f32) -> f32 {
        let cfg = &self.config;
        ((word_width + cfg.padding()) / cfg.aspect).max(cfg.min_frustum())
    }

    /// Points the camera at a word of the given width.
    pub fn frame_word(&mut self, word_width: f32) {
        self.target_frustum = self.frustum_for(word_width);
        log::debug!("Arena framing {word_width:.2} wide, frustum {:.2}", self.target_frustum);
    }

    /// Eases the frustum and rebuilds the walls when they moved.
    ///
    /// Returns `true` when the walls were rebuilt.
    pub fn update(&mut self, world: &mut dyn PhysicsWorld) -> bool {
        self.current_frustum = ease_toward(
            self.current_frustum,
            self.target_frustum,
            self.config.ease_factor,
        );

        let wall_x = self.current_frustum * self.config.aspect / 2.0 + self.config.wall_half_width;
        if self
            .wall_x
            .is_some_and(|previous| (previous - wall_x).abs() <= EPSILON)
        {
            return false;
        }

        if let Some(walls) = self.walls.take() {
            for wall in walls {
                world.remove_collider(wall);
            }
        }
        let half = Vec2::new(self.config.wall_half_width, self.config.wall_half_height);
        let mut wall = |x: f32| {
            let mut desc = ColliderDesc::new(ColliderShape::Cuboid(half));
            desc.position = Vec2::new(x, self.config.wall_y);
            world.add_collider(desc)
        };
        self.walls = Some([wall(-wall_x), wall(wall_x)]);
        self.wall_x = Some(wall_x);
        true
    }

    /// Visible height right now.
    pub fn current_frustum(&self) -> f32 {
        self.current_frustum
    }

    /// Visible height the camera is easing toward.
    pub fn target_frustum(&self) -> f32 {
        self.target_frustum
    }

    /// Visible width the camera is easing toward.
    pub fn target_width(&self) -> f32 {
        self.target_frustum * self.config.aspect
    }

    /// Centre of the right wall; the left one mirrors it.
    pub fn wall_x(&self) -> Option<f32> {
        self.wall_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use letterfall_core::physics::MemoryWorld;

    #[test]
    fn short_words_keep_the_minimum_frustum() {
        let arena = Arena::new(ArenaConfig::default());
        assert_relative_eq!(arena.frustum_for(2.2), 12.0);
        assert_relative_eq!(arena.frustum_for(30.0), 36.0 / (16.0 / 9.0), epsilon = 1e-4);

        let narrow = Arena::new(ArenaConfig {
            narrow: true,
            ..Default::default()
        });
        assert_relative_eq!(narrow.frustum_for(2.2), 25.0);
    }

    #[test]
    fn walls_follow_the_easing_frustum() {
        let mut world = MemoryWorld::new();
        let mut arena = Arena::new(ArenaConfig::default());
        arena.install_floor(&mut world);
        arena.install_floor(&mut world);
        assert_eq!((world.body_count(), world.collider_count()), (1, 1));

        assert!(arena.update(&mut world));
        assert_eq!(world.collider_count(), 3);
        let first = arena.wall_x().unwrap();
        assert_relative_eq!(first, 15.0 * 16.0 / 9.0 / 2.0 + 0.5, epsilon = 1e-4);

        // nothing to do while the frustum stays put
        assert!(!arena.update(&mut world));

        arena.frame_word(2.2);
        assert!(arena.update(&mut world));
        assert!(arena.wall_x().unwrap() < first);
        assert_eq!(world.collider_count(), 3);
        assert_relative_eq!(arena.current_frustum(), 15.0 - 3.0 * 0.15, epsilon = 1e-4);
    }
}
