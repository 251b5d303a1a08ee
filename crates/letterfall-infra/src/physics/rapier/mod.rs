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

//! Rapier implementation of the physics world.

mod conversions;

use conversions::*;
use letterfall_core::math::Vec2;
use letterfall_core::physics::{
    BodyType, ColliderDesc, ColliderHandle, ColliderShape, PhysicsWorld, RigidBodyDesc,
    RigidBodyHandle,
};
use rapier2d::prelude::*;
use std::num::NonZeroUsize;

/// Solver tuning for letter bodies: four iterations and penetration correction
/// capped at one unit per second.
fn letter_integration_parameters() -> IntegrationParameters {
    IntegrationParameters {
        num_solver_iterations: NonZeroUsize::MIN.saturating_add(3),
        normalized_max_corrective_velocity: 1.0,
        ..IntegrationParameters::default()
    }
}

/// Implementation of the `PhysicsWorld` trait using the Rapier2D physics engine.
pub struct RapierWorld {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: Vector::new(0.0, -10.0),
            integration_parameters: letter_integration_parameters(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }
}

impl RapierWorld {
    /// Creates an empty world with gravity `(0, -10)`.
    pub fn new() -> Self {
        Self::default()
    }

    fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(to_rapier_body(handle))
    }

    fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(to_rapier_body(handle))
    }
}

impl std::fmt::Debug for RapierWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RapierWorld")
            .field("bodies", &self.rigid_body_set.len())
            .field("colliders", &self.collider_set.len())
            .field("gravity", &self.gravity)
            .finish()
    }
}

impl PhysicsWorld for RapierWorld {
    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = to_rapier_vec(gravity);
    }

    fn add_body(&mut self, desc: RigidBodyDesc) -> RigidBodyHandle {
        let rb_type = match desc.body_type {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Static => RigidBodyType::Fixed,
            BodyType::Kinematic => RigidBodyType::KinematicPositionBased,
        };

        let rigid_body = RigidBodyBuilder::new(rb_type)
            .translation(to_rapier_vec(desc.position))
            .rotation(desc.rotation)
            .linvel(to_rapier_vec(desc.linear_velocity))
            .angvel(desc.angular_velocity)
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .can_sleep(desc.can_sleep)
            .ccd_enabled(desc.ccd_enabled)
            .build();

        from_rapier_body(self.rigid_body_set.insert(rigid_body))
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            to_rapier_body(handle),
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    fn add_collider(&mut self, desc: ColliderDesc) -> ColliderHandle {
        let builder = match desc.shape {
            ColliderShape::Ball(radius) => ColliderBuilder::ball(radius),
            ColliderShape::Cuboid(half) => ColliderBuilder::cuboid(half.x, half.y),
        };
        let collider = builder
            .translation(to_rapier_vec(desc.position))
            .rotation(desc.rotation)
            .friction(desc.friction)
            .density(desc.density)
            .collision_groups(to_rapier_groups(desc.collision_groups))
            .build();

        let handle = match desc.parent_body {
            Some(parent) => self.collider_set.insert_with_parent(
                collider,
                to_rapier_body(parent),
                &mut self.rigid_body_set,
            ),
            None => self.collider_set.insert(collider),
        };
        from_rapier_collider(handle)
    }

    fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set.remove(
            to_rapier_collider(handle),
            &mut self.island_manager,
            &mut self.rigid_body_set,
            true,
        );
    }

    fn translation(&self, handle: RigidBodyHandle) -> Vec2 {
        self.body(handle)
            .map_or(Vec2::ZERO, |rb| from_rapier_vec(rb.translation()))
    }

    fn rotation(&self, handle: RigidBodyHandle) -> f32 {
        self.body(handle).map_or(0.0, |rb| rb.rotation().angle())
    }

    fn linvel(&self, handle: RigidBodyHandle) -> Vec2 {
        self.body(handle)
            .map_or(Vec2::ZERO, |rb| from_rapier_vec(rb.linvel()))
    }

    fn angvel(&self, handle: RigidBodyHandle) -> f32 {
        self.body(handle).map_or(0.0, |rb| rb.angvel())
    }

    fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec2) {
        if let Some(rb) = self.body_mut(handle) {
            rb.apply_impulse(to_rapier_vec(impulse), true);
        }
    }

    fn apply_torque_impulse(&mut self, handle: RigidBodyHandle, torque: f32) {
        if let Some(rb) = self.body_mut(handle) {
            rb.apply_torque_impulse(torque, true);
        }
    }

    fn set_linvel(&mut self, handle: RigidBodyHandle, linvel: Vec2) {
        if let Some(rb) = self.body_mut(handle) {
            rb.set_linvel(to_rapier_vec(linvel), true);
        }
    }

    fn set_angvel(&mut self, handle: RigidBodyHandle, angvel: f32) {
        if let Some(rb) = self.body_mut(handle) {
            rb.set_angvel(angvel, true);
        }
    }

    fn set_linear_damping(&mut self, handle: RigidBodyHandle, damping: f32) {
        if let Some(rb) = self.body_mut(handle) {
            rb.set_linear_damping(damping);
        }
    }

    fn set_angular_damping(&mut self, handle: RigidBodyHandle, damping: f32) {
        if let Some(rb) = self.body_mut(handle) {
            rb.set_angular_damping(damping);
        }
    }

    fn set_body_type(&mut self, handle: RigidBodyHandle, body_type: BodyType) {
        let rb_type = match body_type {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Static => RigidBodyType::Fixed,
            BodyType::Kinematic => RigidBodyType::KinematicPositionBased,
        };
        if let Some(rb) = self.body_mut(handle) {
            rb.set_body_type(rb_type, true);
        }
    }

    fn body_type(&self, handle: RigidBodyHandle) -> Option<BodyType> {
        self.body(handle).map(|rb| match rb.body_type() {
            RigidBodyType::Dynamic => BodyType::Dynamic,
            RigidBodyType::Fixed => BodyType::Static,
            RigidBodyType::KinematicPositionBased | RigidBodyType::KinematicVelocityBased => {
                BodyType::Kinematic
            }
        })
    }

    fn set_body_pose(&mut self, handle: RigidBodyHandle, position: Vec2, rotation: f32) {
        if let Some(rb) = self.body_mut(handle) {
            rb.set_translation(to_rapier_vec(position), true);
            rb.set_rotation(Rotation::new(rotation), true);
        }
    }

    fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    fn collider_count(&self) -> usize {
        self.collider_set.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn solver_is_tuned_for_letters() {
        let world = RapierWorld::new();
        let params = &world.integration_parameters;
        assert_eq!(params.num_solver_iterations.get(), 4);
        assert_relative_eq!(params.normalized_max_corrective_velocity, 1.0);
        assert_relative_eq!(world.gravity.y, -10.0);
    }

    fn ball(world: &mut RapierWorld, position: Vec2) -> RigidBodyHandle {
        let body = world.add_body(RigidBodyDesc {
            position,
            ..Default::default()
        });
        let mut collider = ColliderDesc::new(ColliderShape::Ball(0.5));
        collider.parent_body = Some(body);
        world.add_collider(collider);
        body
    }

    #[test]
    fn test_bodies_fall_under_gravity() {
        let mut world = RapierWorld::new();
        let body = ball(&mut world, Vec2::new(0.0, 10.0));
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        assert!(world.translation(body).y < 10.0);
        assert!(world.linvel(body).y < 0.0);
    }

    #[test]
    fn test_kinematic_bodies_hold_their_pose() {
        let mut world = RapierWorld::new();
        let body = ball(&mut world, Vec2::new(1.0, 3.0));
        world.set_body_type(body, BodyType::Kinematic);
        world.set_body_pose(body, Vec2::new(1.0, 3.0), 0.25);
        world.apply_impulse(body, Vec2::new(100.0, 0.0));
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        assert_eq!(world.body_type(body), Some(BodyType::Kinematic));
        assert_relative_eq!(world.translation(body).x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(world.translation(body).y, 3.0, epsilon = 1e-5);
        assert_relative_eq!(world.rotation(body), 0.25, epsilon = 1e-5);
    }

    #[test]
    fn test_removing_a_body_removes_its_colliders() {
        let mut world = RapierWorld::new();
        let body = ball(&mut world, Vec2::ZERO);
        world.add_collider(ColliderDesc::new(ColliderShape::Cuboid(Vec2::new(50.0, 0.1))));
        assert_eq!((world.body_count(), world.collider_count()), (1, 2));

        world.remove_body(body);
        assert_eq!((world.body_count(), world.collider_count()), (0, 1));
        // stale handles read as neutral values
        assert_eq!(world.translation(body), Vec2::ZERO);
        assert_eq!(world.body_type(body), None);
    }

    #[test]
    fn test_floor_stops_a_fall() {
        let mut world = RapierWorld::new();
        let floor = world.add_body(RigidBodyDesc {
            position: Vec2::new(0.0, -0.1),
            body_type: BodyType::Static,
            ..Default::default()
        });
        let mut ground = ColliderDesc::new(ColliderShape::Cuboid(Vec2::new(50.0, 0.1)));
        ground.parent_body = Some(floor);
        world.add_collider(ground);

        let body = ball(&mut world, Vec2::new(0.0, 3.0));
        for _ in 0..300 {
            world.step(1.0 / 60.0);
        }
        let y = world.translation(body).y;
        assert!(y > 0.3 && y < 0.7, "ball should rest on the floor, y = {y}");
    }
}
