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

//! A collision-free, in-memory [`PhysicsWorld`].
//!
//! Bodies have unit mass and unit inertia and are integrated with explicit
//! Euler steps; colliders are bookkeeping only. This keeps control-layer tests
//! and headless replays fully deterministic.

use std::collections::HashMap;

use super::{
    BodyType, ColliderDesc, ColliderHandle, PhysicsWorld, RigidBodyDesc, RigidBodyHandle,
};
use crate::math::Vec2;

#[derive(Debug, Clone)]
struct MemoryBody {
    position: Vec2,
    rotation: f32,
    linvel: Vec2,
    angvel: f32,
    linear_damping: f32,
    angular_damping: f32,
    body_type: BodyType,
    impulses: usize,
}

/// Deterministic, collision-free physics world.
#[derive(Debug, Default)]
pub struct MemoryWorld {
    bodies: HashMap<u64, MemoryBody>,
    colliders: HashMap<u64, Option<RigidBodyHandle>>,
    gravity: Vec2,
    next_id: u64,
}

impl MemoryWorld {
    /// Creates an empty world without gravity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of impulse or torque-impulse calls a body has received.
    ///
    /// Calls are counted whatever the body type, so a caller that keeps
    /// pushing a kinematic body is still detected.
    pub fn impulse_count(&self, handle: RigidBodyHandle) -> usize {
        self.bodies.get(&handle.0).map_or(0, |b| b.impulses)
    }

    /// Current linear and angular damping of a body.
    pub fn damping(&self, handle: RigidBodyHandle) -> Option<(f32, f32)> {
        self.bodies
            .get(&handle.0)
            .map(|b| (b.linear_damping, b.angular_damping))
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl PhysicsWorld for MemoryWorld {
    fn step(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            if body.body_type != BodyType::Dynamic {
                continue;
            }
            body.linvel += self.gravity * dt;
            body.linvel = body.linvel * (1.0 / (1.0 + dt * body.linear_damping));
            body.angvel *= 1.0 / (1.0 + dt * body.angular_damping);
            body.position += body.linvel * dt;
            body.rotation += body.angvel * dt;
        }
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn add_body(&mut self, desc: RigidBodyDesc) -> RigidBodyHandle {
        let id = self.allocate();
        self.bodies.insert(
            id,
            MemoryBody {
                position: desc.position,
                rotation: desc.rotation,
                linvel: desc.linear_velocity,
                angvel: desc.angular_velocity,
                linear_damping: desc.linear_damping,
                angular_damping: desc.angular_damping,
                body_type: desc.body_type,
                impulses: 0,
            },
        );
        RigidBodyHandle(id)
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(&handle.0);
        self.colliders.retain(|_, parent| *parent != Some(handle));
    }

    fn add_collider(&mut self, desc: ColliderDesc) -> ColliderHandle {
        let id = self.allocate();
        self.colliders.insert(id, desc.parent_body);
        ColliderHandle(id)
    }

    fn remove_collider(&mut self, handle: ColliderHandle) {
        self.colliders.remove(&handle.0);
    }

    fn translation(&self, handle: RigidBodyHandle) -> Vec2 {
        self.bodies.get(&handle.0).map_or(Vec2::ZERO, |b| b.position)
    }

    fn rotation(&self, handle: RigidBodyHandle) -> f32 {
        self.bodies.get(&handle.0).map_or(0.0, |b| b.rotation)
    }

    fn linvel(&self, handle: RigidBodyHandle) -> Vec2 {
        self.bodies.get(&handle.0).map_or(Vec2::ZERO, |b| b.linvel)
    }

    fn angvel(&self, handle: RigidBodyHandle) -> f32 {
        self.bodies.get(&handle.0).map_or(0.0, |b| b.angvel)
    }

    fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            body.impulses += 1;
            if body.body_type == BodyType::Dynamic {
                body.linvel += impulse;
            }
        }
    }

    fn apply_torque_impulse(&mut self, handle: RigidBodyHandle, torque: f32) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            body.impulses += 1;
            if body.body_type == BodyType::Dynamic {
                body.angvel += torque;
            }
        }
    }

    fn set_linvel(&mut self, handle: RigidBodyHandle, linvel: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            body.linvel = linvel;
        }
    }

    fn set_angvel(&mut self, handle: RigidBodyHandle, angvel: f32) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            body.angvel = angvel;
        }
    }

    fn set_linear_damping(&mut self, handle: RigidBodyHandle, damping: f32) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            body.linear_damping = damping;
        }
    }

    fn set_angular_damping(&mut self, handle: RigidBodyHandle, damping: f32) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            body.angular_damping = damping;
        }
    }

    fn set_body_type(&mut self, handle: RigidBodyHandle, body_type: BodyType) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            body.body_type = body_type;
        }
    }

    fn body_type(&self, handle: RigidBodyHandle) -> Option<BodyType> {
        self.bodies.get(&handle.0).map(|b| b.body_type)
    }

    fn set_body_pose(&mut self, handle: RigidBodyHandle, position: Vec2, rotation: f32) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            body.position = position;
            body.rotation = rotation;
        }
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ColliderShape;
    use approx::assert_relative_eq;

    #[test]
    fn test_memory_world_integrates_velocity() {
        let mut world = MemoryWorld::new();
        let body = world.add_body(RigidBodyDesc {
            linear_velocity: Vec2::new(1.0, 0.0),
            ..Default::default()
        });
        world.step(0.5);
        assert_relative_eq!(world.translation(body).x, 0.5);
    }

    #[test]
    fn test_kinematic_bodies_ignore_impulses() {
        let mut world = MemoryWorld::new();
        let body = world.add_body(RigidBodyDesc {
            body_type: BodyType::Kinematic,
            ..Default::default()
        });
        world.apply_impulse(body, Vec2::new(5.0, 5.0));
        world.step(1.0);
        assert_eq!(world.translation(body), Vec2::ZERO);
        assert_eq!(world.impulse_count(body), 1);
    }

    #[test]
    fn test_removing_body_drops_attached_colliders() {
        let mut world = MemoryWorld::new();
        let body = world.add_body(RigidBodyDesc::default());
        let mut desc = ColliderDesc::new(ColliderShape::Ball(0.7));
        desc.parent_body = Some(body);
        world.add_collider(desc);
        world.add_collider(ColliderDesc::new(ColliderShape::Cuboid(Vec2::new(50.0, 0.1))));
        assert_eq!(world.collider_count(), 2);

        world.remove_body(body);
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 1);
    }
}
