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

//! # Physics Abstractions
//!
//! The contract every planar physics backend implements. The control layer
//! only ever talks to a [`PhysicsWorld`]; concrete engines live in
//! `letterfall-infra`.

mod memory;

pub use memory::MemoryWorld;

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Opaque handle to a rigid body in the physics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RigidBodyHandle(pub u64);

/// Opaque handle to a collider in the physics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColliderHandle(pub u64);

/// Defines the type of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    /// Responds to forces and collisions.
    Dynamic,
    /// Fixed in place, does not move.
    Static,
    /// Position-driven pose holder, ignores forces.
    Kinematic,
}

/// Description for creating a rigid body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBodyDesc {
    /// Initial position.
    pub position: Vec2,
    /// Initial rotation in radians.
    pub rotation: f32,
    /// Body type.
    pub body_type: BodyType,
    /// Initial linear velocity.
    pub linear_velocity: Vec2,
    /// Initial angular velocity in radians per second.
    pub angular_velocity: f32,
    /// Linear damping coefficient.
    pub linear_damping: f32,
    /// Angular damping coefficient.
    pub angular_damping: f32,
    /// Whether the engine may put the body to sleep when it comes to rest.
    pub can_sleep: bool,
    /// Enables continuous collision detection.
    pub ccd_enabled: bool,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            body_type: BodyType::Dynamic,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            can_sleep: true,
            ccd_enabled: false,
        }
    }
}

/// Collision filtering, expressed as 16-bit membership and filter masks.
///
/// Two colliders interact when each one's memberships intersect the other's filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionGroups {
    /// Groups this collider belongs to.
    pub memberships: u16,
    /// Groups this collider can interact with.
    pub filter: u16,
}

impl CollisionGroups {
    /// Member of every group, interacts with every group.
    pub const ALL: Self = Self {
        memberships: u16::MAX,
        filter: u16::MAX,
    };

    /// Letter bodies: member of group 1, interact only with group 2.
    ///
    /// Arena colliders use [`CollisionGroups::ALL`], so letters land on the floor
    /// and bounce off the walls while passing through one another.
    pub const LETTER: Self = Self {
        memberships: 0x0001,
        filter: 0x0002,
    };

    /// Returns `true` when colliders with these two group settings interact.
    pub fn interacts_with(&self, other: &CollisionGroups) -> bool {
        (self.memberships & other.filter) != 0 && (other.memberships & self.filter) != 0
    }
}

impl Default for CollisionGroups {
    fn default() -> Self {
        Self::ALL
    }
}

/// Supported collider shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Circle with radius.
    Ball(f32),
    /// Box with half-extents.
    Cuboid(Vec2),
}

/// Description for creating a collider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColliderDesc {
    /// Associated rigid body if any.
    pub parent_body: Option<RigidBodyHandle>,
    /// Position relative to the parent, or to the world when unattached.
    pub position: Vec2,
    /// Rotation relative to the parent, or to the world when unattached.
    pub rotation: f32,
    /// Shape description.
    pub shape: ColliderShape,
    /// Friction coefficient.
    pub friction: f32,
    /// Density used to derive the parent's mass properties.
    pub density: f32,
    /// Collision filtering.
    pub collision_groups: CollisionGroups,
}

impl ColliderDesc {
    /// A collider with default material settings for the given shape.
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            parent_body: None,
            position: Vec2::ZERO,
            rotation: 0.0,
            shape,
            friction: 0.5,
            density: 1.0,
            collision_groups: CollisionGroups::ALL,
        }
    }
}

/// A snapshot of a body's kinematic state, read once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyState {
    /// World position.
    pub position: Vec2,
    /// Signed rotation in radians.
    pub rotation: f32,
    /// Linear velocity.
    pub linvel: Vec2,
    /// Angular velocity in radians per second.
    pub angvel: f32,
}

/// Interface contract for any planar physics engine implementation (e.g., Rapier).
///
/// Accessors on an unknown handle return neutral values (zero vectors, zero
/// rotation) and mutators on an unknown handle are no-ops.
pub trait PhysicsWorld: Send + Sync {
    /// Advances the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Sets the global gravity vector.
    fn set_gravity(&mut self, gravity: Vec2);

    /// Adds a rigid body to the simulation.
    fn add_body(&mut self, desc: RigidBodyDesc) -> RigidBodyHandle;

    /// Removes a rigid body and every collider attached to it.
    fn remove_body(&mut self, handle: RigidBodyHandle);

    /// Adds a collider to the simulation.
    fn add_collider(&mut self, desc: ColliderDesc) -> ColliderHandle;

    /// Removes a collider from the simulation.
    fn remove_collider(&mut self, handle: ColliderHandle);

    /// Current world position of a body.
    fn translation(&self, handle: RigidBodyHandle) -> Vec2;

    /// Current signed rotation of a body, in radians.
    fn rotation(&self, handle: RigidBodyHandle) -> f32;

    /// Current linear velocity of a body.
    fn linvel(&self, handle: RigidBodyHandle) -> Vec2;

    /// Current angular velocity of a body.
    fn angvel(&self, handle: RigidBodyHandle) -> f32;

    /// Applies an instantaneous linear impulse at the center of mass.
    fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec2);

    /// Applies an instantaneous angular impulse.
    fn apply_torque_impulse(&mut self, handle: RigidBodyHandle, torque: f32);

    /// Overwrites the linear velocity of a body.
    fn set_linvel(&mut self, handle: RigidBodyHandle, linvel: Vec2);

    /// Overwrites the angular velocity of a body.
    fn set_angvel(&mut self, handle: RigidBodyHandle, angvel: f32);

    /// Sets the linear damping coefficient of a body.
    fn set_linear_damping(&mut self, handle: RigidBodyHandle, damping: f32);

    /// Sets the angular damping coefficient of a body.
    fn set_angular_damping(&mut self, handle: RigidBodyHandle, damping: f32);

    /// Changes the type of a body (e.g. dynamic to kinematic).
    fn set_body_type(&mut self, handle: RigidBodyHandle, body_type: BodyType);

    /// Returns the type of a body, or `None` when the handle is unknown.
    fn body_type(&self, handle: RigidBodyHandle) -> Option<BodyType>;

    /// Teleports a body to the given pose.
    fn set_body_pose(&mut self, handle: RigidBodyHandle, position: Vec2, rotation: f32);

    /// Number of rigid bodies currently alive.
    fn body_count(&self) -> usize;

    /// Number of colliders currently alive, attached or not.
    fn collider_count(&self) -> usize;

    /// Reads the full kinematic state of a body in one call.
    fn body_state(&self, handle: RigidBodyHandle) -> BodyState {
        BodyState {
            position: self.translation(handle),
            rotation: self.rotation(handle),
            linvel: self.linvel(handle),
            angvel: self.angvel(handle),
        }
    }
}

/// Builds the rigid body and colliders for a character.
pub trait LetterFactory: Send + Sync {
    /// Returns `true` when the factory has a shape for `character`.
    fn supports(&self, character: char) -> bool;

    /// Spawns the body for `character`, or `None` when it has no shape.
    fn spawn(
        &self,
        world: &mut dyn PhysicsWorld,
        character: char,
        position: Vec2,
        rotation: f32,
    ) -> Option<RigidBodyHandle>;
}
