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

use letterfall_core::math::Vec2;
use letterfall_core::physics::{ColliderHandle, CollisionGroups, RigidBodyHandle};
use rapier2d::prelude::{Group, InteractionGroups, Real, Vector};

pub fn to_rapier_vec(v: Vec2) -> Vector<Real> {
    Vector::new(v.x, v.y)
}

pub fn from_rapier_vec(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

pub fn to_rapier_groups(groups: CollisionGroups) -> InteractionGroups {
    InteractionGroups::new(
        Group::from_bits_truncate(u32::from(groups.memberships)),
        Group::from_bits_truncate(u32::from(groups.filter)),
    )
}

// Handles carry Rapier's (index, generation) pair so a recycled slot never
// aliases a removed body.
fn pack((index, generation): (u32, u32)) -> u64 {
    (u64::from(generation) << 32) | u64::from(index)
}

fn unpack(raw: u64) -> (u32, u32) {
    (raw as u32, (raw >> 32) as u32)
}

pub fn from_rapier_body(handle: rapier2d::prelude::RigidBodyHandle) -> RigidBodyHandle {
    RigidBodyHandle(pack(handle.into_raw_parts()))
}

pub fn to_rapier_body(handle: RigidBodyHandle) -> rapier2d::prelude::RigidBodyHandle {
    let (index, generation) = unpack(handle.0);
    rapier2d::prelude::RigidBodyHandle::from_raw_parts(index, generation)
}

pub fn from_rapier_collider(handle: rapier2d::prelude::ColliderHandle) -> ColliderHandle {
    ColliderHandle(pack(handle.into_raw_parts()))
}

pub fn to_rapier_collider(handle: ColliderHandle) -> rapier2d::prelude::ColliderHandle {
    let (index, generation) = unpack(handle.0);
    rapier2d::prelude::ColliderHandle::from_raw_parts(index, generation)
}
