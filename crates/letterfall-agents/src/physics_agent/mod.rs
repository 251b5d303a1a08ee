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

//! Acts as the agent for the physics subsystem.
//!
//! It owns the concrete [`PhysicsWorld`](letterfall_core::physics::PhysicsWorld),
//! keeps the arena (floor and side walls) in step with the camera framing,
//! and reports the cost of every simulation step.

mod agent;
mod arena;

pub use agent::*;
pub use arena::Arena;
