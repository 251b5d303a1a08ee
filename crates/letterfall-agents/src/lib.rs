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

//! # Letterfall Agents
//!
//! Orchestrators sitting above the lanes. A [`LetterAgent`] owns one letter's
//! control record and visual state, the [`PhysicsAgent`] owns the world and
//! the arena around it, and the [`SimulationDriver`] ties them together into
//! a fixed tick order.

#![warn(missing_docs)]

pub mod driver;
pub mod layout;
pub mod letter_agent;
pub mod physics_agent;

pub use driver::{AgentEvent, DriverStatus, SimulationDriver, TickReport, WordRequest};
pub use layout::{LetterSlot, WordLayout};
pub use letter_agent::{GhostPose, LetterAgent, Trail, VisualState};
pub use physics_agent::{Arena, PhysicsAgent};
