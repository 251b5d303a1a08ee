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

//! The agent owning one letter of the current word.
//!
//! Each tick it runs the heuristic and settling lanes against its body, then
//! the control policy in a separate batch, and finally refreshes the visual
//! state the renderer reads.

mod agent;
mod visual;

pub use agent::*;
pub use visual::{GhostPose, Trail, VisualState};
