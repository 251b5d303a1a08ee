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

//! # Letterfall Lanes
//!
//! Hot-path strategies executed once per tick for every letter still moving.
//!
//! - [`inference_lane`] holds the dense network that turns observations into actions.
//! - [`control_lane`] holds the settling state machine, the corrective monitors
//!   and the learned policy, all sharing the [`control_lane::LetterLane`] contract.

#![warn(missing_docs)]

pub mod control_lane;
pub mod inference_lane;
