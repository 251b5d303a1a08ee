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

//! # Letterfall I/O
//!
//! Everything read from disk: the shared policy weights, per-letter weight
//! overrides and the simulation configuration.

#![warn(missing_docs)]

pub mod config;
pub mod overrides;
pub mod weights;

pub use config::{load_config, ConfigError};
pub use overrides::OverrideStore;
pub use weights::{load_weights, parse_weights, WeightsError};
