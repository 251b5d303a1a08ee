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

//! # Letterfall Telemetry
//!
//! Logging initialisation and the in-memory metrics registry the driver
//! reports into.

#![warn(missing_docs)]

pub mod metrics;
pub mod storage;

pub use metrics::registry::{CounterHandle, GaugeHandle, MetricsRegistry};

use env_logger::{Builder, Env};

/// Installs the global `env_logger` logger.
///
/// The filter defaults to `info` and can be overridden with `RUST_LOG`.
/// Returns `false` when a logger was already installed, which happens when
/// several tests initialise logging in the same process.
pub fn init_logging() -> bool {
    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("rapier2d", log::LevelFilter::Warn)
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        init_logging();
        assert!(!init_logging());
    }
}
