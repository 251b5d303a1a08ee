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

//! TOML configuration loading.

use std::fs;
use std::path::{Path, PathBuf};

use letterfall_core::SimulationConfig;
use thiserror::Error;

/// Errors raised while reading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config '{path}': {source}")]
    Io {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The content is not valid TOML for a [`SimulationConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Parses a configuration from TOML text. Missing keys keep their defaults.
pub fn parse_config(text: &str) -> Result<SimulationConfig, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Reads a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<SimulationConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&text)?;
    log::info!("Loaded configuration from '{}'", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use letterfall_core::config::TimeStepMode;

    #[test]
    fn empty_file_is_the_default() {
        assert_eq!(parse_config("").unwrap(), SimulationConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"
            seed = 42

            [timing.step_mode]
            mode = "measured"
            max_measured_ms = 40.0

            [slide]
            wait_ms = 2000.0

            [overlay]
            show_ghosts = true
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(
            config.timing.step_mode,
            TimeStepMode::Measured {
                max_measured_ms: 40.0
            }
        );
        assert_eq!(config.slide.wait_ms, 2000.0);
        assert_eq!(config.slide.hooked_wait_ms, 1000.0);
        assert!(config.overlay.show_ghosts);
        assert!(!config.overlay.show_muscles);
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letterfall.toml");
        fs::write(&path, "[arena]\nnarrow = true\n").unwrap();
        let config = load_config(&path).unwrap();
        assert!(config.arena.narrow);
        assert_eq!(config.arena.min_frustum(), 25.0);
    }

    #[test]
    fn type_errors_are_reported() {
        assert!(matches!(
            parse_config("seed = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
