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

//! Loading of the JSON weight file `[W0, b0, W1, b1, ...]`.

use std::fs;
use std::path::{Path, PathBuf};

use letterfall_core::inference::WeightSet;
use thiserror::Error;

/// Errors raised while reading a weight file.
#[derive(Error, Debug)]
pub enum WeightsError {
    /// The file could not be read.
    #[error("Failed to read weights from '{path}': {source}")]
    Io {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The content is not a nested array of numbers.
    #[error("Malformed weights JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parses weights from their JSON text. Shapes are checked later, when a
/// network is built from them.
pub fn parse_weights(text: &str) -> Result<WeightSet, WeightsError> {
    Ok(serde_json::from_str(text)?)
}

/// Reads and parses a weight file.
pub fn load_weights(path: impl AsRef<Path>) -> Result<WeightSet, WeightsError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| WeightsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let weights = parse_weights(&text)?;
    log::info!(
        "Loaded {} weight tensors from '{}'",
        weights.tensors.len(),
        path.display()
    );
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use letterfall_core::inference::LayerTensor;
    use std::io::Write;

    #[test]
    fn reads_nested_arrays() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[[[0.5, -1.0, 0.0, 2.0], [1, 1, 1, 1]], [0.1, 0.2]]").unwrap();

        let weights = load_weights(file.path()).unwrap();
        assert_eq!(weights.tensors.len(), 2);
        assert_eq!(weights.tensors[1], LayerTensor::Vector(vec![0.1, 0.2]));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_weights("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, WeightsError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn rejects_non_numeric_content() {
        assert!(matches!(
            parse_weights(r#"[["a"]]"#),
            Err(WeightsError::Parse(_))
        ));
    }
}
