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

//! Per-letter weight overrides persisted as `{dir}/{version}_{key}.json`.
//!
//! An override is looked up by the letter's unique name first (`v11_h_0`),
//! then by its bare character (`v11_h`). Overrides are read-only here.

use std::fs;
use std::path::{Path, PathBuf};

use letterfall_core::inference::WeightSet;

use crate::weights::parse_weights;

/// Format version prefixed to every key.
pub const DEFAULT_VERSION: &str = "v11";

/// Directory-backed key-value store of weight overrides.
#[derive(Debug, Clone)]
pub struct OverrideStore {
    dir: PathBuf,
    version: String,
}

impl OverrideStore {
    /// A store rooted at `dir` using [`DEFAULT_VERSION`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            version: DEFAULT_VERSION.to_owned(),
        }
    }

    /// Uses another key version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The store's directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys tried for a letter, most specific first.
    pub fn keys(&self, name: &str, character: char) -> [String; 2] {
        [
            format!("{}_{}", self.version, name),
            format!("{}_{}", self.version, character),
        ]
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Reads the raw weights stored under `key`, if present and well formed.
    pub fn get(&self, key: &str) -> Option<WeightSet> {
        let path = self.path_for(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::debug!("Ignoring unreadable override '{}': {e}", path.display());
                return None;
            }
        };
        match parse_weights(&text) {
            Ok(weights) => Some(weights),
            Err(e) => {
                log::debug!("Ignoring malformed override '{key}': {e}");
                None
            }
        }
    }

    /// Walks the keys for a letter and returns the first override `accept`
    /// turns into a value.
    ///
    /// `accept` is where callers reject overrides whose shape does not fit;
    /// a rejected override falls through to the next key.
    pub fn resolve<T>(
        &self,
        name: &str,
        character: char,
        mut accept: impl FnMut(&str, WeightSet) -> Option<T>,
    ) -> Option<T> {
        self.keys(name, character)
            .iter()
            .find_map(|key| self.get(key).and_then(|weights| accept(key, weights)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(store: &OverrideStore, key: &str, body: &str) {
        fs::write(store.path_for(key), body).unwrap();
    }

    fn first_bias(weights: &WeightSet) -> Option<f32> {
        match weights.tensors.get(1) {
            Some(letterfall_core::inference::LayerTensor::Vector(b)) => b.first().copied(),
            _ => None,
        }
    }

    #[test]
    fn name_wins_over_character() {
        let dir = tempfile::tempdir().unwrap();
        let store = OverrideStore::new(dir.path());
        write(&store, "v11_h", "[[[0,0,0,0]],[2.0]]");
        write(&store, "v11_h_0", "[[[0,0,0,0]],[1.0]]");

        let bias = store.resolve("h_0", 'h', |_, w| first_bias(&w));
        assert_eq!(bias, Some(1.0));
        let other = store.resolve("h_3", 'h', |_, w| first_bias(&w));
        assert_eq!(other, Some(2.0));
    }

    #[test]
    fn malformed_entries_fall_through() {
        let dir = tempfile::tempdir().unwrap();
        let store = OverrideStore::new(dir.path());
        write(&store, "v11_h_0", "{not json");
        write(&store, "v11_h", "[[[0,0,0,0]],[2.0]]");

        let seen = store.resolve("h_0", 'h', |key, w| first_bias(&w).map(|b| (key.to_owned(), b)));
        assert_eq!(seen, Some(("v11_h".to_owned(), 2.0)));
    }

    #[test]
    fn rejected_and_missing_yield_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = OverrideStore::new(dir.path()).with_version("v12");
        assert!(store.resolve("a_0", 'a', |_, w| Some(w)).is_none());

        write(&store, "v12_a", "[[[1]],[0]]");
        assert!(store.resolve("a_0", 'a', |_, _| None::<()>).is_none());
        assert!(store.get("v12_a").is_some());
    }
}
