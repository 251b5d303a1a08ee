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

use crate::storage::backend::MetricsBackend;
use letterfall_core::telemetry::{Metric, MetricId, MetricsError, MetricsResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory metrics backend using `RwLock<HashMap>`.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    storage: RwLock<HashMap<MetricId, Metric>>,
}

impl InMemoryBackend {
    /// Create a new in-memory backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Get metrics by namespace
    pub fn get_metrics_by_namespace(&self, namespace: &str) -> Vec<Metric> {
        self.storage
            .read()
            .map(|storage| {
                storage
                    .values()
                    .filter(|metric| metric.id.namespace == namespace)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn poisoned() -> MetricsError {
    MetricsError::StorageError("metrics lock poisoned".to_owned())
}

impl MetricsBackend for InMemoryBackend {
    fn put_metric(&self, metric: Metric) -> MetricsResult<()> {
        let mut storage = self.storage.write().map_err(|_| poisoned())?;
        storage.insert(metric.id.clone(), metric);
        Ok(())
    }

    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        let storage = self.storage.read().map_err(|_| poisoned())?;
        storage
            .get(id)
            .cloned()
            .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))
    }

    fn contains_metric(&self, id: &MetricId) -> bool {
        self.storage
            .read()
            .map(|storage| storage.contains_key(id))
            .unwrap_or(false)
    }

    fn list_all_metrics(&self) -> Vec<Metric> {
        self.storage
            .read()
            .map(|storage| storage.values().cloned().collect())
            .unwrap_or_default()
    }

    fn metric_count(&self) -> usize {
        self.storage.read().map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_and_gauge_updates() {
        let backend = InMemoryBackend::new();
        let counter = MetricId::new("letters", "slide_kicks");
        let gauge = MetricId::new("physics", "step_time_ms");
        backend
            .put_metric(Metric::new_counter(counter.clone(), "kicks"))
            .unwrap();
        backend
            .put_metric(Metric::new_gauge(gauge.clone(), "step", "ms"))
            .unwrap();

        assert_eq!(backend.increment_counter(&counter, 2).unwrap(), 2);
        backend.set_gauge(&gauge, 0.75).unwrap();
        assert_eq!(backend.get_metric(&gauge).unwrap().value.as_gauge(), Some(0.75));

        assert!(backend.set_gauge(&counter, 1.0).is_err());
        assert_eq!(backend.get_metrics_by_namespace("letters").len(), 1);
    }

    #[test]
    fn test_missing_metric() {
        let backend = InMemoryBackend::new();
        let id = MetricId::new("letters", "nope");
        assert_eq!(
            backend.get_metric(&id).unwrap_err(),
            MetricsError::MetricNotFound(id.clone())
        );
        assert!(!backend.contains_metric(&id));
    }
}
