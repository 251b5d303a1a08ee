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

//! Defines the PhysicsAgent, the owner of the simulated world.

use std::time::Instant;

use letterfall_core::config::SimulationConfig;
use letterfall_core::math::Vec2;
use letterfall_core::physics::PhysicsWorld;
use letterfall_core::telemetry::MetricsResult;
use letterfall_telemetry::{GaugeHandle, MetricsRegistry};

use super::Arena;

/// Holds telemetry handles for the physics subsystem.
struct PhysicsMetrics {
    body_count: GaugeHandle,
    collider_count: GaugeHandle,
    step_time_ms: GaugeHandle,
}

impl PhysicsMetrics {
    fn register(registry: &MetricsRegistry) -> MetricsResult<Self> {
        Ok(Self {
            body_count: registry.register_gauge(
                "physics",
                "body_count",
                "Total active rigid bodies",
                "count",
            )?,
            collider_count: registry.register_gauge(
                "physics",
                "collider_count",
                "Total active colliders",
                "count",
            )?,
            step_time_ms: registry.register_gauge(
                "physics",
                "step_time_ms",
                "Time spent in simulation step",
                "ms",
            )?,
        })
    }
}

/// The agent responsible for managing the physics simulation.
pub struct PhysicsAgent {
    /// The concrete physics engine.
    provider: Box<dyn PhysicsWorld>,
    /// Floor, walls and camera framing.
    arena: Arena,
    /// Seconds simulated per step.
    dt: f32,
    /// Telemetry metrics.
    metrics: Option<PhysicsMetrics>,
}

impl PhysicsAgent {
    /// Wraps a world, sets its gravity and lays the floor.
    pub fn new(mut provider: Box<dyn PhysicsWorld>, config: &SimulationConfig) -> Self {
        provider.set_gravity(Vec2::new(0.0, config.timing.gravity_y));
        let mut arena = Arena::new(config.arena.clone());
        arena.install_floor(provider.as_mut());

        Self {
            provider,
            arena,
            dt: config.timing.physics_dt,
            metrics: None,
        }
    }

    /// Attaches a metrics registry to the agent for observability.
    pub fn with_telemetry(mut self, registry: &MetricsRegistry) -> Self {
        match PhysicsMetrics::register(registry) {
            Ok(metrics) => self.metrics = Some(metrics),
            Err(e) => log::warn!("Physics metrics unavailable: {e}"),
        }
        self
    }

    /// Moves the walls if needed, then advances the simulation by one step.
    ///
    /// Returns the time spent stepping, in milliseconds.
    pub fn step(&mut self) -> f64 {
        self.arena.update(self.provider.as_mut());

        let start = Instant::now();
        self.provider.step(self.dt);
        let elapsed = start.elapsed().as_secs_f64() * 1000.0;

        if let Some(metrics) = &self.metrics {
            let _ = metrics.body_count.set(self.provider.body_count() as f64);
            let _ = metrics
                .collider_count
                .set(self.provider.collider_count() as f64);
            let _ = metrics.step_time_ms.set(elapsed);
        }
        elapsed
    }

    /// Read access to the world.
    pub fn world(&self) -> &dyn PhysicsWorld {
        self.provider.as_ref()
    }

    /// Write access to the world.
    pub fn world_mut(&mut self) -> &mut dyn PhysicsWorld {
        self.provider.as_mut()
    }

    /// The arena.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable access to the arena.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }
}

impl std::fmt::Debug for PhysicsAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsAgent")
            .field("bodies", &self.provider.body_count())
            .field("colliders", &self.provider.collider_count())
            .field("arena", &self.arena)
            .field("dt", &self.dt)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letterfall_core::physics::{MemoryWorld, RigidBodyDesc};
    use letterfall_core::telemetry::MetricId;

    #[test]
    fn new_world_gets_floor_and_gravity() {
        let config = SimulationConfig::default();
        let mut agent = PhysicsAgent::new(Box::new(MemoryWorld::new()), &config);
        assert_eq!(agent.world().body_count(), 1);

        let body = agent.world_mut().add_body(RigidBodyDesc {
            position: Vec2::new(0.0, 8.0),
            ..Default::default()
        });
        agent.step();
        assert!(agent.world().linvel(body).y < 0.0);
        // first step builds both walls
        assert_eq!(agent.world().collider_count(), 3);
    }

    #[test]
    fn step_reports_world_size() {
        let registry = MetricsRegistry::new();
        let config = SimulationConfig::default();
        let mut agent =
            PhysicsAgent::new(Box::new(MemoryWorld::new()), &config).with_telemetry(&registry);
        agent.step();

        let colliders = registry
            .get_metric(&MetricId::new("physics", "collider_count"))
            .unwrap();
        assert_eq!(colliders.value.as_f64(), 3.0);
        assert!(registry
            .get_metric(&MetricId::new("physics", "step_time_ms"))
            .is_ok());
    }
}
