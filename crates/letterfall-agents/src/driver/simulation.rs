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

//! Defines the SimulationDriver and what each tick reports.

use std::fmt;
use std::sync::Arc;

use letterfall_core::config::SimulationConfig;
use letterfall_core::lane::LaneError;
use letterfall_core::math::Vec2;
use letterfall_core::physics::{LetterFactory, PhysicsWorld};
use letterfall_core::telemetry::MetricsResult;
use letterfall_core::word::WordSource;
use letterfall_core::ControlEvent;
use letterfall_io::OverrideStore;
use letterfall_lanes::control_lane::{standard_lanes, ControlPolicyLane, LetterLane};
use letterfall_lanes::inference_lane::Brain;
use letterfall_telemetry::{CounterHandle, GaugeHandle, MetricsRegistry};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::runtime::Handle;

use super::{RequestPoll, WordRequest};
use crate::layout::WordLayout;
use crate::letter_agent::LetterAgent;
use crate::physics_agent::PhysicsAgent;

/// What the simulation is doing, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverStatus {
    /// No letters and nothing requested.
    Idle,
    /// Waiting on the word source.
    Thinking,
    /// At least one letter is still moving into place.
    Calibrating,
    /// Every letter is locked.
    Active,
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DriverStatus::Idle => "idle",
            DriverStatus::Thinking => "thinking",
            DriverStatus::Calibrating => "calibrating",
            DriverStatus::Active => "active",
        };
        f.write_str(label)
    }
}

/// A control event tagged with the letter it happened to.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentEvent {
    /// Agent name, `"{character}_{index}"`.
    pub agent: String,
    /// What happened.
    pub event: ControlEvent,
}

/// Summary of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Timer increment used by the lanes.
    pub dt_ms: f32,
    /// Word spawned at the start of this tick, if a request resolved.
    pub spawned: Option<String>,
    /// Everything the lanes did.
    pub events: Vec<AgentEvent>,
    /// Status after the tick.
    pub status: DriverStatus,
    /// Wall time of the physics step.
    pub step_time_ms: f64,
}

struct DriverMetrics {
    recovery_kicks: CounterHandle,
    slide_kicks: CounterHandle,
    locked: GaugeHandle,
    active: GaugeHandle,
}

impl DriverMetrics {
    fn register(registry: &MetricsRegistry) -> MetricsResult<Self> {
        Ok(Self {
            recovery_kicks: registry.register_counter(
                "letters",
                "recovery_kicks",
                "Kicks given to flipped letters",
            )?,
            slide_kicks: registry.register_counter(
                "letters",
                "slide_kicks",
                "Kicks given to letters stuck away from their slot",
            )?,
            locked: registry.register_gauge("letters", "locked", "Letters locked in place", "count")?,
            active: registry.register_gauge("letters", "active", "Letters still settling", "count")?,
        })
    }
}

/// Owns the world and every letter, and runs them in a fixed order each tick:
///
/// 1. collect a resolved word request and spawn it,
/// 2. ease the arena and step the physics,
/// 3. run the heuristic and settling lanes for every active letter,
/// 4. run the control policy for every letter still active,
/// 5. refresh the visual state and the metrics.
pub struct SimulationDriver {
    physics: PhysicsAgent,
    factory: Box<dyn LetterFactory>,
    shared_brain: Arc<Brain>,
    overrides: Option<OverrideStore>,
    config: SimulationConfig,
    lanes: Vec<Box<dyn LetterLane>>,
    policy: ControlPolicyLane,
    agents: Vec<LetterAgent>,
    pending: Option<WordRequest>,
    rng: SmallRng,
    metrics: Option<DriverMetrics>,
    ticks: u64,
}

impl SimulationDriver {
    /// Creates a driver around a world and a shape factory.
    pub fn new(
        world: Box<dyn PhysicsWorld>,
        factory: Box<dyn LetterFactory>,
        shared_brain: Arc<Brain>,
        config: SimulationConfig,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            physics: PhysicsAgent::new(world, &config),
            factory,
            shared_brain,
            overrides: None,
            lanes: standard_lanes(&config),
            policy: ControlPolicyLane::new(config.policy.clone()),
            config,
            agents: Vec::new(),
            pending: None,
            rng,
            metrics: None,
            ticks: 0,
        }
    }

    /// Lets agents load personalised weights at creation.
    pub fn with_overrides(mut self, overrides: OverrideStore) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Attaches a metrics registry to the driver and its physics agent.
    pub fn with_telemetry(mut self, registry: &MetricsRegistry) -> Self {
        self.physics = self.physics.with_telemetry(registry);
        match DriverMetrics::register(registry) {
            Ok(metrics) => self.metrics = Some(metrics),
            Err(e) => log::warn!("Letter metrics unavailable: {e}"),
        }
        self
    }

    /// Replaces the current word with `word`.
    ///
    /// Every existing letter is removed with its body first. Characters the
    /// factory has no shape for take up room but get no agent. Returns the
    /// number of letters spawned.
    pub fn spawn_word(&mut self, word: &str) -> usize {
        self.clear();

        let layout = WordLayout::new(word, &self.config.layout);
        self.physics.arena_mut().frame_word(layout.total_width());
        let spread = self.physics.arena().target_width() * self.config.layout.spawn_spread;

        for slot in layout.slots() {
            if !self.factory.supports(slot.character) {
                continue;
            }
            let spawn = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * spread,
                self.config.layout.spawn_height,
            );
            let rotation = (self.rng.random::<f32>() - 0.5) * self.config.layout.spawn_tilt;
            let Some(body) =
                self.factory
                    .spawn(self.physics.world_mut(), slot.character, spawn, rotation)
            else {
                continue;
            };

            let mut agent = LetterAgent::new(slot.character, slot.index, slot.target, body);
            if let Some(brain) = self.load_override(agent.name(), slot.character) {
                agent = agent.with_brain(Arc::new(brain));
            }
            log::debug!(
                "Spawned {} at ({:.2}, {:.2}) aiming for ({:.2}, {:.2})",
                agent.name(),
                spawn.x,
                spawn.y,
                slot.target.x,
                slot.target.y
            );
            self.agents.push(agent);
        }

        log::info!("Spawned \"{word}\" as {} letters", self.agents.len());
        self.agents.len()
    }

    fn load_override(&self, name: &str, character: char) -> Option<Brain> {
        let store = self.overrides.as_ref()?;
        let expected = self.shared_brain.input_size();
        store.resolve(name, character, |key, weights| {
            match Brain::for_policy(weights) {
                Ok(brain) if brain.input_size() == expected => {
                    log::info!("{name} uses weights from {key}");
                    Some(brain)
                }
                Ok(brain) => {
                    log::debug!(
                        "Ignoring {key}: takes {} inputs, expected {expected}",
                        brain.input_size()
                    );
                    None
                }
                Err(e) => {
                    log::debug!("Ignoring {key}: {e}");
                    None
                }
            }
        })
    }

    /// Removes every letter and its body. An outstanding request stays.
    pub fn clear(&mut self) {
        let world = self.physics.world_mut();
        for agent in self.agents.drain(..) {
            world.remove_body(agent.body());
        }
    }

    /// Asks `source` for the next word; it is spawned on the tick after the
    /// reply arrives. Replaces any request still outstanding.
    pub fn request_word(
        &mut self,
        source: Arc<dyn WordSource>,
        prompt: impl Into<String>,
        runtime: &Handle,
    ) {
        if let Some(previous) = self.pending.take() {
            log::debug!("Dropping request for \"{}\"", previous.prompt());
        }
        self.pending = Some(WordRequest::spawn(source, prompt, runtime));
    }

    /// Advances the simulation by one tick.
    ///
    /// `measured_ms` is the wall time since the previous tick; it only
    /// matters when timers run in measured mode. A network that cannot take
    /// a letter's observation aborts the tick with an error.
    pub fn tick(&mut self, measured_ms: f32) -> Result<TickReport, LaneError> {
        self.ticks += 1;
        let dt_ms = self.config.timing.step_mode.increment_ms(measured_ms);

        let spawned = self.poll_request();
        if let Some(word) = &spawned {
            self.spawn_word(word);
        }

        let step_time_ms = self.physics.step();

        let mut events = Vec::new();
        let mut scratch = Vec::new();
        let world = self.physics.world_mut();

        for agent in &mut self.agents {
            agent.update(world, &self.lanes, dt_ms, &mut self.rng, &mut scratch)?;
            drain_into(&mut events, agent.name(), &mut scratch);
        }

        for agent in self.agents.iter_mut().filter(|a| !a.is_locked()) {
            agent.apply_policy(
                world,
                &self.policy,
                &self.shared_brain,
                dt_ms,
                &mut self.rng,
                &mut scratch,
            )?;
            drain_into(&mut events, agent.name(), &mut scratch);
        }

        for agent in &mut self.agents {
            agent.sync_visual(world, dt_ms, &self.config);
        }

        self.record(&events);
        let report = TickReport {
            tick: self.ticks,
            dt_ms,
            spawned,
            events,
            status: self.status(),
            step_time_ms,
        };
        log::trace!("Tick {} done: {}", report.tick, report.status);
        Ok(report)
    }

    fn poll_request(&mut self) -> Option<String> {
        let request = self.pending.as_mut()?;
        match request.poll() {
            RequestPoll::Pending => None,
            RequestPoll::Ready(word) => {
                self.pending = None;
                if word.trim().is_empty() {
                    log::debug!("Empty reply, keeping the current word");
                    return None;
                }
                Some(word)
            }
            RequestPoll::Abandoned => {
                log::warn!("Word request for \"{}\" ended without a reply", request.prompt());
                self.pending = None;
                None
            }
        }
    }

    fn record(&self, events: &[AgentEvent]) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        for event in events {
            let counter = match event.event {
                ControlEvent::RecoveryKick { .. } => &metrics.recovery_kicks,
                ControlEvent::SlideKick { .. } => &metrics.slide_kicks,
                _ => continue,
            };
            if let Err(e) = counter.increment() {
                log::trace!("Failed to count kick: {e}");
            }
        }
        let locked = self.agents.iter().filter(|a| a.is_locked()).count();
        if let Err(e) = metrics.locked.set(locked as f64) {
            log::trace!("Failed to update locked gauge: {e}");
        }
        if let Err(e) = metrics.active.set((self.agents.len() - locked) as f64) {
            log::trace!("Failed to update active gauge: {e}");
        }
    }

    /// Current status.
    pub fn status(&self) -> DriverStatus {
        if self.pending.is_some() {
            DriverStatus::Thinking
        } else if self.agents.is_empty() {
            DriverStatus::Idle
        } else if self.agents.iter().any(|a| !a.is_locked()) {
            DriverStatus::Calibrating
        } else {
            DriverStatus::Active
        }
    }

    /// Returns `true` when a word is on screen and every letter is locked.
    pub fn is_settled(&self) -> bool {
        self.status() == DriverStatus::Active
    }

    /// Letters of the current word, in spawn order.
    pub fn agents(&self) -> &[LetterAgent] {
        &self.agents
    }

    /// Looks a letter up by name.
    pub fn agent(&self, name: &str) -> Option<&LetterAgent> {
        self.agents.iter().find(|a| a.name() == name)
    }

    /// The physics agent.
    pub fn physics(&self) -> &PhysicsAgent {
        &self.physics
    }

    /// The configuration in use.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

fn drain_into(events: &mut Vec<AgentEvent>, agent: &str, scratch: &mut Vec<ControlEvent>) {
    events.extend(scratch.drain(..).map(|event| AgentEvent {
        agent: agent.to_string(),
        event,
    }));
}

impl fmt::Debug for SimulationDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationDriver")
            .field("physics", &self.physics)
            .field("agents", &self.agents.len())
            .field("status", &self.status())
            .field("ticks", &self.ticks)
            .finish()
    }
}
