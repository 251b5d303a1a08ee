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

//! Defines the LetterAgent.

use std::sync::Arc;

use letterfall_core::config::SimulationConfig;
use letterfall_core::lane::LaneError;
use letterfall_core::math::Vec2;
use letterfall_core::physics::{PhysicsWorld, RigidBodyHandle};
use letterfall_core::{ControlEvent, ControlState, LetterControl};
use letterfall_lanes::control_lane::{ControlPolicyLane, LetterContext, LetterLane, PolicyImpulse};
use letterfall_lanes::inference_lane::Brain;
use rand::RngCore;

use super::VisualState;

/// One letter instance: identity, target, body and controller.
#[derive(Debug)]
pub struct LetterAgent {
    name: String,
    index: usize,
    character: char,
    target: Vec2,
    body: RigidBodyHandle,
    control: LetterControl,
    brain: Option<Arc<Brain>>,
    last_impulse: Option<PolicyImpulse>,
    visual: VisualState,
}

impl LetterAgent {
    /// Creates an agent in [`ControlState::Search`] for an already spawned body.
    pub fn new(character: char, index: usize, target: Vec2, body: RigidBodyHandle) -> Self {
        Self {
            name: format!("{character}_{index}"),
            index,
            character,
            target,
            body,
            control: LetterControl::new(),
            brain: None,
            last_impulse: None,
            visual: VisualState::default(),
        }
    }

    /// Gives the agent its own network instead of the shared one.
    pub fn with_brain(mut self, brain: Arc<Brain>) -> Self {
        self.brain = Some(brain);
        self
    }

    /// Unique name, `"{character}_{index}"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the letter in the word.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The letter.
    pub fn character(&self) -> char {
        self.character
    }

    /// Resting pose.
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Handle of the letter's rigid body.
    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    /// Controller record.
    pub fn control(&self) -> &LetterControl {
        &self.control
    }

    /// Lifecycle state.
    pub fn state(&self) -> ControlState {
        self.control.state()
    }

    /// Returns `true` once the letter is frozen.
    pub fn is_locked(&self) -> bool {
        self.control.state().is_locked()
    }

    /// Returns `true` when the agent loaded its own weights.
    pub fn has_own_brain(&self) -> bool {
        self.brain.is_some()
    }

    /// Presentation state as of the last tick.
    pub fn visual(&self) -> &VisualState {
        &self.visual
    }

    /// Runs the lanes in order. Locked letters are left alone.
    pub fn update(
        &mut self,
        world: &mut dyn PhysicsWorld,
        lanes: &[Box<dyn LetterLane>],
        dt_ms: f32,
        rng: &mut dyn RngCore,
        events: &mut Vec<ControlEvent>,
    ) -> Result<(), LaneError> {
        if self.is_locked() {
            return Ok(());
        }

        let kinematics = world.body_state(self.body);
        let mut ctx = LetterContext {
            world,
            body: self.body,
            character: self.character,
            target: self.target,
            control: &mut self.control,
            kinematics,
            dt_ms,
            rng,
            events,
        };
        for lane in lanes {
            lane.execute(&mut ctx)?;
            if ctx.control.state().is_locked() {
                break;
            }
        }
        Ok(())
    }

    /// Runs the control policy with the agent's own network, or `shared`.
    pub fn apply_policy(
        &mut self,
        world: &mut dyn PhysicsWorld,
        policy: &ControlPolicyLane,
        shared: &Brain,
        dt_ms: f32,
        rng: &mut dyn RngCore,
        events: &mut Vec<ControlEvent>,
    ) -> Result<Option<PolicyImpulse>, LaneError> {
        if self.is_locked() {
            self.last_impulse = None;
            return Ok(None);
        }

        let brain = self.brain.as_deref().unwrap_or(shared);
        let kinematics = world.body_state(self.body);
        let mut ctx = LetterContext {
            world,
            body: self.body,
            character: self.character,
            target: self.target,
            control: &mut self.control,
            kinematics,
            dt_ms,
            rng,
            events,
        };
        self.last_impulse = policy.apply(&mut ctx, brain)?;
        Ok(self.last_impulse)
    }

    /// Refreshes the visual state from the world.
    pub fn sync_visual(&mut self, world: &dyn PhysicsWorld, dt_ms: f32, config: &SimulationConfig) {
        let state = world.body_state(self.body);
        self.visual.sync(
            &state,
            self.is_locked(),
            &self.control.timers,
            self.target,
            self.last_impulse,
            dt_ms,
            &config.overlay,
            config.recovery.wait_ms,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letterfall_core::inference::{LayerTensor, WeightSet};
    use letterfall_core::physics::{BodyType, MemoryWorld, RigidBodyDesc};
    use letterfall_lanes::control_lane::standard_lanes;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn constant_brain(a0: f32) -> Brain {
        Brain::for_policy(WeightSet::new(vec![
            LayerTensor::Matrix(vec![vec![0.0; 4]; 2]),
            LayerTensor::Vector(vec![a0, 0.0]),
        ]))
        .unwrap()
    }

    fn agent_at(world: &mut MemoryWorld, position: Vec2, target: Vec2) -> LetterAgent {
        let body = world.add_body(RigidBodyDesc {
            position,
            ..Default::default()
        });
        LetterAgent::new('a', 3, target, body)
    }

    #[test]
    fn names_combine_character_and_index() {
        let mut world = MemoryWorld::new();
        let agent = agent_at(&mut world, Vec2::ZERO, Vec2::ZERO);
        assert_eq!(agent.name(), "a_3");
        assert_eq!(agent.state(), ControlState::Search);
        assert!(!agent.has_own_brain());
    }

    #[test]
    fn resting_on_target_locks_after_the_confirm_window() {
        let config = SimulationConfig::default();
        let lanes = standard_lanes(&config);
        let mut world = MemoryWorld::new();
        let mut agent = agent_at(&mut world, Vec2::new(0.5, 0.7), Vec2::new(0.5, 0.7));
        let mut rng = SmallRng::seed_from_u64(1);
        let mut events = Vec::new();

        for _ in 0..10 {
            agent
                .update(&mut world, &lanes, 100.0, &mut rng, &mut events)
                .unwrap();
        }
        assert!(agent.is_locked());
        assert_eq!(world.body_type(agent.body()), Some(BodyType::Kinematic));
        assert_eq!(events.first(), Some(&ControlEvent::Settling));
        assert!(matches!(events.last(), Some(ControlEvent::Locked { .. })));

        // once locked, neither the lanes nor the policy touch the body
        let before = world.impulse_count(agent.body());
        agent
            .update(&mut world, &lanes, 100.0, &mut rng, &mut events)
            .unwrap();
        let impulse = agent
            .apply_policy(
                &mut world,
                &ControlPolicyLane::default(),
                &constant_brain(1.0),
                100.0,
                &mut rng,
                &mut events,
            )
            .unwrap();
        assert_eq!(impulse, None);
        assert_eq!(world.impulse_count(agent.body()), before);
    }

    #[test]
    fn own_brain_wins_over_the_shared_one() {
        let mut world = MemoryWorld::new();
        let mut agent = agent_at(&mut world, Vec2::new(-1.0, 0.5), Vec2::new(1.0, 0.5))
            .with_brain(Arc::new(constant_brain(2.0)));
        let mut rng = SmallRng::seed_from_u64(1);
        let mut events = Vec::new();
        let policy = ControlPolicyLane::new(SimulationConfig::default().policy);

        let impulse = agent
            .apply_policy(
                &mut world,
                &policy,
                &constant_brain(0.5),
                16.6,
                &mut rng,
                &mut events,
            )
            .unwrap()
            .unwrap();
        assert_eq!(impulse.force_x, 16.0);
    }
}
