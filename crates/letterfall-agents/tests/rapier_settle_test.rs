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

//! End-to-end runs on the Rapier backend.

use std::sync::Arc;

use approx::assert_relative_eq;
use letterfall_agents::{DriverStatus, SimulationDriver};
use letterfall_core::config::SimulationConfig;
use letterfall_core::inference::{LayerTensor, WeightSet};
use letterfall_core::physics::BodyType;
use letterfall_core::ControlState;
use letterfall_infra::{LetterCatalogue, RapierWorld};
use letterfall_lanes::inference_lane::Brain;

fn idle_brain() -> Arc<Brain> {
    Arc::new(
        Brain::for_policy(WeightSet::new(vec![
            LayerTensor::Matrix(vec![vec![0.0; 4]; 2]),
            LayerTensor::Vector(vec![0.0, 0.0]),
        ]))
        .unwrap(),
    )
}

fn rapier_driver(config: SimulationConfig) -> SimulationDriver {
    SimulationDriver::new(
        Box::new(RapierWorld::new()),
        Box::new(LetterCatalogue::new()),
        idle_brain(),
        config,
    )
}

#[test]
fn an_upright_block_lands_settles_and_locks() {
    let mut config = SimulationConfig {
        seed: Some(3),
        ..Default::default()
    };
    config.layout.spawn_spread = 0.0;
    config.layout.spawn_tilt = 0.0;
    config.layout.spawn_height = 1.5;
    let mut driver = rapier_driver(config);
    driver.spawn_word("s");

    for _ in 0..600 {
        driver.tick(16.6).unwrap();
        if driver.is_settled() {
            break;
        }
    }
    assert_eq!(driver.status(), DriverStatus::Active);

    assert_eq!(driver.agents()[0].state(), ControlState::Lock);
    let body = driver.agents()[0].body();
    let world = driver.physics().world();
    assert_eq!(world.body_type(body), Some(BodyType::Kinematic));
    let pose = world.body_state(body);
    assert_relative_eq!(pose.position.y, 0.7, epsilon = 0.1);
    assert_relative_eq!(pose.position.x, 0.0, epsilon = 0.2);

    for _ in 0..60 {
        driver.tick(16.6).unwrap();
    }
    let after = driver.physics().world().body_state(body);
    assert_relative_eq!(after.position.x, pose.position.x, epsilon = 1e-5);
    assert_relative_eq!(after.position.y, pose.position.y, epsilon = 1e-5);
    assert_relative_eq!(after.rotation, pose.rotation, epsilon = 1e-5);
}

#[test]
fn a_dropped_word_lands_on_the_floor() {
    let mut driver = rapier_driver(SimulationConfig {
        seed: Some(11),
        ..Default::default()
    });
    assert_eq!(driver.spawn_word("hi"), 2);

    for _ in 0..240 {
        driver.tick(16.6).unwrap();
    }

    let world = driver.physics().world();
    for agent in driver.agents() {
        let y = world.translation(agent.body()).y;
        assert!(y > -0.5 && y < 3.0, "{} should rest near the floor, y = {y}", agent.name());
        assert_eq!(agent.visual().position, world.translation(agent.body()));
    }
}
