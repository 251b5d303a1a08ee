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

//! Headless letterfall runner.
//!
//! Loads the policy weights and configuration, drops a word (given on the
//! command line or asked from a chat backend) and steps the simulation until
//! every letter has locked into place.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use letterfall_agents::{DriverStatus, SimulationDriver};
use letterfall_core::word::WordSource;
use letterfall_core::SimulationConfig;
use letterfall_infra::chat::{ChatClient, ChatConfig};
use letterfall_infra::{LetterCatalogue, RapierWorld};
use letterfall_io::{load_config, load_weights, OverrideStore};
use letterfall_lanes::inference_lane::Brain;
use letterfall_telemetry::{init_logging, MetricsRegistry};

const FRAME: Duration = Duration::from_micros(16_667);

#[derive(Parser, Debug)]
#[command(name = "letterfall")]
#[command(about = "Drop a word as physical letters and let them settle into place")]
struct Cli {
    /// Word to spell. Ignored when --ask is given.
    #[arg(default_value = "hello")]
    word: String,

    /// Ask the chat backend this question and spell its answer instead.
    #[arg(long)]
    ask: Option<String>,

    /// Policy weights, a JSON list of weight matrices and bias vectors.
    #[arg(long, default_value = "assets/slide_policy_weights.json")]
    weights: PathBuf,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of per-letter weight overrides. Defaults to the user data
    /// directory when it exists.
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Seed for spawn positions and corrective kicks.
    #[arg(long)]
    seed: Option<u64>,

    /// Give up after this many ticks.
    #[arg(long, default_value_t = 3600)]
    max_ticks: u64,

    /// Pace ticks at 60 Hz instead of running flat out.
    #[arg(long)]
    realtime: bool,

    /// Chat-completions API root.
    #[arg(long)]
    chat_url: Option<String>,

    /// Chat model.
    #[arg(long)]
    chat_model: Option<String>,
}

fn default_overrides_dir() -> Option<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("letterfall").join("overrides"))
        .filter(|dir| dir.is_dir())
}

fn build_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SimulationConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    Ok(config)
}

fn chat_source(cli: &Cli) -> Result<Arc<dyn WordSource>> {
    let mut config = ChatConfig {
        api_key: std::env::var("LETTERFALL_API_KEY").ok(),
        ..Default::default()
    };
    if let Some(url) = &cli.chat_url {
        config.base_url = url.clone();
    }
    if let Some(model) = &cli.chat_model {
        config.model = model.clone();
    }
    Ok(Arc::new(ChatClient::new(config)?))
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    let weights = load_weights(&cli.weights).with_context(|| {
        format!(
            "cannot start without policy weights ({})",
            cli.weights.display()
        )
    })?;
    let brain = Brain::for_policy(weights).context("policy weights have the wrong shape")?;
    log::info!(
        "Policy network: {} layers, {} -> {}",
        brain.depth(),
        brain.input_size(),
        brain.output_size()
    );

    let registry = MetricsRegistry::new();
    let mut driver = SimulationDriver::new(
        Box::new(RapierWorld::new()),
        Box::new(LetterCatalogue::new()),
        Arc::new(brain),
        config,
    )
    .with_telemetry(&registry);
    if let Some(dir) = cli.overrides.clone().or_else(default_overrides_dir) {
        log::info!("Reading weight overrides from '{}'", dir.display());
        driver = driver.with_overrides(OverrideStore::new(dir));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    match &cli.ask {
        Some(question) => {
            driver.request_word(chat_source(&cli)?, question.clone(), runtime.handle());
        }
        None => {
            driver.spawn_word(&cli.word);
        }
    }

    let mut last = Instant::now();
    let mut settled = false;
    while driver.ticks() < cli.max_ticks {
        let frame_start = Instant::now();
        let measured_ms = last.elapsed().as_secs_f32() * 1000.0;
        last = frame_start;

        let report = driver.tick(measured_ms)?;
        for event in &report.events {
            log::debug!("{}: {:?}", event.agent, event.event);
        }
        if report.status == DriverStatus::Active {
            settled = true;
            break;
        }

        // Thinking ticks would otherwise burn through the budget in a blink.
        if cli.realtime || report.status == DriverStatus::Thinking {
            std::thread::sleep(FRAME.saturating_sub(frame_start.elapsed()));
        }
    }

    if settled {
        log::info!("Every letter locked after {} ticks", driver.ticks());
    } else {
        log::warn!(
            "Stopped after {} ticks with status {}",
            driver.ticks(),
            driver.status()
        );
    }
    for agent in driver.agents() {
        let pose = driver.physics().world().body_state(agent.body());
        log::info!(
            "{:>6} {:<6} at ({:6.2}, {:5.2}) rot {:5.2}, target ({:6.2}, {:5.2})",
            agent.name(),
            agent.state().to_string(),
            pose.position.x,
            pose.position.y,
            pose.rotation,
            agent.target().x,
            agent.target().y
        );
    }
    for metric in registry.snapshot() {
        log::info!("{} = {}", metric.id, metric.value.as_f64());
    }

    runtime.shutdown_background();
    Ok(())
}
