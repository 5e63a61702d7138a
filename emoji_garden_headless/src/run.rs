// A single seeded garden run.
//
// Loads the config and script, then advances the garden one second of
// simulated time per chunk, pushing each chunk's changes to a `ConsoleView`
// and streaming its narrative events to `out` as JSON lines. The run ends
// with a `RunSummary` of the surviving population.

use crate::cli::RunOptions;
use crate::console_view::ConsoleView;
use crate::script::{ScriptError, demo_script, load_script};
use emoji_garden_sim::command::SimCommand;
use emoji_garden_sim::config::{ConfigError, GardenConfig};
use emoji_garden_sim::sim::SimState;
use emoji_garden_sim::types::EntityKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Outcome of one run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub ticks: u64,
    pub elapsed_ms: u64,
    pub events: usize,
    pub population: BTreeMap<EntityKind, usize>,
}

impl RunSummary {
    pub fn of(seed: u64, sim: &SimState, events: usize) -> Self {
        Self {
            seed,
            ticks: sim.tick,
            elapsed_ms: sim.elapsed_ms,
            events,
            population: sim.population(),
        }
    }
}

/// Load the config named by `options`, or the defaults.
pub fn load_config(options: &RunOptions) -> Result<GardenConfig, ConfigError> {
    match &options.config {
        Some(path) => GardenConfig::load(path),
        None => Ok(GardenConfig::default()),
    }
}

/// Load the script named by `options`, or the demo garden.
pub fn load_commands(options: &RunOptions, config: &GardenConfig) -> Result<Vec<SimCommand>, ScriptError> {
    match &options.script {
        Some(path) => load_script(path),
        None => Ok(demo_script(config)),
    }
}

/// Run one garden, streaming events to `out`. Returns the summary and the
/// view holding the final tokens.
pub fn run_single(
    seed: u64,
    ticks: u64,
    config: GardenConfig,
    commands: &[SimCommand],
    out: &mut impl Write,
) -> Result<(RunSummary, ConsoleView), RunError> {
    let ticks_per_second = (1_000 / config.tick_duration_ms.max(1)).max(1);
    let mut view = ConsoleView::new(config.event_log_capacity);
    let mut sim = SimState::try_with_config(seed, config)?;
    let mut events = 0;

    while sim.tick < ticks {
        let target = (sim.tick + ticks_per_second).min(ticks);
        let result = sim.step(commands, target);
        sim.sync_view(&result, &mut view);
        for event in &result.events {
            serde_json::to_writer(&mut *out, event)?;
            writeln!(out)?;
        }
        events += result.events.len();
    }

    let summary = RunSummary::of(seed, &sim, events);
    info!(seed, ticks = sim.tick, events, "run finished");
    Ok((summary, view))
}
