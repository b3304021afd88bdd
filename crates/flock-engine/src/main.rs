//! Simulator binary for the Flock network simulator.
//!
//! Wires the pieces together and runs one simulation:
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `flock-config.yaml` (or the path given as
//!    the first argument), falling back to defaults when the file is
//!    absent
//! 3. Build the simulation state and the seed network
//! 4. Run the KMC loop until a bound is hit
//! 5. Log the final statistics as a JSON report

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flock_core::config::SimulationConfig;
use flock_core::state::SimulationState;
use flock_core::{build_seed_network, run_simulation};

/// Default configuration path relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "flock-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration loading, state construction, or the
/// simulation itself fails.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("flock-engine starting");

    let config = load_config()?;
    info!(
        seed = config.network.seed,
        initial_entities = config.network.initial_entities,
        follow_model = ?config.follow.model,
        max_steps = config.bounds.max_steps,
        max_sim_time = config.bounds.max_sim_time,
        "configuration loaded"
    );

    let mut state =
        SimulationState::new(config).context("failed to build the simulation state")?;
    build_seed_network(&mut state).context("failed to build the seed network")?;

    let started_at = Utc::now();
    let summary = run_simulation(&mut state).context("simulation run failed")?;
    let elapsed = Utc::now().signed_duration_since(started_at);

    info!(
        end_reason = ?summary.end_reason,
        final_time = summary.final_time,
        final_entities = summary.final_entities,
        wall_clock_ms = elapsed.num_milliseconds(),
        "simulation finished"
    );
    let report =
        serde_json::to_string_pretty(&summary.stats).context("failed to render the report")?;
    info!("run statistics:\n{report}");

    Ok(())
}

/// Load the configuration from the path in `argv[1]`, falling back to
/// [`DEFAULT_CONFIG_PATH`], and to built-in defaults when neither file
/// exists.
fn load_config() -> anyhow::Result<SimulationConfig> {
    let path_arg = std::env::args().nth(1);
    let path_str = path_arg.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
    let path = Path::new(&path_str);
    if path.exists() {
        SimulationConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))
    } else {
        warn!(path = %path.display(), "config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}
