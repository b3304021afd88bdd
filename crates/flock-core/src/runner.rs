//! The bounded KMC simulation loop.
//!
//! [`run_simulation`] drives the state through discrete weighted events
//! until a termination condition is met: the step bound, the simulated
//! time horizon, or a quiescent network (total rate zero). Each step
//! draws a waiting time and an event kind from the clock, selects an
//! actor where the kind needs one, and dispatches. An event that
//! completes without mutating anything -- a self-follow draw, an empty
//! pool, a full arena -- is counted as a retry and the loop simply
//! redraws on the next step; per the transaction protocol there is never
//! partial state to clean up.

use tracing::{debug, info};

use flock_types::{EventKind, SimulationStats};

use crate::error::SimulationError;
use crate::follow;
use crate::rates;
use crate::state::SimulationState;
use crate::tweet;

/// Steps between progress log lines.
const PROGRESS_INTERVAL: u64 = 100_000;

/// Why a simulation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The configured step bound was reached.
    MaxSteps,
    /// The simulated time horizon was reached.
    MaxSimTime,
    /// The total event rate dropped to zero.
    Quiescent,
}

/// Result of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Why the run ended.
    pub end_reason: EndReason,
    /// Simulation clock at the end of the run, in simulated minutes.
    pub final_time: f64,
    /// Entities in the network at the end of the run.
    pub final_entities: usize,
    /// The run's statistics.
    pub stats: SimulationStats,
}

/// Spawn the seed network: `network.initial_entities` entities with
/// classes drawn by the configured add weights.
///
/// # Errors
///
/// Propagates registry faults from spawning.
pub fn build_seed_network(state: &mut SimulationState) -> Result<(), SimulationError> {
    let initial = state.config.network.initial_entities;
    for _ in 0..initial {
        let Some(type_id) = state.draw_entity_type() else {
            break;
        };
        let _ = state.spawn_entity(type_id)?;
    }
    info!(entities = state.n_entities(), "seed network built");
    Ok(())
}

/// Run the KMC loop until a termination condition is met.
///
/// # Errors
///
/// Propagates invariant violations from the engine; expected non-events
/// are absorbed here as retries.
pub fn run_simulation(state: &mut SimulationState) -> Result<RunSummary, SimulationError> {
    let max_steps = state.config.bounds.max_steps;
    let max_sim_time = state.config.bounds.max_sim_time;

    let end_reason = loop {
        if state.stats.n_steps >= max_steps {
            break EndReason::MaxSteps;
        }
        let Some(draw) = rates::draw_next_event(state) else {
            break EndReason::Quiescent;
        };
        state.time += draw.waiting_time;
        if state.time > max_sim_time {
            break EndReason::MaxSimTime;
        }
        state.stats.record_step();

        let completed = dispatch_event(state, draw.kind)?;
        if !completed {
            state.stats.record_retry();
        }

        if state.stats.n_steps % PROGRESS_INTERVAL == 0 {
            info!(
                steps = state.stats.n_steps,
                time = state.time,
                entities = state.n_entities(),
                follows = state.stats.n_follows,
                "progress"
            );
        }
    };

    Ok(RunSummary {
        end_reason,
        final_time: state.time,
        final_entities: state.n_entities(),
        stats: state.stats,
    })
}

/// Dispatch one drawn event. Returns whether the event mutated anything.
fn dispatch_event(state: &mut SimulationState, kind: EventKind) -> Result<bool, SimulationError> {
    match kind {
        EventKind::AddEntity => add_entity_event(state),
        EventKind::Follow => {
            let Some(actor) = rates::select_actor(state, EventKind::Follow) else {
                return Ok(false);
            };
            let pool = state.n_entities();
            let now = state.time;
            follow::run_follow_event(state, actor, pool, now)
        }
        EventKind::Tweet => {
            let Some(actor) = rates::select_actor(state, EventKind::Tweet) else {
                return Ok(false);
            };
            tweet::run_tweet_event(state, actor)
        }
        EventKind::Retweet => tweet::run_retweet_event(state),
    }
}

/// Add one entity of a weighted-drawn class, unless the arena is full.
fn add_entity_event(state: &mut SimulationState) -> Result<bool, SimulationError> {
    if state.n_entities() >= state.config.network.max_entities {
        return Ok(false);
    }
    let Some(type_id) = state.draw_entity_type() else {
        return Ok(false);
    };
    let id = state.spawn_entity(type_id)?;
    state.stats.record_entity_added();
    debug!(entity = %id, class = %type_id, "entity added");
    Ok(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
