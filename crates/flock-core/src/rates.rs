//! The KMC event clock: cumulative rates, waiting times, actor selection.
//!
//! A kinetic-Monte-Carlo step advances the clock by an exponentially
//! distributed waiting time `Δt = -ln(u) / R_total` and fires one event,
//! with each kind's probability proportional to its aggregate rate. The
//! add rate is a flat configured rate; follow, tweet, and retweet rates
//! are per-member rates scaled by each entity class's live population, so
//! activity scales with the network as it grows.
//!
//! The walk order over event kinds is the fixed [`EventKind::ALL`]
//! ordering, and actor selection walks the type registry in declaration
//! order -- both held stable for reproducibility.

use rand::Rng;

use flock_types::{EntityId, EventKind};

use crate::sampling;
use crate::state::SimulationState;

/// Aggregate event rates at one instant of the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRates {
    /// Entity-addition rate (flat, from configuration).
    pub add: f64,
    /// Total follow rate across all live entities.
    pub follow: f64,
    /// Total tweet rate across all live entities.
    pub tweet: f64,
    /// Total retweet rate across all live entities.
    pub retweet: f64,
}

impl EventRates {
    /// Compute the current rates from the state.
    pub fn compute(state: &SimulationState) -> Self {
        let mut follow = 0.0;
        let mut tweet = 0.0;
        let mut retweet = 0.0;
        for type_state in &state.entity_types {
            let population = type_state.members.len() as f64;
            follow += type_state.config.follow_rate * population;
            tweet += type_state.config.tweet_rate * population;
            retweet += type_state.config.retweet_rate * population;
        }
        Self {
            add: state.config.rates.add,
            follow,
            tweet,
            retweet,
        }
    }

    /// Rates in [`EventKind::ALL`] walk order.
    pub const fn as_array(&self) -> [f64; 4] {
        [self.add, self.follow, self.tweet, self.retweet]
    }

    /// Sum of all rates.
    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

/// One resolved KMC draw: which event fires and after how long.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KmcDraw {
    /// The event kind that fires.
    pub kind: EventKind,
    /// Exponential waiting time until it fires, in simulated minutes.
    pub waiting_time: f64,
}

/// Draw the next event kind and its waiting time.
///
/// Consumes exactly two RNG advances: one for the waiting time, one for
/// the kind. Returns `None` when the total rate is zero (a quiescent
/// network with nothing to do).
pub fn draw_next_event(state: &mut SimulationState) -> Option<KmcDraw> {
    let rates = EventRates::compute(state);
    let total = rates.total();
    if total <= 0.0 {
        return None;
    }
    let waiting_time = -sampling::unit_draw_not0(&mut state.rng).ln() / total;
    let draw = sampling::unit_draw_not0(&mut state.rng) * total;
    let index = sampling::cumulative_walk(&rates.as_array(), draw)?;
    EventKind::ALL
        .get(index)
        .copied()
        .map(|kind| KmcDraw { kind, waiting_time })
}

/// Per-member rate of one event kind for one entity class.
fn per_member_rate(state: &SimulationState, type_index: usize, kind: EventKind) -> f64 {
    state
        .entity_types
        .get(type_index)
        .map_or(0.0, |type_state| match kind {
            EventKind::AddEntity => 0.0,
            EventKind::Follow => type_state.config.follow_rate,
            EventKind::Tweet => type_state.config.tweet_rate,
            EventKind::Retweet => type_state.config.retweet_rate,
        })
}

/// Select the acting entity for an event of the given kind.
///
/// Walks the type registry with weights `per_member_rate x population`,
/// then draws uniformly within the landed class's member list. Returns
/// `None` when no class carries any rate for this kind (including
/// [`EventKind::AddEntity`], which has no acting entity).
pub fn select_actor(state: &mut SimulationState, kind: EventKind) -> Option<EntityId> {
    let weights: Vec<f64> = (0..state.entity_types.len())
        .map(|index| {
            let population = state
                .entity_types
                .get(index)
                .map_or(0, |type_state| type_state.members.len());
            per_member_rate(state, index, kind) * population as f64
        })
        .collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let draw = sampling::unit_draw_not0(&mut state.rng) * total;
    let type_index = sampling::cumulative_walk(&weights, draw)?;
    let members = state
        .entity_types
        .get(type_index)
        .map(|type_state| type_state.members.as_slice())?;
    if members.is_empty() {
        return None;
    }
    let slot = state.rng.random_range(0..members.len());
    members.get(slot).copied()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
