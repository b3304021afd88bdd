//! Aggregate simulation state.
//!
//! [`SimulationState`] exclusively owns everything a run mutates: the
//! clock, the RNG stream, the entity arena, the global rank groupers, the
//! entity-type registry, the tweet bank, and the run statistics. Every
//! engine operation receives it by mutable reference; no component holds
//! a back-reference except by [`EntityId`] lookup, so the arena stays
//! freely resizable and the whole state is clonable for checkpointing.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use flock_graph::{CategoryGrouper, Network};
use flock_types::{EntityId, EntityTypeCounters, EntityTypeId, SimulationStats};

use crate::config::{EntityTypeConfig, RankBound, SimulationConfig};
use crate::error::SimulationError;
use crate::sampling;
use crate::tweet::TweetBank;

/// Simulated minutes per month, the granularity of the age cohorts.
const MINUTES_PER_MONTH: f64 = 24.0 * 60.0 * 30.0;

/// Runtime state of one declared entity class.
#[derive(Debug, Clone)]
pub struct EntityTypeState {
    /// The immutable class configuration.
    pub config: EntityTypeConfig,
    /// Ids of all entities of this class, in creation order.
    pub members: Vec<EntityId>,
    /// Private follower-rank grouper scoped to this class's members.
    pub follow_ranks: CategoryGrouper,
    /// Mutable per-class counters.
    pub counters: EntityTypeCounters,
}

impl EntityTypeState {
    /// Build the runtime state for a class, falling back to the global
    /// rank bounds when the class declares none of its own.
    pub fn new(config: EntityTypeConfig, global_ranks: &[RankBound]) -> Self {
        let bounds = if config.follow_ranks.is_empty() {
            rank_pairs(global_ranks)
        } else {
            rank_pairs(&config.follow_ranks)
        };
        Self {
            config,
            members: Vec::new(),
            follow_ranks: CategoryGrouper::from_bounds(&bounds),
            counters: EntityTypeCounters::default(),
        }
    }
}

/// Everything a simulation run owns and mutates.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Simulation clock, in simulated minutes.
    pub time: f64,
    /// The single RNG stream; threaded by reference through every draw.
    pub rng: SmallRng,
    /// The loaded configuration.
    pub config: SimulationConfig,
    /// The entity arena.
    pub network: Network,
    /// Global follower-rank grouper (follow-target sampling).
    pub follow_ranks: CategoryGrouper,
    /// Per-bucket Barabási weights, resolved once from configuration.
    pub barabasi_weights: Vec<f64>,
    /// Global tweet-count grouper.
    pub tweet_ranks: CategoryGrouper,
    /// Global retweet-count grouper.
    pub retweet_ranks: CategoryGrouper,
    /// Creation-cohort grouper: entities bucketed by the simulated month
    /// in which they joined the network.
    pub age_ranks: CategoryGrouper,
    /// Runtime state per declared entity class, in declaration order.
    pub entity_types: Vec<EntityTypeState>,
    /// Active tweets and the shared content arena.
    pub tweets: TweetBank,
    /// Run statistics sink.
    pub stats: SimulationStats,
}

impl SimulationState {
    /// Build a fresh state from a validated configuration.
    ///
    /// The RNG is seeded from `config.network.seed`; two states built from
    /// equal configurations replay identically.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] when the configuration fails
    /// validation.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let global_bounds = rank_pairs(&config.follow.follow_ranks);
        let tweet_bounds = rank_pairs(&config.tweets.tweet_ranks);
        let retweet_bounds = rank_pairs(&config.tweets.retweet_ranks);
        let age_bounds = rank_pairs(&config.age_ranks);
        let entity_types = config
            .entity_types
            .iter()
            .cloned()
            .map(|type_config| EntityTypeState::new(type_config, &config.follow.follow_ranks))
            .collect();
        let rng = SmallRng::seed_from_u64(config.network.seed);
        let tweets = TweetBank::new(config.tweets.half_life, config.tweets.tolerance);
        let barabasi_weights = config.barabasi_weights();
        Ok(Self {
            time: 0.0,
            rng,
            network: Network::new(),
            follow_ranks: CategoryGrouper::from_bounds(&global_bounds),
            barabasi_weights,
            tweet_ranks: CategoryGrouper::from_bounds(&tweet_bounds),
            retweet_ranks: CategoryGrouper::from_bounds(&retweet_bounds),
            age_ranks: CategoryGrouper::from_bounds(&age_bounds),
            entity_types,
            tweets,
            stats: SimulationStats::new(),
            config,
        })
    }

    /// Number of entities currently in the network.
    pub fn n_entities(&self) -> usize {
        self.network.len()
    }

    /// Index of the simulated month containing `time`.
    pub fn month_index(time: f64) -> u64 {
        (time / MINUTES_PER_MONTH).max(0.0) as u64
    }

    /// Resolve the runtime state of an entity class.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownEntityType`] for an id outside
    /// the registry; internal callers only hold registry-minted ids, so
    /// this is an invariant violation.
    pub fn entity_type_state(
        &self,
        type_id: EntityTypeId,
    ) -> Result<&EntityTypeState, SimulationError> {
        self.entity_types
            .get(type_id.index())
            .ok_or(SimulationError::UnknownEntityType(type_id))
    }

    /// Resolve the runtime state of an entity class mutably.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownEntityType`] for an id outside
    /// the registry.
    pub fn entity_type_state_mut(
        &mut self,
        type_id: EntityTypeId,
    ) -> Result<&mut EntityTypeState, SimulationError> {
        self.entity_types
            .get_mut(type_id.index())
            .ok_or(SimulationError::UnknownEntityType(type_id))
    }

    /// Draw the class of a new entity by the configured add weights.
    ///
    /// Returns `None` only when every class has zero weight.
    pub fn draw_entity_type(&mut self) -> Option<EntityTypeId> {
        let weights: Vec<f64> = self
            .entity_types
            .iter()
            .map(|state| state.config.add_weight)
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let draw = sampling::unit_draw_not0(&mut self.rng) * total;
        sampling::cumulative_walk(&weights, draw).map(EntityTypeId::from_index)
    }

    /// Create one entity of the given class at the current simulation
    /// time and rank it into every grouper that tracks it.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownEntityType`] when `type_id` is
    /// outside the registry.
    pub fn spawn_entity(&mut self, type_id: EntityTypeId) -> Result<EntityId, SimulationError> {
        // Fail before mutating the arena if the registry cannot track the
        // new entity.
        if type_id.index() >= self.entity_types.len() {
            return Err(SimulationError::UnknownEntityType(type_id));
        }
        let id = self.network.add_entity(type_id, self.time);
        self.follow_ranks.categorize(id, 0);
        self.tweet_ranks.categorize(id, 0);
        self.retweet_ranks.categorize(id, 0);
        self.age_ranks.categorize(id, Self::month_index(self.time));
        let type_state = self.entity_type_state_mut(type_id)?;
        type_state.members.push(id);
        type_state.follow_ranks.categorize(id, 0);
        Ok(id)
    }
}

/// Convert config rank bounds into the grouper's `(threshold, prob)` pairs.
fn rank_pairs(bounds: &[RankBound]) -> Vec<(u64, f64)> {
    bounds
        .iter()
        .map(|bound| (bound.threshold, bound.prob))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
