//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `flock-config.yaml` at the
//! workspace root. This module defines strongly-typed structs mirroring
//! the YAML structure and a loader that reads and validates the file.
//! Every field has a default, so an empty document is a runnable (if
//! small) scenario.

use std::path::Path;

use serde::{Deserialize, Serialize};

use flock_types::FollowModel;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but fails a semantic check.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// One rank-bucket bound: the inclusive metric ceiling and the bucket's
/// configured sampling probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankBound {
    /// Inclusive upper bound of the metric range.
    pub threshold: u64,
    /// Sampling probability mass configured for the bucket.
    pub prob: f64,
}

impl RankBound {
    /// Convenience constructor.
    pub const fn new(threshold: u64, prob: f64) -> Self {
        Self { threshold, prob }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `flock-config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Network seeding and sizing.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Follow-event behavior.
    #[serde(default)]
    pub follow: FollowConfig,

    /// Tweet and retweet behavior.
    #[serde(default)]
    pub tweets: TweetConfig,

    /// KMC event rates not owned by an entity class.
    #[serde(default)]
    pub rates: RatesConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub bounds: BoundsConfig,

    /// Creation-cohort rank buckets (age, in simulated months).
    #[serde(default = "default_age_ranks")]
    pub age_ranks: Vec<RankBound>,

    /// The declared entity classes.
    #[serde(default = "default_entity_types")]
    pub entity_types: Vec<EntityTypeConfig>,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a semantic check fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on a parse failure or
    /// [`ConfigError::Invalid`] on a semantic one.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic validation beyond what serde can express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first failed check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity_types.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "at least one entity type must be declared".to_owned(),
            });
        }
        for entity_type in &self.entity_types {
            for (name, prob) in [
                ("prob_follow", entity_type.prob_follow),
                ("prob_followback", entity_type.prob_followback),
            ] {
                if !(0.0..=1.0).contains(&prob) {
                    return Err(ConfigError::Invalid {
                        reason: format!(
                            "entity type '{}': {name} must be within [0, 1], got {prob}",
                            entity_type.name
                        ),
                    });
                }
            }
            for (name, rate) in [
                ("add_weight", entity_type.add_weight),
                ("follow_rate", entity_type.follow_rate),
                ("tweet_rate", entity_type.tweet_rate),
                ("retweet_rate", entity_type.retweet_rate),
            ] {
                if rate < 0.0 {
                    return Err(ConfigError::Invalid {
                        reason: format!(
                            "entity type '{}': {name} must be non-negative, got {rate}",
                            entity_type.name
                        ),
                    });
                }
            }
        }
        if self.follow.follow_ranks.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "follow.follow_ranks must declare at least one bucket".to_owned(),
            });
        }
        if !self.follow.barabasi_weights.is_empty()
            && self.follow.barabasi_weights.len() != self.follow.follow_ranks.len()
        {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "follow.barabasi_weights must match follow.follow_ranks ({} buckets), got {}",
                    self.follow.follow_ranks.len(),
                    self.follow.barabasi_weights.len()
                ),
            });
        }
        let weight_sum: f64 = self.follow.twitter_model_weights.iter().sum();
        if weight_sum <= 0.0 {
            return Err(ConfigError::Invalid {
                reason: "follow.twitter_model_weights must have positive total weight".to_owned(),
            });
        }
        if self.tweets.half_life <= 0.0 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "tweets.half_life must be positive, got {}",
                    self.tweets.half_life
                ),
            });
        }
        Ok(())
    }

    /// The Barabási per-bucket weight vector, falling back to
    /// degree-proportional weights (1, 2, 3, ...) when not configured.
    pub fn barabasi_weights(&self) -> Vec<f64> {
        if self.follow.barabasi_weights.is_empty() {
            (1..=self.follow.follow_ranks.len())
                .map(|rank| rank as f64)
                .collect()
        } else {
            self.follow.barabasi_weights.clone()
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            follow: FollowConfig::default(),
            tweets: TweetConfig::default(),
            rates: RatesConfig::default(),
            bounds: BoundsConfig::default(),
            age_ranks: default_age_ranks(),
            entity_types: default_entity_types(),
        }
    }
}

/// Network seeding and sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Random seed for the whole run.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Entities spawned before the clock starts.
    #[serde(default = "default_initial_entities")]
    pub initial_entities: usize,

    /// Hard ceiling on the entity arena; add events beyond it are
    /// retryable non-events.
    #[serde(default = "default_max_entities")]
    pub max_entities: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            initial_entities: default_initial_entities(),
            max_entities: default_max_entities(),
        }
    }
}

/// Follow-event behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowConfig {
    /// Active follow-target sampling policy.
    #[serde(default)]
    pub model: FollowModel,

    /// Whether a successful follow may trigger a probabilistic follow-back.
    #[serde(default = "default_true")]
    pub enable_followback: bool,

    /// Whether the chatty forced-unfollow heuristic runs before each
    /// follow attempt.
    #[serde(default)]
    pub enable_unfollow_pruning: bool,

    /// Global follower-rank buckets used by the preferential policies.
    #[serde(default = "default_follow_ranks")]
    pub follow_ranks: Vec<RankBound>,

    /// Per-bucket weights for the Barabási variant. Empty means
    /// degree-proportional defaults.
    #[serde(default)]
    pub barabasi_weights: Vec<f64>,

    /// Mixture weights of the Twitter model over
    /// random / preferential / entity-class / preferential-entity-class.
    /// The weights are provisional in the source material, so they stay
    /// configurable rather than hardcoded.
    #[serde(default = "default_twitter_model_weights")]
    pub twitter_model_weights: [f64; 4],
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            model: FollowModel::default(),
            enable_followback: true,
            enable_unfollow_pruning: false,
            follow_ranks: default_follow_ranks(),
            barabasi_weights: Vec::new(),
            twitter_model_weights: default_twitter_model_weights(),
        }
    }
}

/// Tweet and retweet behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetConfig {
    /// Half-life, in simulated minutes, of a tweet's retweet appeal.
    #[serde(default = "default_half_life")]
    pub half_life: f64,

    /// Liveness tolerance: tweets whose decay weight falls below this are
    /// pruned from the active bank.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Tweet-count rank buckets.
    #[serde(default = "default_activity_ranks")]
    pub tweet_ranks: Vec<RankBound>,

    /// Retweet-count rank buckets.
    #[serde(default = "default_activity_ranks")]
    pub retweet_ranks: Vec<RankBound>,
}

impl Default for TweetConfig {
    fn default() -> Self {
        Self {
            half_life: default_half_life(),
            tolerance: default_tolerance(),
            tweet_ranks: default_activity_ranks(),
            retweet_ranks: default_activity_ranks(),
        }
    }
}

/// KMC event rates not owned by an entity class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesConfig {
    /// Flat rate of entity-addition events, per simulated minute.
    #[serde(default = "default_add_rate")]
    pub add: f64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            add: default_add_rate(),
        }
    }
}

/// Simulation boundary parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsConfig {
    /// Stop after this many KMC steps.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,

    /// Stop once the simulation clock passes this many simulated minutes.
    #[serde(default = "default_max_sim_time")]
    pub max_sim_time: f64,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            max_sim_time: default_max_sim_time(),
        }
    }
}

/// One declared entity class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTypeConfig {
    /// Display name of the class.
    pub name: String,

    /// Relative weight when drawing the class of a new entity.
    #[serde(default = "default_add_weight")]
    pub add_weight: f64,

    /// Walk probability of landing in this class under the entity-class
    /// follow policies.
    #[serde(default = "default_prob_follow")]
    pub prob_follow: f64,

    /// Probability that a member follows back after being followed.
    #[serde(default = "default_prob_followback")]
    pub prob_followback: f64,

    /// Chattiness constant fed into followers' running averages.
    #[serde(default = "default_chattiness")]
    pub chattiness: f64,

    /// Per-member follow event rate, per simulated minute.
    #[serde(default = "default_follow_rate")]
    pub follow_rate: f64,

    /// Per-member tweet event rate, per simulated minute.
    #[serde(default = "default_tweet_rate")]
    pub tweet_rate: f64,

    /// Per-member retweet event rate, per simulated minute.
    #[serde(default = "default_retweet_rate")]
    pub retweet_rate: f64,

    /// Private follower-rank buckets for this class. Empty means the
    /// global `follow.follow_ranks` bounds are reused.
    #[serde(default)]
    pub follow_ranks: Vec<RankBound>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    1
}

const fn default_initial_entities() -> usize {
    100
}

const fn default_max_entities() -> usize {
    100_000
}

const fn default_true() -> bool {
    true
}

fn default_follow_ranks() -> Vec<RankBound> {
    vec![
        RankBound::new(8, 0.2),
        RankBound::new(64, 0.2),
        RankBound::new(512, 0.2),
        RankBound::new(4096, 0.2),
        RankBound::new(u64::MAX, 0.2),
    ]
}

fn default_activity_ranks() -> Vec<RankBound> {
    vec![
        RankBound::new(16, 0.4),
        RankBound::new(256, 0.35),
        RankBound::new(u64::MAX, 0.25),
    ]
}

fn default_age_ranks() -> Vec<RankBound> {
    vec![
        RankBound::new(0, 1.0),
        RankBound::new(1, 1.0),
        RankBound::new(3, 1.0),
        RankBound::new(u64::MAX, 1.0),
    ]
}

const fn default_twitter_model_weights() -> [f64; 4] {
    [0.25, 0.25, 0.25, 0.25]
}

const fn default_half_life() -> f64 {
    90.0
}

const fn default_tolerance() -> f64 {
    0.01
}

const fn default_add_rate() -> f64 {
    0.1
}

const fn default_max_steps() -> u64 {
    1_000_000
}

const fn default_max_sim_time() -> f64 {
    // One simulated month of minutes.
    24.0 * 60.0 * 30.0
}

const fn default_add_weight() -> f64 {
    100.0
}

const fn default_prob_follow() -> f64 {
    1.0
}

const fn default_prob_followback() -> f64 {
    0.44
}

const fn default_chattiness() -> f64 {
    0.01
}

const fn default_follow_rate() -> f64 {
    0.01
}

const fn default_tweet_rate() -> f64 {
    0.01
}

const fn default_retweet_rate() -> f64 {
    0.0025
}

fn default_entity_types() -> Vec<EntityTypeConfig> {
    vec![EntityTypeConfig {
        name: "standard".to_owned(),
        add_weight: default_add_weight(),
        prob_follow: default_prob_follow(),
        prob_followback: default_prob_followback(),
        chattiness: default_chattiness(),
        follow_rate: default_follow_rate(),
        tweet_rate: default_tweet_rate(),
        retweet_rate: default_retweet_rate(),
        follow_ranks: Vec::new(),
    }]
}

impl Default for EntityTypeConfig {
    fn default() -> Self {
        Self {
            name: "standard".to_owned(),
            add_weight: default_add_weight(),
            prob_follow: default_prob_follow(),
            prob_followback: default_prob_followback(),
            chattiness: default_chattiness(),
            follow_rate: default_follow_rate(),
            tweet_rate: default_tweet_rate(),
            retweet_rate: default_retweet_rate(),
            follow_ranks: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
