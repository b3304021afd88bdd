//! KMC engine for the Flock network simulator.
//!
//! This crate drives the simulation: it owns the configuration surface,
//! the aggregate [`SimulationState`], the follow engine with its five
//! target-sampling policies, the tweet/retweet bank, and the
//! kinetic-Monte-Carlo event clock and runner. The graph data structures
//! it mutates live in `flock-graph`.
//!
//! # Modules
//!
//! - [`config`] -- Typed configuration mirroring `flock-config.yaml`
//! - [`state`] -- Aggregate simulation state ([`SimulationState`])
//! - [`follow`] -- Target sampling policies and the follow/unfollow protocol
//! - [`tweet`] -- Tweet bank, decay provider contract, tweet/retweet events
//! - [`rates`] -- The KMC event clock (rates, waiting times, actor selection)
//! - [`runner`] -- The bounded simulation loop
//! - [`error`] -- Run-stopping errors ([`SimulationError`])

pub mod config;
pub mod error;
pub mod follow;
pub mod rates;
pub mod runner;
mod sampling;
pub mod state;
pub mod tweet;

// Re-export primary types at crate root for convenience.
pub use config::{ConfigError, SimulationConfig};
pub use error::SimulationError;
pub use runner::{EndReason, RunSummary, build_seed_network, run_simulation};
pub use state::{EntityTypeState, SimulationState};
pub use tweet::{HalfLifeDecay, RetweetRateProvider, TweetBank};
