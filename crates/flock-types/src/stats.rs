//! Run statistics for a simulation.
//!
//! [`SimulationStats`] is the statistics sink the engine increments as a
//! side effect of completed events. Counters saturate rather than wrap; a
//! run long enough to saturate a `u64` has other problems.

use serde::{Deserialize, Serialize};

/// Aggregate counters for one simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    /// KMC steps executed (including steps whose event was a non-event).
    pub n_steps: u64,
    /// Completed follow transactions, follow-backs included.
    pub n_follows: u64,
    /// Completed unfollow transactions (chatty pruning).
    pub n_unfollows: u64,
    /// Follow transactions that were triggered as a follow-back.
    pub n_followbacks: u64,
    /// Original tweets broadcast.
    pub n_tweets: u64,
    /// Retweets broadcast.
    pub n_retweets: u64,
    /// Entities added after the seed network was built.
    pub n_entities_added: u64,
    /// Events that completed without mutating the graph and were handed
    /// back to the KMC loop for a redraw.
    pub n_retries: u64,
}

impl SimulationStats {
    /// Fresh all-zero statistics.
    pub const fn new() -> Self {
        Self {
            n_steps: 0,
            n_follows: 0,
            n_unfollows: 0,
            n_followbacks: 0,
            n_tweets: 0,
            n_retweets: 0,
            n_entities_added: 0,
            n_retries: 0,
        }
    }

    /// Record one executed KMC step.
    pub const fn record_step(&mut self) {
        self.n_steps = self.n_steps.saturating_add(1);
    }

    /// Record one completed follow transaction.
    pub const fn record_follow(&mut self) {
        self.n_follows = self.n_follows.saturating_add(1);
    }

    /// Record one completed unfollow transaction.
    pub const fn record_unfollow(&mut self) {
        self.n_unfollows = self.n_unfollows.saturating_add(1);
    }

    /// Record one completed follow-back.
    pub const fn record_followback(&mut self) {
        self.n_followbacks = self.n_followbacks.saturating_add(1);
    }

    /// Record one original tweet.
    pub const fn record_tweet(&mut self) {
        self.n_tweets = self.n_tweets.saturating_add(1);
    }

    /// Record one retweet.
    pub const fn record_retweet(&mut self) {
        self.n_retweets = self.n_retweets.saturating_add(1);
    }

    /// Record one mid-run entity addition.
    pub const fn record_entity_added(&mut self) {
        self.n_entities_added = self.n_entities_added.saturating_add(1);
    }

    /// Record a retryable non-event.
    pub const fn record_retry(&mut self) {
        self.n_retries = self.n_retries.saturating_add(1);
    }
}

/// Per-entity-class mutable counters.
///
/// Tracks how many follows the members of a class have performed and how
/// many followers they have collectively gained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeCounters {
    /// Follows performed by members of this class.
    pub n_follows: u64,
    /// Followers gained by members of this class.
    pub n_followers: u64,
}

impl EntityTypeCounters {
    /// Record that a member of this class followed someone.
    pub const fn record_follow(&mut self) {
        self.n_follows = self.n_follows.saturating_add(1);
    }

    /// Record that a member of this class gained a follower.
    pub const fn record_follower(&mut self) {
        self.n_followers = self.n_followers.saturating_add(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stats_are_all_zero() {
        let stats = SimulationStats::new();
        assert_eq!(stats, SimulationStats::default());
        assert_eq!(stats.n_follows, 0);
        assert_eq!(stats.n_steps, 0);
    }

    #[test]
    fn record_methods_increment_their_counter_only() {
        let mut stats = SimulationStats::new();
        stats.record_follow();
        stats.record_follow();
        stats.record_retry();
        assert_eq!(stats.n_follows, 2);
        assert_eq!(stats.n_retries, 1);
        assert_eq!(stats.n_unfollows, 0);
    }

    #[test]
    fn counters_saturate_instead_of_wrapping() {
        let mut stats = SimulationStats {
            n_steps: u64::MAX,
            ..SimulationStats::new()
        };
        stats.record_step();
        assert_eq!(stats.n_steps, u64::MAX);
    }

    #[test]
    fn type_counters_track_both_directions() {
        let mut counters = EntityTypeCounters::default();
        counters.record_follow();
        counters.record_follower();
        counters.record_follower();
        assert_eq!(counters.n_follows, 1);
        assert_eq!(counters.n_followers, 2);
    }
}
