//! Tweets, retweets, and the time-decay weighting of retweet appeal.
//!
//! Original tweet payloads are stored once in a content arena; every
//! broadcast -- the original and all retweets -- is a [`TweetRecord`]
//! referencing the content by [`ContentId`]. Sharing by index keeps the
//! bank trivially copyable and cache-friendly, and there is exactly one
//! owner for every payload.
//!
//! How fast a tweet loses retweet appeal is not this engine's call: the
//! decay curve is an external rate contract, modeled by
//! [`RetweetRateProvider`]. The stock implementation is the exponential
//! half-life curve of the platform model, with a liveness tolerance below
//! which a tweet is pruned from the active bank.

use rand::Rng;
use tracing::debug;

use flock_types::{ContentId, EntityId};

use crate::error::SimulationError;
use crate::sampling;
use crate::state::SimulationState;

// ---------------------------------------------------------------------------
// Decay provider contract
// ---------------------------------------------------------------------------

/// External rate contract: the relative retweet appeal of a broadcast.
pub trait RetweetRateProvider {
    /// Appeal weight of a broadcast made at `tweet_time`, observed at
    /// `now`. Returns `None` once the broadcast has decayed below the
    /// provider's liveness tolerance and should be pruned.
    fn weight(&self, tweet_time: f64, now: f64) -> Option<f64>;
}

/// Exponential half-life decay: `exp((tweet_time - now) / half_life)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfLifeDecay {
    /// Half-life of the appeal curve, in simulated minutes.
    pub half_life: f64,
    /// Liveness tolerance; weights below this report `None`.
    pub tolerance: f64,
}

impl RetweetRateProvider for HalfLifeDecay {
    fn weight(&self, tweet_time: f64, now: f64) -> Option<f64> {
        let value = ((tweet_time - now) / self.half_life).exp();
        if value < self.tolerance {
            None
        } else {
            Some(value)
        }
    }
}

// ---------------------------------------------------------------------------
// Bank
// ---------------------------------------------------------------------------

/// One original tweet's shared payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweetContent {
    /// The entity that created the original content.
    pub author: EntityId,
    /// Simulation time of the original broadcast.
    pub created_at: f64,
}

/// One broadcast: an original tweet or a retweet of shared content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweetRecord {
    /// The entity broadcasting.
    pub tweeter: EntityId,
    /// The shared content being broadcast.
    pub content: ContentId,
    /// Simulation time of this broadcast.
    pub time: f64,
}

impl TweetRecord {
    /// Whether this broadcast is the original (the tweeter authored the
    /// content it references).
    pub fn is_original(&self, bank: &TweetBank) -> bool {
        bank.content(self.content)
            .is_some_and(|content| content.author == self.tweeter)
    }
}

/// The content arena plus the list of broadcasts still live enough to be
/// retweeted.
#[derive(Debug, Clone)]
pub struct TweetBank {
    decay: HalfLifeDecay,
    contents: Vec<TweetContent>,
    active: Vec<TweetRecord>,
}

impl TweetBank {
    /// Create an empty bank with the given decay parameters.
    pub const fn new(half_life: f64, tolerance: f64) -> Self {
        Self {
            decay: HalfLifeDecay {
                half_life,
                tolerance,
            },
            contents: Vec::new(),
            active: Vec::new(),
        }
    }

    /// The bank's decay provider.
    pub const fn decay(&self) -> &HalfLifeDecay {
        &self.decay
    }

    /// Total number of original contents ever created.
    pub fn n_contents(&self) -> usize {
        self.contents.len()
    }

    /// Broadcasts currently live.
    pub fn active(&self) -> &[TweetRecord] {
        &self.active
    }

    /// Resolve a content id.
    pub fn content(&self, id: ContentId) -> Option<&TweetContent> {
        self.contents.get(id.index())
    }

    /// Record an original tweet, returning the new content's id.
    pub fn record_original(&mut self, tweeter: EntityId, now: f64) -> ContentId {
        let content = ContentId::from_index(self.contents.len());
        self.contents.push(TweetContent {
            author: tweeter,
            created_at: now,
        });
        self.active.push(TweetRecord {
            tweeter,
            content,
            time: now,
        });
        content
    }

    /// Record a retweet of existing content.
    pub fn record_retweet(&mut self, retweeter: EntityId, content: ContentId, now: f64) {
        self.active.push(TweetRecord {
            tweeter: retweeter,
            content,
            time: now,
        });
    }

    /// Drop every broadcast whose appeal has decayed away, returning how
    /// many were pruned.
    pub fn prune_dead(&mut self, now: f64) -> usize {
        let before = self.active.len();
        let decay = self.decay;
        self.active
            .retain(|record| decay.weight(record.time, now).is_some());
        before.saturating_sub(self.active.len())
    }

    /// Draw a live broadcast with probability proportional to its decay
    /// weight, or `None` when nothing live remains.
    pub fn pick_weighted(&self, now: f64, rng: &mut impl Rng) -> Option<TweetRecord> {
        let weights: Vec<f64> = self
            .active
            .iter()
            .map(|record| self.decay.weight(record.time, now).unwrap_or(0.0))
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let draw = sampling::unit_draw_not0(rng) * total;
        let index = sampling::cumulative_walk(&weights, draw)?;
        self.active.get(index).copied()
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Run one tweet event: `actor` broadcasts an original tweet.
///
/// Always succeeds; the actor's tweet count is re-ranked immediately.
///
/// # Errors
///
/// Propagates an arena lookup failure, which is an invariant violation.
pub fn run_tweet_event(
    state: &mut SimulationState,
    actor: EntityId,
) -> Result<bool, SimulationError> {
    let content = state.tweets.record_original(actor, state.time);
    let n_tweets = state.network.entity_mut(actor)?.record_tweet();
    state.tweet_ranks.categorize(actor, n_tweets);
    state.stats.record_tweet();
    debug!(%actor, content = %content, "tweet");
    Ok(true)
}

/// Run one retweet event.
///
/// A live broadcast is drawn with probability proportional to its decay
/// weight, then a follower of that broadcaster is drawn uniformly as the
/// retweeter. Returns `Ok(false)` -- a retryable non-event -- when
/// nothing live remains, the broadcaster has no followers, or the drawn
/// follower authored the content.
///
/// # Errors
///
/// Propagates graph invariant violations.
pub fn run_retweet_event(state: &mut SimulationState) -> Result<bool, SimulationError> {
    state.tweets.prune_dead(state.time);
    let Some(record) = state.tweets.pick_weighted(state.time, &mut state.rng) else {
        return Ok(false);
    };
    let broadcaster = state.network.entity(record.tweeter)?;
    let Some(retweeter) = broadcaster.followers().pick_random(&mut state.rng) else {
        return Ok(false);
    };
    // An author never rebroadcasts its own content.
    let author = state.tweets.content(record.content).map(|c| c.author);
    if author == Some(retweeter) {
        return Ok(false);
    }
    state
        .tweets
        .record_retweet(retweeter, record.content, state.time);
    let n_retweets = state.network.entity_mut(retweeter)?.record_retweet();
    state.retweet_ranks.categorize(retweeter, n_retweets);
    state.stats.record_retweet();
    debug!(%retweeter, content = %record.content, "retweet");
    Ok(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
