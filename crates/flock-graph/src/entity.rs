//! Per-entity state: relation sets, chattiness tracking, activity counters.
//!
//! An [`Entity`] is one simulated user. It owns exactly two
//! [`MembershipSet`]s -- who it follows and who follows it -- plus the
//! running chattiness average used by the forced-unfollow heuristic and
//! its tweet/retweet activity counters. The entity-type tag is immutable
//! after creation.

use flock_types::{EntityId, EntityTypeId};

use crate::membership::MembershipSet;

/// One simulated user.
#[derive(Debug, Clone)]
pub struct Entity {
    /// The declared class this entity belongs to. Immutable after creation.
    entity_type: EntityTypeId,
    /// Simulation time at which the entity entered the network.
    creation_time: f64,
    /// Entities this one follows.
    following: MembershipSet,
    /// Entities following this one.
    followers: MembershipSet,
    /// Running average of the chattiness constants of all followees.
    avg_chattiness: f64,
    /// Followees flagged as markedly chattier than this entity's average;
    /// candidates for forced unfollow.
    chatty_followees: Vec<EntityId>,
    /// Original tweets broadcast by this entity.
    n_tweets: u64,
    /// Retweets broadcast by this entity.
    n_retweets: u64,
}

impl Entity {
    /// Create a fresh entity of the given class with empty relation sets.
    pub const fn new(entity_type: EntityTypeId, creation_time: f64) -> Self {
        Self {
            entity_type,
            creation_time,
            following: MembershipSet::new(),
            followers: MembershipSet::new(),
            avg_chattiness: 0.0,
            chatty_followees: Vec::new(),
            n_tweets: 0,
            n_retweets: 0,
        }
    }

    /// The entity's class.
    pub const fn entity_type(&self) -> EntityTypeId {
        self.entity_type
    }

    /// Simulation time at which the entity was created.
    pub const fn creation_time(&self) -> f64 {
        self.creation_time
    }

    /// The set of entities this one follows.
    pub const fn following(&self) -> &MembershipSet {
        &self.following
    }

    /// Mutable access to the following set.
    pub const fn following_mut(&mut self) -> &mut MembershipSet {
        &mut self.following
    }

    /// The set of entities following this one.
    pub const fn followers(&self) -> &MembershipSet {
        &self.followers
    }

    /// Mutable access to the follower set.
    pub const fn followers_mut(&mut self) -> &mut MembershipSet {
        &mut self.followers
    }

    /// Running average of followee chattiness.
    pub const fn avg_chattiness(&self) -> f64 {
        self.avg_chattiness
    }

    /// Fold a newly followed entity's chattiness constant into the running
    /// average, flagging the followee as chatty first when its constant
    /// exceeds twice the current average.
    ///
    /// Must be called after the follow edge landed in [`following`], since
    /// the average is re-weighted by the post-insert followee count.
    ///
    /// [`following`]: Entity::following
    pub fn observe_followee_chattiness(&mut self, followee: EntityId, chattiness: f64) {
        if self.avg_chattiness * 2.0 < chattiness {
            self.chatty_followees.push(followee);
        }
        let count = self.following.len() as f64;
        if count > 0.0 {
            self.avg_chattiness = (self.avg_chattiness * (count - 1.0) + chattiness) / count;
        }
    }

    /// Followees currently flagged as chatty.
    pub fn chatty_followees(&self) -> &[EntityId] {
        &self.chatty_followees
    }

    /// Remove and return the flagged followee at `index`, if in range.
    pub fn take_chatty_followee(&mut self, index: usize) -> Option<EntityId> {
        if index < self.chatty_followees.len() {
            Some(self.chatty_followees.swap_remove(index))
        } else {
            None
        }
    }

    /// Original tweets broadcast so far.
    pub const fn n_tweets(&self) -> u64 {
        self.n_tweets
    }

    /// Retweets broadcast so far.
    pub const fn n_retweets(&self) -> u64 {
        self.n_retweets
    }

    /// Record an original tweet, returning the new total.
    pub const fn record_tweet(&mut self) -> u64 {
        self.n_tweets = self.n_tweets.saturating_add(1);
        self.n_tweets
    }

    /// Record a retweet, returning the new total.
    pub const fn record_retweet(&mut self) -> u64 {
        self.n_retweets = self.n_retweets.saturating_add(1);
        self.n_retweets
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
