//! Enumeration types for the Flock simulator.
//!
//! The follow model selector and the KMC event kinds. Both are plain data:
//! the behavior they select lives in `flock-core`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Follow models
// ---------------------------------------------------------------------------

/// Follow-target sampling policy used when a follow event fires.
///
/// The variants map onto the classic growth models for synthetic social
/// networks: uniform attachment, preferential (degree-biased) attachment in
/// two flavors, class-based attachment, and a Twitter-style mixture that
/// delegates to one of the others per event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowModel {
    /// Uniform draw over the candidate pool.
    #[default]
    Random,
    /// Degree-preferential attachment using the configured Barabási weight
    /// per follower-rank bucket.
    PreferentialBarabasi,
    /// Degree-preferential attachment using each bucket's own configured
    /// sampling probability.
    Preferential,
    /// Pick an entity class by its follow probability, then a uniform member
    /// of that class.
    EntityClass,
    /// Pick an entity class, then preferential attachment within the class's
    /// private follower ranking.
    PreferentialEntityClass,
    /// Weighted mixture over `Random`, `Preferential`, `EntityClass`, and
    /// `PreferentialEntityClass`.
    Twitter,
}

// ---------------------------------------------------------------------------
// KMC event kinds
// ---------------------------------------------------------------------------

/// The kind of discrete event a KMC step can fire.
///
/// The ordering here is the fixed walk order used when the event clock
/// resolves a draw against the cumulative rate sequence; it must stay
/// stable for reproducibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A new entity joins the network.
    AddEntity,
    /// An existing entity attempts to follow another.
    Follow,
    /// An entity broadcasts an original tweet.
    Tweet,
    /// An entity rebroadcasts a live tweet to its own followers.
    Retweet,
}

impl EventKind {
    /// All event kinds in walk order.
    pub const ALL: [Self; 4] = [Self::AddEntity, Self::Follow, Self::Tweet, Self::Retweet];
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_model_defaults_to_random() {
        assert_eq!(FollowModel::default(), FollowModel::Random);
    }

    #[test]
    fn follow_model_deserializes_from_snake_case() {
        let model: Result<FollowModel, _> = serde_json::from_str("\"preferential_barabasi\"");
        assert_eq!(model.ok(), Some(FollowModel::PreferentialBarabasi));
    }

    #[test]
    fn event_kind_walk_order_is_stable() {
        assert_eq!(
            EventKind::ALL,
            [
                EventKind::AddEntity,
                EventKind::Follow,
                EventKind::Tweet,
                EventKind::Retweet,
            ]
        );
    }
}
