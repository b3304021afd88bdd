//! Error types for the `flock-graph` crate.
//!
//! Graph errors are invariant violations, not business outcomes. Expected
//! non-events (an edge that already exists, an empty pick pool) are plain
//! boolean/`Option` returns on the operations themselves; anything that
//! reaches this enum means the two-sided graph consistency contract was
//! broken and the run must not continue as if nothing happened.

use flock_types::EntityId;

/// Errors that can occur during graph mutation.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// An entity id did not resolve in the arena.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A follow edge was inserted on one side but the mirrored follower
    /// entry was already present.
    #[error("follow symmetry violated: {target} already listed {actor} as a follower")]
    FollowAsymmetry {
        /// The entity doing the following.
        actor: EntityId,
        /// The entity being followed.
        target: EntityId,
    },

    /// An unfollow found the edge present on one side only.
    #[error("unfollow symmetry violated: edge {unfollower} -> {unfollowed} exists on one side only")]
    UnfollowAsymmetry {
        /// The entity losing a follower.
        unfollowed: EntityId,
        /// The entity doing the unfollowing.
        unfollower: EntityId,
    },
}
