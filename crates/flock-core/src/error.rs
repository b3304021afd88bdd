//! Error types for the `flock-core` crate.
//!
//! Follows the two-tier error design of the engine: expected non-events
//! (empty pools, self-follow draws, already-following) are `Ok(false)` or
//! `Ok(None)` on the operations themselves and never appear here. This
//! enum is reserved for faults that must stop the run.

use flock_types::{EntityId, EntityTypeId};

/// Errors that can occur while driving the simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The graph layer detected an invariant violation.
    #[error("graph error: {source}")]
    Graph {
        /// The underlying graph error.
        #[from]
        source: flock_graph::GraphError,
    },

    /// Configuration was invalid at state construction.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// An entity carried a type id outside the registry.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(EntityTypeId),

    /// A chatty-followee flag referenced an edge that no longer exists.
    /// Flags are only cleared by the pruning path that removes the edge,
    /// so a stale flag means the graph and the flag list disagree.
    #[error("stale chatty flag: {actor} no longer follows {followee}")]
    StaleChattyFlag {
        /// The entity holding the stale flag.
        actor: EntityId,
        /// The flagged followee.
        followee: EntityId,
    },
}
