//! Type-safe identifier wrappers for dense arena indices.
//!
//! Every entity in the simulation lives in an append-only arena and is
//! addressed by its index. Relations between entities are stored as these
//! index ids and resolved through the owning store — never as references
//! into the arena — so the arena stays freely resizable and the whole
//! graph is trivially copyable.
//!
//! "No entity" is expressed as `Option<EntityId>` at every call site; there
//! is no in-band sentinel value, so an invalid id can never be inserted
//! into a membership set by construction.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a dense arena index.
macro_rules! define_index_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Wrap a raw arena index.
            pub const fn from_index(index: usize) -> Self {
                Self(index)
            }

            /// Return the raw arena index.
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_index_id! {
    /// Identifier of an entity (a simulated user) in the network arena.
    EntityId
}

define_index_id! {
    /// Identifier of a declared entity class in the type registry.
    EntityTypeId
}

define_index_id! {
    /// Identifier of an original tweet's content in the content arena.
    ///
    /// Retweet records share the original content by carrying the same
    /// `ContentId` rather than cloning or reference-counting the payload.
    ContentId
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
