//! The entity arena and the two-sided follow-edge operations.
//!
//! [`Network`] owns every [`Entity`] in a dense append-only vector; an
//! [`EntityId`] is the entity's index. Entities are never relocated or
//! deleted during a run, so ids stay valid for the whole simulation and
//! no component ever needs to hold a reference into the arena.
//!
//! The edge operations here are the only code that touches both sides of
//! a follow relation, and they enforce the graph's primary invariant:
//!
//! > for all entities A, T: `T ∈ A.following ⇔ A ∈ T.followers`
//!
//! A detected breach is a [`GraphError`], never a silent repair.

use flock_types::{EntityId, EntityTypeId};

use crate::entity::Entity;
use crate::error::GraphError;

/// Dense, append-only store of all entities in the simulated network.
#[derive(Debug, Clone, Default)]
pub struct Network {
    entities: Vec<Entity>,
}

impl Network {
    /// Create an empty network.
    pub const fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Number of entities in the network.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the network has no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Append a fresh entity of the given class, returning its id.
    pub fn add_entity(&mut self, entity_type: EntityTypeId, creation_time: f64) -> EntityId {
        let id = EntityId::from_index(self.entities.len());
        self.entities.push(Entity::new(entity_type, creation_time));
        id
    }

    /// Resolve an entity id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EntityNotFound`] if the id is outside the
    /// arena. Internal callers only pass ids minted by [`add_entity`], so
    /// an error here is an invariant violation, not a lookup miss.
    ///
    /// [`add_entity`]: Network::add_entity
    pub fn entity(&self, id: EntityId) -> Result<&Entity, GraphError> {
        self.entities
            .get(id.index())
            .ok_or(GraphError::EntityNotFound(id))
    }

    /// Resolve an entity id mutably.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EntityNotFound`] if the id is outside the
    /// arena.
    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, GraphError> {
        self.entities
            .get_mut(id.index())
            .ok_or(GraphError::EntityNotFound(id))
    }

    /// Iterate over all `(id, entity)` pairs in arena order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(index, entity)| (EntityId::from_index(index), entity))
    }

    /// Insert the follow edge `actor -> target` on both sides.
    ///
    /// Returns `Ok(false)` with no mutation when the edge already exists
    /// (a repeated follow is an idempotent no-op). Self-edges are the
    /// caller's concern; this layer only guarantees two-sided consistency.
    ///
    /// # Errors
    ///
    /// [`GraphError::FollowAsymmetry`] when the forward insert succeeds
    /// but the mirrored follower entry was already present -- the
    /// invariant was broken before this call, and the run must stop.
    pub fn add_follow_edge(&mut self, actor: EntityId, target: EntityId) -> Result<bool, GraphError> {
        if !self.entity_mut(actor)?.following_mut().insert(target) {
            return Ok(false);
        }
        if !self.entity_mut(target)?.followers_mut().insert(actor) {
            return Err(GraphError::FollowAsymmetry { actor, target });
        }
        Ok(true)
    }

    /// Remove the follow edge `unfollower -> unfollowed` from both sides.
    ///
    /// Returns `Ok(true)` when the edge existed and was removed, and
    /// `Ok(false)` with no mutation when it cleanly did not exist on
    /// either side.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnfollowAsymmetry`] when the edge exists on exactly
    /// one side. The sides are checked before any mutation, so a detected
    /// breach leaves the graph untouched.
    pub fn remove_follow_edge(
        &mut self,
        unfollowed: EntityId,
        unfollower: EntityId,
    ) -> Result<bool, GraphError> {
        let has_follower = self.entity(unfollowed)?.followers().contains(unfollower);
        let has_followee = self.entity(unfollower)?.following().contains(unfollowed);
        if has_follower != has_followee {
            return Err(GraphError::UnfollowAsymmetry {
                unfollowed,
                unfollower,
            });
        }
        if !has_follower {
            return Ok(false);
        }
        self.entity_mut(unfollowed)?.followers_mut().erase(unfollower);
        self.entity_mut(unfollower)?.following_mut().erase(unfollowed);
        Ok(true)
    }

    /// Check the symmetry invariant across the whole graph.
    ///
    /// O(total edges); intended for tests and debug sweeps, not the hot
    /// path.
    ///
    /// # Errors
    ///
    /// [`GraphError::FollowAsymmetry`] naming the first offending pair.
    pub fn verify_symmetry(&self) -> Result<(), GraphError> {
        for (id, entity) in self.entities() {
            for followee in entity.following().iter() {
                let mirrored = self.entity(followee)?.followers().contains(id);
                if !mirrored {
                    return Err(GraphError::FollowAsymmetry {
                        actor: id,
                        target: followee,
                    });
                }
            }
            for follower in entity.followers().iter() {
                let mirrored = self.entity(follower)?.following().contains(id);
                if !mirrored {
                    return Err(GraphError::FollowAsymmetry {
                        actor: follower,
                        target: id,
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
