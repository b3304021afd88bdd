//! The follow engine: target sampling policies and the follow/unfollow
//! transaction protocol.
//!
//! This module is the algorithmic heart of the simulator. A follow event
//! runs in three stages:
//!
//! 1. **Select** a target under the configured [`FollowModel`] policy.
//! 2. **Prune** (optionally) one flagged chatty followee of the actor.
//! 3. **Attempt** the transaction: mutate both sides of the edge, update
//!    chattiness, maybe trigger a follow-back, re-rank the target, and
//!    bump the counters.
//!
//! Every policy draws only from the state's single RNG stream and walks
//! buckets in their fixed category order, so a fixed seed and call order
//! reproduce the run bit for bit. A policy that finds no target -- an
//! empty pool, an empty landed bucket, or floating-point residue
//! exhausting a walk -- returns `None`, which the KMC driver treats as a
//! retryable non-event. Nothing is mutated on any failure path, so the
//! driver can redraw immediately without cleanup.

use rand::Rng;
use tracing::debug;

use flock_types::{EntityId, FollowModel};

use crate::error::SimulationError;
use crate::sampling;
use crate::state::SimulationState;

// ---------------------------------------------------------------------------
// Target sampling policies
// ---------------------------------------------------------------------------

/// Pick a follow target under the configured policy.
///
/// `candidate_pool` bounds the uniform policy's draw (the KMC driver
/// passes the entity count at event-schedule time); the other policies
/// sample from the rank groupers and the type registry.
pub fn select_follow_target(
    state: &mut SimulationState,
    candidate_pool: usize,
) -> Option<EntityId> {
    match state.config.follow.model {
        FollowModel::Random => random_target(state, candidate_pool),
        FollowModel::PreferentialBarabasi => preferential_barabasi_target(state),
        FollowModel::Preferential => preferential_target(state),
        FollowModel::EntityClass => entity_class_target(state),
        FollowModel::PreferentialEntityClass => preferential_entity_class_target(state),
        FollowModel::Twitter => twitter_target(state, candidate_pool),
    }
}

/// Uniform draw over the candidate pool.
fn random_target(state: &mut SimulationState, candidate_pool: usize) -> Option<EntityId> {
    let bound = candidate_pool.min(state.network.len());
    if bound == 0 {
        return None;
    }
    Some(EntityId::from_index(state.rng.random_range(0..bound)))
}

/// Degree-preferential attachment, Barabási variant.
///
/// Bucket weights come from the dedicated Barabási weight vector scaled
/// by bucket population. An empty bucket that the draw lands on is
/// skipped and the walk continues -- this variant keeps probing deeper
/// buckets, which is what gives it its heavier tail.
fn preferential_barabasi_target(state: &mut SimulationState) -> Option<EntityId> {
    let mut draw = sampling::unit_draw_not0(&mut state.rng);
    let categories = state.follow_ranks.categories();
    let weights: Vec<f64> = state
        .barabasi_weights
        .iter()
        .zip(categories)
        .map(|(weight, bucket)| weight * bucket.len() as f64)
        .collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }
    for (index, weight) in weights.iter().enumerate() {
        let normalized = weight / total;
        if draw <= normalized {
            if let Some(bucket) = categories.get(index) {
                if !bucket.is_empty() {
                    let slot = state.rng.random_range(0..bucket.len());
                    return bucket.members().get(slot).copied();
                }
            }
        }
        draw -= normalized;
    }
    None
}

/// Degree-preferential attachment, plain variant.
///
/// Bucket weights are each bucket's own configured probability scaled by
/// its population. Unlike the Barabási variant, a landed bucket that
/// turns out empty ends the draw with no target.
fn preferential_target(state: &mut SimulationState) -> Option<EntityId> {
    let mut draw = sampling::unit_draw_not0(&mut state.rng);
    let categories = state.follow_ranks.categories();
    let weights: Vec<f64> = categories
        .iter()
        .map(|bucket| bucket.prob * bucket.len() as f64)
        .collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }
    for (index, weight) in weights.iter().enumerate() {
        let normalized = weight / total;
        if draw <= normalized {
            let bucket = categories.get(index)?;
            if bucket.is_empty() {
                return None;
            }
            let slot = state.rng.random_range(0..bucket.len());
            return bucket.members().get(slot).copied();
        }
        draw -= normalized;
    }
    None
}

/// Entity-class attachment: walk the declared classes by their follow
/// probabilities, then draw uniformly within the landed class. A landed
/// class with no members skips onward.
fn entity_class_target(state: &mut SimulationState) -> Option<EntityId> {
    let mut draw = sampling::unit_draw_not0(&mut state.rng);
    for type_state in &state.entity_types {
        if draw <= type_state.config.prob_follow && !type_state.members.is_empty() {
            let slot = state.rng.random_range(0..type_state.members.len());
            return type_state.members.get(slot).copied();
        }
        draw -= type_state.config.prob_follow;
    }
    None
}

/// Preferential entity-class attachment: pick a class as in
/// [`entity_class_target`], then run the plain preferential bucket walk
/// over that class's private follower ranking (a second draw).
fn preferential_entity_class_target(state: &mut SimulationState) -> Option<EntityId> {
    let mut draw = sampling::unit_draw_not0(&mut state.rng);
    for type_index in 0..state.entity_types.len() {
        let prob_follow = state
            .entity_types
            .get(type_index)
            .map_or(0.0, |type_state| type_state.config.prob_follow);
        if draw <= prob_follow {
            let inner_draw = sampling::unit_draw_not0(&mut state.rng);
            if let Some(target) = type_bucket_walk(state, type_index, inner_draw) {
                return Some(target);
            }
        }
        draw -= prob_follow;
    }
    None
}

/// The plain preferential walk over one class's private grouper.
fn type_bucket_walk(
    state: &mut SimulationState,
    type_index: usize,
    mut draw: f64,
) -> Option<EntityId> {
    let type_state = state.entity_types.get(type_index)?;
    let categories = type_state.follow_ranks.categories();
    let weights: Vec<f64> = categories
        .iter()
        .map(|bucket| bucket.prob * bucket.len() as f64)
        .collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }
    for (index, weight) in weights.iter().enumerate() {
        let normalized = weight / total;
        if draw <= normalized {
            let bucket = categories.get(index)?;
            if bucket.is_empty() {
                return None;
            }
            let slot = state.rng.random_range(0..bucket.len());
            return bucket.members().get(slot).copied();
        }
        draw -= normalized;
    }
    None
}

/// The Twitter mixture: one weighted draw picks a delegate policy.
///
/// The mixture covers random / plain preferential / entity-class /
/// preferential-entity-class with the configured (default equal)
/// weights.
fn twitter_target(state: &mut SimulationState, candidate_pool: usize) -> Option<EntityId> {
    let weights = state.config.follow.twitter_model_weights;
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let draw = sampling::unit_draw_not0(&mut state.rng) * total;
    match sampling::cumulative_walk(&weights, draw) {
        Some(0) => random_target(state, candidate_pool),
        Some(1) => preferential_target(state),
        Some(2) => entity_class_target(state),
        Some(3) => preferential_entity_class_target(state),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Transaction protocol
// ---------------------------------------------------------------------------

/// Insert the edge `actor -> target` and absorb the target's chattiness
/// into the actor's running average when pruning is enabled.
///
/// Returns `Ok(false)` with no mutation when the edge already exists.
/// The caller guarantees `actor != target`.
fn attempt_follow(
    state: &mut SimulationState,
    actor: EntityId,
    target: EntityId,
) -> Result<bool, SimulationError> {
    if !state.network.add_follow_edge(actor, target)? {
        return Ok(false);
    }
    if state.config.follow.enable_unfollow_pruning {
        let target_type = state.network.entity(target)?.entity_type();
        let chattiness = state.entity_type_state(target_type)?.config.chattiness;
        state
            .network
            .entity_mut(actor)?
            .observe_followee_chattiness(target, chattiness);
    }
    Ok(true)
}

/// Forcibly unfollow one randomly chosen flagged chatty followee of the
/// actor, if any are flagged.
///
/// # Errors
///
/// A flag entry whose edge no longer exists is an invariant violation:
/// flags are only removed here, and only this path removes the edges
/// they reference.
fn prune_chatty_followee(
    state: &mut SimulationState,
    actor: EntityId,
) -> Result<(), SimulationError> {
    let flagged = state.network.entity(actor)?.chatty_followees().len();
    if flagged == 0 {
        return Ok(());
    }
    let index = state.rng.random_range(0..flagged);
    let Some(followee) = state
        .network
        .entity(actor)?
        .chatty_followees()
        .get(index)
        .copied()
    else {
        return Ok(());
    };
    if unfollow(state, followee, actor)? {
        state.network.entity_mut(actor)?.take_chatty_followee(index);
        Ok(())
    } else {
        Err(SimulationError::StaleChattyFlag { actor, followee })
    }
}

/// Run one follow event for `actor`.
///
/// Selects a target under the configured policy, runs the chatty-pruning
/// heuristic when enabled, then attempts the transaction. On success the
/// target is re-ranked in the global and type-scoped groupers by its new
/// follower count, counters are bumped, and the target may probabilistically
/// follow back.
///
/// Returns `Ok(false)` -- "retry this KMC event" -- whenever no edge was
/// inserted: self-follow drawn, empty candidate pool, or already
/// following. No intermediate state persists across a failed attempt.
///
/// # Errors
///
/// Propagates graph invariant violations; see [`SimulationError`].
pub fn run_follow_event(
    state: &mut SimulationState,
    actor: EntityId,
    candidate_pool: usize,
    event_time: f64,
) -> Result<bool, SimulationError> {
    let target = select_follow_target(state, candidate_pool);

    if state.config.follow.enable_unfollow_pruning {
        prune_chatty_followee(state, actor)?;
    }

    let Some(target) = target else {
        return Ok(false);
    };
    if target == actor {
        return Ok(false);
    }
    if !attempt_follow(state, actor, target)? {
        return Ok(false);
    }

    debug!(%actor, %target, time = event_time, "follow");

    let target_type = state.network.entity(target)?.entity_type();
    let followback_prob = state.entity_type_state(target_type)?.config.prob_followback;
    if state.config.follow.enable_followback && state.rng.random_bool(followback_prob) {
        let _ = run_followback(state, actor, target)?;
    }

    let follower_count = state.network.entity(target)?.followers().len() as u64;
    state
        .entity_type_state_mut(target_type)?
        .follow_ranks
        .categorize(target, follower_count);
    state.follow_ranks.categorize(target, follower_count);

    state.stats.record_follow();
    let actor_type = state.network.entity(actor)?.entity_type();
    state.entity_type_state_mut(actor_type)?.counters.record_follow();
    state
        .entity_type_state_mut(target_type)?
        .counters
        .record_follower();
    Ok(true)
}

/// Run a follow-back: the prior target follows the prior actor.
///
/// Re-ranks the prior actor (who gained the follower) in the global and
/// type-scoped groupers. Returns `Ok(false)` when the reciprocal edge
/// already existed.
///
/// # Errors
///
/// Propagates graph invariant violations.
pub fn run_followback(
    state: &mut SimulationState,
    prior_actor: EntityId,
    prior_target: EntityId,
) -> Result<bool, SimulationError> {
    if !attempt_follow(state, prior_target, prior_actor)? {
        return Ok(false);
    }
    debug!(follower = %prior_target, followee = %prior_actor, "followback");
    let actor_type = state.network.entity(prior_actor)?.entity_type();
    let follower_count = state.network.entity(prior_actor)?.followers().len() as u64;
    state
        .entity_type_state_mut(actor_type)?
        .follow_ranks
        .categorize(prior_actor, follower_count);
    state.follow_ranks.categorize(prior_actor, follower_count);
    state.stats.record_follow();
    state.stats.record_followback();
    Ok(true)
}

/// Remove the edge `unfollower -> unfollowed` from both sides.
///
/// Returns `Ok(false)` with no mutation when the edge did not exist.
///
/// # Errors
///
/// Propagates [`GraphError::UnfollowAsymmetry`] when the edge exists on
/// one side only.
///
/// [`GraphError::UnfollowAsymmetry`]: flock_graph::GraphError::UnfollowAsymmetry
pub fn unfollow(
    state: &mut SimulationState,
    unfollowed: EntityId,
    unfollower: EntityId,
) -> Result<bool, SimulationError> {
    if !state.network.remove_follow_edge(unfollowed, unfollower)? {
        return Ok(false);
    }
    debug!(%unfollowed, %unfollower, "unfollow");
    state.stats.record_unfollow();
    Ok(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use flock_types::EntityTypeId;

    use super::*;
    use crate::config::{EntityTypeConfig, FollowConfig, RankBound, SimulationConfig};

    fn base_config() -> SimulationConfig {
        SimulationConfig {
            follow: FollowConfig {
                enable_followback: false,
                ..FollowConfig::default()
            },
            ..SimulationConfig::default()
        }
    }

    fn state_with_entities(config: SimulationConfig, count: usize) -> SimulationState {
        let Ok(mut state) = SimulationState::new(config) else {
            panic!("state construction failed");
        };
        for _ in 0..count {
            if state.spawn_entity(EntityTypeId::from_index(0)).is_err() {
                panic!("spawn failed");
            }
        }
        state
    }

    fn follower_count(state: &SimulationState, id: EntityId) -> usize {
        state
            .network
            .entity(id)
            .map(|entity| entity.followers().len())
            .unwrap_or_default()
    }

    fn following_count(state: &SimulationState, id: EntityId) -> usize {
        state
            .network
            .entity(id)
            .map(|entity| entity.following().len())
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Transaction protocol
    // -----------------------------------------------------------------------

    #[test]
    fn follow_is_idempotent() {
        let mut state = state_with_entities(base_config(), 3);
        let actor = EntityId::from_index(0);
        let target = EntityId::from_index(1);
        assert_eq!(attempt_follow(&mut state, actor, target).ok(), Some(true));
        assert_eq!(attempt_follow(&mut state, actor, target).ok(), Some(false));
        assert_eq!(following_count(&state, actor), 1);
        assert_eq!(follower_count(&state, target), 1);
    }

    #[test]
    fn self_follow_is_rejected_without_mutation() {
        let mut state = state_with_entities(base_config(), 1);
        let actor = EntityId::from_index(0);
        // Pool of one entity: every draw is the actor itself.
        for _ in 0..50 {
            let result = run_follow_event(&mut state, actor, 1, 0.0);
            assert_eq!(result.ok(), Some(false));
        }
        assert_eq!(following_count(&state, actor), 0);
        assert_eq!(follower_count(&state, actor), 0);
        assert_eq!(state.stats.n_follows, 0);
    }

    #[test]
    fn empty_pool_is_a_retryable_non_event() {
        let mut state = state_with_entities(base_config(), 2);
        let actor = EntityId::from_index(0);
        assert_eq!(run_follow_event(&mut state, actor, 0, 0.0).ok(), Some(false));
        assert_eq!(state.stats.n_follows, 0);
    }

    #[test]
    fn unfollow_removes_both_sides() {
        let mut state = state_with_entities(base_config(), 2);
        let actor = EntityId::from_index(0);
        let target = EntityId::from_index(1);
        let _ = attempt_follow(&mut state, actor, target);
        assert_eq!(unfollow(&mut state, target, actor).ok(), Some(true));
        assert_eq!(following_count(&state, actor), 0);
        assert_eq!(follower_count(&state, target), 0);
        assert_eq!(state.stats.n_unfollows, 1);
        // A second unfollow of the same edge is a clean non-event.
        assert_eq!(unfollow(&mut state, target, actor).ok(), Some(false));
        assert_eq!(state.stats.n_unfollows, 1);
    }

    #[test]
    fn successful_follow_updates_both_groupers_immediately() {
        let mut config = base_config();
        // Any follower at all moves an entity out of the zero bucket, so a
        // single completed follow must be visible as a bucket migration.
        config.follow.follow_ranks = vec![RankBound::new(0, 0.5), RankBound::new(u64::MAX, 0.5)];
        let mut state = state_with_entities(config, 40);
        let actor = EntityId::from_index(0);
        let mut landed = None;
        for _ in 0..200 {
            match run_follow_event(&mut state, actor, 40, 0.0) {
                Ok(true) => {
                    landed = state.network.entity(actor).ok().and_then(|entity| {
                        entity.following().iter().next()
                    });
                    break;
                }
                Ok(false) => {}
                Err(error) => panic!("unexpected error: {error}"),
            }
        }
        let Some(target) = landed else {
            panic!("no follow landed in 200 events");
        };
        let count = follower_count(&state, target) as u64;
        let expected = state
            .follow_ranks
            .categories()
            .iter()
            .position(|bucket| count <= bucket.threshold);
        assert_eq!(state.follow_ranks.category_of(target), expected);
        let type_state = state.entity_type_state(EntityTypeId::from_index(0)).ok();
        assert_eq!(
            type_state.and_then(|s| s.follow_ranks.category_of(target)),
            expected
        );
    }

    #[test]
    fn followback_probability_one_makes_edges_reciprocal() {
        let mut config = base_config();
        config.follow.enable_followback = true;
        if let Some(entity_type) = config.entity_types.get_mut(0) {
            entity_type.prob_followback = 1.0;
        }
        let mut state = state_with_entities(config, 10);
        let actor = EntityId::from_index(0);
        let mut successes = 0_u32;
        for _ in 0..100 {
            if matches!(run_follow_event(&mut state, actor, 10, 0.0), Ok(true)) {
                successes = successes.saturating_add(1);
            }
        }
        assert!(successes > 0);
        assert_eq!(u64::from(successes), state.stats.n_followbacks);
        // Every follow was answered, so every followee follows back.
        let reciprocal = state
            .network
            .entity(actor)
            .map(|entity| {
                entity
                    .following()
                    .iter()
                    .all(|followee| entity.followers().contains(followee))
            })
            .unwrap_or_default();
        assert!(reciprocal);
        assert!(state.network.verify_symmetry().is_ok());
    }

    // -----------------------------------------------------------------------
    // Chatty pruning
    // -----------------------------------------------------------------------

    #[test]
    fn chatty_followee_is_unfollowed_before_the_new_follow() {
        let mut config = base_config();
        config.follow.enable_unfollow_pruning = true;
        let mut state = state_with_entities(config, 3);
        let actor = EntityId::from_index(0);
        let chatty = EntityId::from_index(1);
        // The first followee of a fresh actor is always flagged chatty
        // (any positive constant exceeds twice the zero average).
        let _ = attempt_follow(&mut state, actor, chatty);
        assert_eq!(
            state
                .network
                .entity(actor)
                .ok()
                .map(|e| e.chatty_followees().to_vec()),
            Some(vec![chatty])
        );

        // Force the next draw to be a self-follow (pool of one) so the
        // only mutation is the pruning itself.
        let result = run_follow_event(&mut state, actor, 1, 0.0);
        assert_eq!(result.ok(), Some(false));
        assert_eq!(following_count(&state, actor), 0);
        assert_eq!(follower_count(&state, chatty), 0);
        assert_eq!(state.stats.n_unfollows, 1);
        assert_eq!(
            state
                .network
                .entity(actor)
                .ok()
                .map(|e| e.chatty_followees().len()),
            Some(0)
        );
        assert!(state.network.verify_symmetry().is_ok());
    }

    // -----------------------------------------------------------------------
    // Policies
    // -----------------------------------------------------------------------

    #[test]
    fn bucket_landing_follows_weighted_population() {
        // Two buckets, 10 vs 90 members, equal configured probability:
        // expected landing on the small bucket is 0.5*10 / (0.5*10 + 0.5*90) = 0.1.
        let mut config = base_config();
        config.follow.model = FollowModel::Preferential;
        config.follow.follow_ranks = vec![RankBound::new(0, 0.5), RankBound::new(u64::MAX, 0.5)];
        let mut state = state_with_entities(config, 100);
        // Rank 90 entities into the second bucket.
        for index in 10..100 {
            state.follow_ranks.categorize(EntityId::from_index(index), 1);
        }

        let draws = 50_000_u32;
        let mut small_bucket = 0_u32;
        for _ in 0..draws {
            if let Some(target) = select_follow_target(&mut state, 100) {
                if state.follow_ranks.category_of(target) == Some(0) {
                    small_bucket = small_bucket.saturating_add(1);
                }
            }
        }
        let frequency = f64::from(small_bucket) / f64::from(draws);
        assert!(
            (frequency - 0.1).abs() < 0.01,
            "small bucket landed with frequency {frequency}"
        );
    }

    #[test]
    fn barabasi_weights_bias_toward_heavier_buckets() {
        let mut config = base_config();
        config.follow.model = FollowModel::PreferentialBarabasi;
        config.follow.follow_ranks = vec![RankBound::new(0, 0.5), RankBound::new(u64::MAX, 0.5)];
        // Barabási weight 9:1 against equal populations.
        config.follow.barabasi_weights = vec![1.0, 9.0];
        let mut state = state_with_entities(config, 100);
        for index in 50..100 {
            state.follow_ranks.categorize(EntityId::from_index(index), 1);
        }

        let draws = 50_000_u32;
        let mut heavy_bucket = 0_u32;
        for _ in 0..draws {
            if let Some(target) = select_follow_target(&mut state, 100) {
                if state.follow_ranks.category_of(target) == Some(1) {
                    heavy_bucket = heavy_bucket.saturating_add(1);
                }
            }
        }
        let frequency = f64::from(heavy_bucket) / f64::from(draws);
        assert!(
            (frequency - 0.9).abs() < 0.01,
            "heavy bucket landed with frequency {frequency}"
        );
    }

    #[test]
    fn policies_return_none_on_an_empty_network() {
        for model in [
            FollowModel::Random,
            FollowModel::PreferentialBarabasi,
            FollowModel::Preferential,
            FollowModel::EntityClass,
            FollowModel::PreferentialEntityClass,
            FollowModel::Twitter,
        ] {
            let mut config = base_config();
            config.follow.model = model;
            let mut state = state_with_entities(config, 0);
            assert_eq!(
                select_follow_target(&mut state, 0),
                None,
                "model {model:?} found a target in an empty network"
            );
        }
    }

    #[test]
    fn entity_class_policy_only_picks_members_of_landing_classes() {
        let mut config = base_config();
        config.follow.model = FollowModel::EntityClass;
        config.entity_types = vec![
            EntityTypeConfig {
                name: "casual".to_owned(),
                prob_follow: 0.8,
                ..EntityTypeConfig::default()
            },
            EntityTypeConfig {
                name: "celebrity".to_owned(),
                prob_follow: 0.2,
                ..EntityTypeConfig::default()
            },
        ];
        let Ok(mut state) = SimulationState::new(config) else {
            panic!("state construction failed");
        };
        // Only the celebrity class has members; the casual landings skip
        // onward and the walk must still find celebrities 20% of the time.
        for _ in 0..10 {
            if state.spawn_entity(EntityTypeId::from_index(1)).is_err() {
                panic!("spawn failed");
            }
        }
        let draws = 20_000_u32;
        let mut hits = 0_u32;
        for _ in 0..draws {
            if select_follow_target(&mut state, 10).is_some() {
                hits = hits.saturating_add(1);
            }
        }
        let frequency = f64::from(hits) / f64::from(draws);
        assert!(
            (frequency - 0.2).abs() < 0.02,
            "celebrity class landed with frequency {frequency}"
        );
    }

    // -----------------------------------------------------------------------
    // Scenario and determinism
    // -----------------------------------------------------------------------

    #[test]
    fn uniform_scenario_preserves_symmetry_and_counts() {
        let mut state = state_with_entities(base_config(), 100);
        let mut successes = 0_u64;
        for event in 0..1_000_usize {
            let actor = EntityId::from_index(event % 100);
            match run_follow_event(&mut state, actor, 100, event as f64) {
                Ok(true) => successes = successes.saturating_add(1),
                Ok(false) => {}
                Err(error) => panic!("unexpected error: {error}"),
            }
        }
        assert!(successes > 0);
        assert_eq!(state.stats.n_follows, successes);
        assert!(state.network.verify_symmetry().is_ok());
    }

    #[test]
    fn identical_seeds_replay_identical_runs() {
        let run = || {
            let mut state = state_with_entities(base_config(), 50);
            for event in 0..500_usize {
                let actor = EntityId::from_index(event % 50);
                if let Err(error) = run_follow_event(&mut state, actor, 50, event as f64) {
                    panic!("unexpected error: {error}");
                }
            }
            state.stats
        };
        assert_eq!(run(), run());
    }
}
