//! Adaptive membership set for follow relations.
//!
//! Every entity carries two of these sets (`following` and `followers`).
//! The degree distribution of a social graph is heavily skewed: most
//! entities hold a handful of relations while a few hold tens of
//! thousands. [`MembershipSet`] adapts its representation to that skew:
//!
//! - Below [`PROMOTION_THRESHOLD`] members it is a compact unordered
//!   vector. Membership tests and erasure are linear scans, which is the
//!   fastest option at these sizes and allocates nothing beyond the vector.
//! - At the threshold it promotes once to a hashed representation: a dense
//!   member vector paired with a member-to-slot map, giving amortized O(1)
//!   insert, erase, and membership.
//!
//! Promotion is one-directional. Relation counts in this domain are
//! monotonically non-decreasing on average, so demotion would thrash.
//!
//! Uniform random picks index into the dense member vector in both
//! representations. The slot map is only ever consulted for lookups, never
//! iterated, so hash ordering cannot influence sampling and a fixed RNG
//! seed reproduces the same pick sequence exactly.

use std::collections::HashMap;

use rand::Rng;

use flock_types::EntityId;

/// Compact-to-hashed promotion threshold, in members.
pub const PROMOTION_THRESHOLD: usize = 128;

/// A set of entity ids with set semantics and uniform random picks.
///
/// All operations are total: there are no error states, and the only
/// failure-shaped result is [`pick_random`] returning `None` on an empty
/// set. "No entity" is unrepresentable here -- the element type is a plain
/// [`EntityId`], so the caller can never insert a sentinel.
///
/// [`pick_random`]: MembershipSet::pick_random
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipSet {
    /// Unordered compact vector; linear scans, no auxiliary allocation.
    Compact(Vec<EntityId>),
    /// Dense member vector plus member-to-slot index for O(1) operations.
    Hashed {
        /// Members in slot order. Uniform picks index into this vector.
        members: Vec<EntityId>,
        /// Maps each member to its slot in `members`.
        slots: HashMap<EntityId, usize>,
    },
}

impl MembershipSet {
    /// Create an empty set in the compact representation.
    pub const fn new() -> Self {
        Self::Compact(Vec::new())
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members().len()
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    /// Whether the set has promoted to the hashed representation.
    pub const fn is_promoted(&self) -> bool {
        matches!(self, Self::Hashed { .. })
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: EntityId) -> bool {
        match self {
            Self::Compact(members) => members.iter().any(|member| *member == id),
            Self::Hashed { slots, .. } => slots.contains_key(&id),
        }
    }

    /// Insert `id`, returning `true` iff it was not already present.
    pub fn insert(&mut self, id: EntityId) -> bool {
        self.promote_if_due();
        match self {
            Self::Compact(members) => {
                if members.iter().any(|member| *member == id) {
                    return false;
                }
                members.push(id);
                true
            }
            Self::Hashed { members, slots } => {
                if slots.contains_key(&id) {
                    return false;
                }
                let slot = members.len();
                members.push(id);
                slots.insert(id, slot);
                true
            }
        }
    }

    /// Erase `id`, returning `true` iff it was present.
    pub fn erase(&mut self, id: EntityId) -> bool {
        match self {
            Self::Compact(members) => {
                let Some(position) = members.iter().position(|member| *member == id) else {
                    return false;
                };
                members.swap_remove(position);
                true
            }
            Self::Hashed { members, slots } => {
                let Some(slot) = slots.remove(&id) else {
                    return false;
                };
                members.swap_remove(slot);
                // The member that filled the vacated slot needs its index
                // updated, unless we removed the tail.
                if let Some(moved) = members.get(slot).copied() {
                    slots.insert(moved, slot);
                }
                true
            }
        }
    }

    /// Draw a member uniformly at random, or `None` if the set is empty.
    ///
    /// Picks by dense slot index in both representations, so every live
    /// member has exactly `1 / len` probability and the draw consumes a
    /// single RNG advance.
    pub fn pick_random(&self, rng: &mut impl Rng) -> Option<EntityId> {
        let members = self.members();
        if members.is_empty() {
            return None;
        }
        members.get(rng.random_range(0..members.len())).copied()
    }

    /// Iterate over the members. Finite and restartable; order is the
    /// internal slot order and carries no meaning.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members().iter().copied()
    }

    /// The dense member vector backing both representations.
    fn members(&self) -> &[EntityId] {
        match self {
            Self::Compact(members) | Self::Hashed { members, .. } => members,
        }
    }

    /// Promote to the hashed representation once the compact vector has
    /// reached the threshold. One-directional: a promoted set never
    /// returns to the compact form.
    fn promote_if_due(&mut self) {
        let Self::Compact(members) = self else {
            return;
        };
        if members.len() < PROMOTION_THRESHOLD {
            return;
        }
        let members = std::mem::take(members);
        let slots = members
            .iter()
            .enumerate()
            .map(|(slot, member)| (*member, slot))
            .collect();
        tracing::trace!(members = members.len(), "membership set promoted");
        *self = Self::Hashed { members, slots };
    }
}

impl Default for MembershipSet {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn id(index: usize) -> EntityId {
        EntityId::from_index(index)
    }

    fn set_of(count: usize) -> MembershipSet {
        let mut set = MembershipSet::new();
        for index in 0..count {
            assert!(set.insert(id(index)));
        }
        set
    }

    // -----------------------------------------------------------------------
    // Basic set semantics
    // -----------------------------------------------------------------------

    #[test]
    fn insert_reports_novelty() {
        let mut set = MembershipSet::new();
        assert!(set.insert(id(1)));
        assert!(!set.insert(id(1)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn erase_reports_presence() {
        let mut set = set_of(3);
        assert!(set.erase(id(1)));
        assert!(!set.erase(id(1)));
        assert!(!set.contains(id(1)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn contains_tracks_membership() {
        let mut set = MembershipSet::new();
        assert!(!set.contains(id(5)));
        set.insert(id(5));
        assert!(set.contains(id(5)));
    }

    #[test]
    fn iter_is_finite_and_restartable() {
        let set = set_of(4);
        let first: Vec<EntityId> = set.iter().collect();
        let second: Vec<EntityId> = set.iter().collect();
        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
    }

    // -----------------------------------------------------------------------
    // Promotion
    // -----------------------------------------------------------------------

    #[test]
    fn promotion_preserves_all_members() {
        let count = PROMOTION_THRESHOLD.saturating_mul(2);
        let set = set_of(count);
        assert!(set.is_promoted());
        assert_eq!(set.len(), count);
        for index in 0..count {
            assert!(set.contains(id(index)), "missing member {index}");
        }
        assert!(!set.contains(id(count)));
        assert!(!set.contains(id(count.saturating_add(1000))));
    }

    #[test]
    fn small_set_stays_compact() {
        let set = set_of(PROMOTION_THRESHOLD.saturating_sub(1));
        assert!(!set.is_promoted());
    }

    #[test]
    fn promotion_is_one_directional() {
        let mut set = set_of(PROMOTION_THRESHOLD.saturating_add(8));
        assert!(set.is_promoted());
        // Erase well below the threshold; the representation must not demote.
        for index in 0..PROMOTION_THRESHOLD {
            set.erase(id(index));
        }
        assert!(set.is_promoted());
        assert_eq!(set.len(), 8);
    }

    #[test]
    fn hashed_erase_keeps_slot_index_consistent() {
        let count = PROMOTION_THRESHOLD.saturating_add(20);
        let mut set = set_of(count);
        // Erase every third member, then verify the survivors.
        for index in (0..count).step_by(3) {
            assert!(set.erase(id(index)));
        }
        for index in 0..count {
            let expect = index % 3 != 0;
            assert_eq!(set.contains(id(index)), expect, "member {index}");
            // A second erase must agree with contains.
            assert_eq!(set.erase(id(index)), expect);
        }
        assert!(set.is_empty());
    }

    // -----------------------------------------------------------------------
    // Uniform random pick
    // -----------------------------------------------------------------------

    #[test]
    fn pick_on_empty_set_is_none() {
        let set = MembershipSet::new();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(set.pick_random(&mut rng), None);
    }

    #[test]
    fn pick_only_returns_live_members() {
        let mut set = set_of(PROMOTION_THRESHOLD.saturating_add(50));
        for index in 0..PROMOTION_THRESHOLD {
            set.erase(id(index));
        }
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let picked = set.pick_random(&mut rng);
            assert!(picked.is_some(), "pick failed on a non-empty set");
            if let Some(member) = picked {
                assert!(set.contains(member));
            }
        }
    }

    #[test]
    fn pick_is_uniform_over_ten_members() {
        let set = set_of(10);
        let mut rng = SmallRng::seed_from_u64(42);
        let draws = 100_000_u32;
        let mut counts = vec![0_u32; 10];
        for _ in 0..draws {
            if let Some(picked) = set.pick_random(&mut rng) {
                if let Some(count) = counts.get_mut(picked.index()) {
                    *count = count.saturating_add(1);
                }
            }
        }
        for (index, count) in counts.iter().enumerate() {
            let frequency = f64::from(*count) / f64::from(draws);
            assert!(
                (frequency - 0.1).abs() < 0.01,
                "member {index} drawn with frequency {frequency}"
            );
        }
    }

    #[test]
    fn pick_sequence_is_reproducible_for_a_fixed_seed() {
        let set = set_of(PROMOTION_THRESHOLD.saturating_add(13));
        let mut rng_a = SmallRng::seed_from_u64(99);
        let mut rng_b = SmallRng::seed_from_u64(99);
        let picks_a: Vec<Option<EntityId>> =
            (0..256).map(|_| set.pick_random(&mut rng_a)).collect();
        let picks_b: Vec<Option<EntityId>> =
            (0..256).map(|_| set.pick_random(&mut rng_b)).collect();
        assert_eq!(picks_a, picks_b);
    }
}
