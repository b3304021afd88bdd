//! Rank categorization of entities for bucket-weighted sampling.
//!
//! A [`CategoryGrouper`] partitions the entities it tracks into an ordered
//! sequence of buckets by a scalar rank metric (follower count, tweet
//! count, age). Buckets are the unit of weighted sampling: the follow
//! engine walks the bucket sequence with each bucket's configured
//! probability scaled by its population, then draws uniformly within the
//! landed bucket. Sampling at bucket granularity instead of per entity
//! turns an O(n) draw into an O(#buckets) one.
//!
//! Several independent groupers (the global follow ranks plus one private
//! grouper per entity class) may track the same entity; each owns its own
//! placement for that entity and they never interfere.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use flock_types::EntityId;

/// One rank bucket: the entities whose metric falls in its range, plus the
/// bucket's configured sampling probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntityList {
    /// Upper bound (inclusive) of the metric range this bucket covers.
    /// The final bucket additionally absorbs every metric beyond it.
    pub threshold: u64,
    /// Configured sampling probability mass for this bucket.
    pub prob: f64,
    /// Members currently ranked into this bucket.
    members: Vec<EntityId>,
}

impl CategoryEntityList {
    /// Create an empty bucket covering metrics up to `threshold`.
    pub const fn new(threshold: u64, prob: f64) -> Self {
        Self {
            threshold,
            prob,
            members: Vec::new(),
        }
    }

    /// Members currently ranked into this bucket, in slot order.
    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    /// Number of members in this bucket.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Where a tracked entity currently sits inside a grouper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Placement {
    /// Index of the bucket holding the entity.
    category: usize,
    /// The entity's slot inside that bucket's member vector.
    slot: usize,
}

/// Partitions tracked entities into rank buckets.
///
/// Invariant: after every [`categorize`] call, a tracked entity appears in
/// exactly one bucket, the one selected by the monotonic threshold mapping
/// for its most recently reported metric.
///
/// [`categorize`]: CategoryGrouper::categorize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGrouper {
    /// Ordered bucket sequence; the walk order for weighted sampling.
    categories: Vec<CategoryEntityList>,
    /// Current placement of every tracked entity.
    placements: BTreeMap<EntityId, Placement>,
}

impl CategoryGrouper {
    /// Create a grouper from ascending `(threshold, probability)` pairs.
    ///
    /// An empty bound list collapses to a single catch-all bucket so the
    /// grouper stays total.
    pub fn from_bounds(bounds: &[(u64, f64)]) -> Self {
        let categories = if bounds.is_empty() {
            vec![CategoryEntityList::new(u64::MAX, 1.0)]
        } else {
            bounds
                .iter()
                .map(|(threshold, prob)| CategoryEntityList::new(*threshold, *prob))
                .collect()
        };
        Self {
            categories,
            placements: BTreeMap::new(),
        }
    }

    /// The ordered bucket sequence, exposed for weighted sampling walks.
    pub fn categories(&self) -> &[CategoryEntityList] {
        &self.categories
    }

    /// Number of entities currently tracked by this grouper.
    pub fn tracked_count(&self) -> usize {
        self.placements.len()
    }

    /// Index of the bucket currently holding `id`, if tracked.
    pub fn category_of(&self, id: EntityId) -> Option<usize> {
        self.placements.get(&id).map(|placement| placement.category)
    }

    /// Rank `id` by `metric`, moving it between buckets if needed.
    ///
    /// The target bucket is the first whose threshold covers the metric;
    /// metrics beyond every threshold land in the final bucket. If the
    /// entity already sits in the target bucket this is a no-op.
    pub fn categorize(&mut self, id: EntityId, metric: u64) {
        let target = self.bucket_index_for(metric);
        match self.placements.get(&id).copied() {
            Some(placement) if placement.category == target => {}
            Some(placement) => {
                self.remove_from_bucket(placement);
                self.push_into_bucket(id, target);
            }
            None => self.push_into_bucket(id, target),
        }
    }

    /// First bucket whose threshold covers `metric`; the last bucket is
    /// the catch-all.
    fn bucket_index_for(&self, metric: u64) -> usize {
        self.categories
            .iter()
            .position(|category| metric <= category.threshold)
            .unwrap_or_else(|| self.categories.len().saturating_sub(1))
    }

    fn push_into_bucket(&mut self, id: EntityId, category: usize) {
        if let Some(bucket) = self.categories.get_mut(category) {
            let slot = bucket.members.len();
            bucket.members.push(id);
            self.placements.insert(id, Placement { category, slot });
        }
    }

    fn remove_from_bucket(&mut self, placement: Placement) {
        let Some(bucket) = self.categories.get_mut(placement.category) else {
            return;
        };
        bucket.members.swap_remove(placement.slot);
        // Re-index the member that filled the vacated slot, if any.
        if let Some(moved) = bucket.members.get(placement.slot).copied() {
            self.placements.insert(
                moved,
                Placement {
                    category: placement.category,
                    slot: placement.slot,
                },
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: usize) -> EntityId {
        EntityId::from_index(index)
    }

    fn follow_ranks() -> CategoryGrouper {
        CategoryGrouper::from_bounds(&[(10, 0.5), (100, 0.3), (u64::MAX, 0.2)])
    }

    #[test]
    fn categorize_places_entity_in_exactly_one_bucket() {
        let mut grouper = follow_ranks();
        grouper.categorize(id(1), 5);
        assert_eq!(grouper.category_of(id(1)), Some(0));
        let appearances: usize = grouper
            .categories()
            .iter()
            .map(|bucket| bucket.members().iter().filter(|m| **m == id(1)).count())
            .sum();
        assert_eq!(appearances, 1);
    }

    #[test]
    fn metric_growth_migrates_between_buckets() {
        let mut grouper = follow_ranks();
        grouper.categorize(id(1), 3);
        assert_eq!(grouper.category_of(id(1)), Some(0));
        grouper.categorize(id(1), 50);
        assert_eq!(grouper.category_of(id(1)), Some(1));
        grouper.categorize(id(1), 5_000);
        assert_eq!(grouper.category_of(id(1)), Some(2));
        let appearances: usize = grouper
            .categories()
            .iter()
            .map(|bucket| bucket.members().iter().filter(|m| **m == id(1)).count())
            .sum();
        assert_eq!(appearances, 1);
    }

    #[test]
    fn recategorize_to_same_bucket_is_a_noop() {
        let mut grouper = follow_ranks();
        grouper.categorize(id(1), 2);
        grouper.categorize(id(2), 4);
        grouper.categorize(id(1), 7);
        assert_eq!(grouper.category_of(id(1)), Some(0));
        assert_eq!(grouper.category_of(id(2)), Some(0));
        let first = grouper.categories().first();
        assert_eq!(first.map(CategoryEntityList::len), Some(2));
    }

    #[test]
    fn boundary_metric_lands_in_lower_bucket() {
        let mut grouper = follow_ranks();
        grouper.categorize(id(1), 10);
        assert_eq!(grouper.category_of(id(1)), Some(0));
        grouper.categorize(id(2), 11);
        assert_eq!(grouper.category_of(id(2)), Some(1));
    }

    #[test]
    fn final_bucket_absorbs_out_of_range_metrics() {
        let mut grouper = CategoryGrouper::from_bounds(&[(10, 0.5), (100, 0.5)]);
        grouper.categorize(id(1), 1_000_000);
        assert_eq!(grouper.category_of(id(1)), Some(1));
    }

    #[test]
    fn empty_bounds_collapse_to_catch_all() {
        let mut grouper = CategoryGrouper::from_bounds(&[]);
        grouper.categorize(id(1), 0);
        grouper.categorize(id(2), u64::MAX);
        assert_eq!(grouper.category_of(id(1)), Some(0));
        assert_eq!(grouper.category_of(id(2)), Some(0));
        assert_eq!(grouper.categories().len(), 1);
    }

    #[test]
    fn swap_removal_keeps_displaced_placements_consistent() {
        let mut grouper = follow_ranks();
        // Fill bucket 0 with several members, then migrate the first one
        // out; the displaced tail member must stay correctly tracked.
        for index in 0..6 {
            grouper.categorize(id(index), 1);
        }
        grouper.categorize(id(0), 50);
        for index in 1..6 {
            assert_eq!(grouper.category_of(id(index)), Some(0), "member {index}");
        }
        // Migrate everyone else and confirm the bucket empties cleanly.
        for index in 1..6 {
            grouper.categorize(id(index), 50);
        }
        let first = grouper.categories().first();
        assert_eq!(first.map(CategoryEntityList::is_empty), Some(true));
        assert_eq!(grouper.tracked_count(), 6);
    }

    #[test]
    fn independent_groupers_do_not_interfere() {
        let mut global = follow_ranks();
        let mut per_type = CategoryGrouper::from_bounds(&[(50, 1.0), (u64::MAX, 1.0)]);
        global.categorize(id(1), 75);
        per_type.categorize(id(1), 75);
        assert_eq!(global.category_of(id(1)), Some(1));
        assert_eq!(per_type.category_of(id(1)), Some(1));
        global.categorize(id(1), 5);
        assert_eq!(global.category_of(id(1)), Some(0));
        // The per-type placement is untouched by the global move.
        assert_eq!(per_type.category_of(id(1)), Some(1));
    }
}
