use std::cmp::Ordering;
use std::time::Instant;

use log::{debug, info};

use crate::interactions::{InteractionStore, ItemIdx, UserIdx};
use crate::itemknn::cooccurrence::CoOccurrence;
use crate::itemknn::neighbors::NeighborIndex;
use crate::itemknn::popularity::PopularityRanking;
use crate::itemknn::similarity::{build_similarity, Propagation, SimilarityStrategy};

pub mod cooccurrence;
pub mod neighbors;
pub mod popularity;
pub mod scorer;
pub mod similarity;
pub mod sparse;
pub mod topk;

/// Floor for denominators that may be zero (item supports, neighbor weight sums).
pub const EPSILON: f64 = 1e-12;

pub const DEFAULT_K_NEIGHBORS: usize = 10;
pub const DEFAULT_TOP_N: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelParams {
    /// Neighbors retained per item.
    pub k_neighbors: usize,
    /// Length of every recommendation list.
    pub top_n: usize,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            k_neighbors: DEFAULT_K_NEIGHBORS,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// An item with a score. Greater means stronger: a higher `key` wins and equal keys
/// go to the item that comes first in external identifier order.
#[derive(Debug, Clone, Copy)]
pub struct ScoredItem {
    pub item: ItemIdx,
    pub order: u32,
    pub score: f64,
    key: f64,
}

impl ScoredItem {
    pub fn new(item: ItemIdx, order: u32, score: f64) -> Self {
        ScoredItem::with_key(item, order, score, score)
    }

    pub fn with_key(item: ItemIdx, order: u32, score: f64, key: f64) -> Self {
        ScoredItem {
            item,
            order,
            score,
            key,
        }
    }

    /// Same ordering as `Ord`, but on the raw score instead of the selection key.
    pub fn by_score(a: &ScoredItem, b: &ScoredItem) -> Ordering {
        match a.score.partial_cmp(&b.score) {
            Some(Ordering::Equal) | None => b.order.cmp(&a.order),
            Some(ordering) => ordering,
        }
    }
}

impl PartialEq for ScoredItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.key.partial_cmp(&other.key) {
            Some(Ordering::Equal) | None => other.order.cmp(&self.order),
            Some(ordering) => ordering,
        }
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pruned item neighborhoods plus everything needed to recommend for any set of seen items.
pub struct ItemKnnIndex {
    strategy_name: &'static str,
    params: ModelParams,
    neighbors: NeighborIndex,
    propagation: Option<NeighborIndex>,
    popularity: PopularityRanking,
    item_order: Vec<u32>,
}

impl ItemKnnIndex {
    /// Aggregates co-occurrences, scores and prunes them into neighbor lists and, for
    /// normalizing strategies, rescales the lists to sum to one.
    pub fn build(
        store: &InteractionStore,
        strategy: &dyn SimilarityStrategy,
        params: ModelParams,
    ) -> Self {
        let start_time = Instant::now();
        info!(
            "building {} index over {} users, {} items (k={}, n={})",
            strategy.name(),
            store.num_users(),
            store.num_items(),
            params.k_neighbors,
            params.top_n
        );

        let cooccurrence = if strategy.requires_cooccurrence_matrix() {
            CoOccurrence::matrix(store)
        } else {
            CoOccurrence::pairwise(store)
        };
        let similarity = build_similarity(&cooccurrence, store.item_support(), strategy);
        drop(cooccurrence);

        let mut neighbors =
            NeighborIndex::prune(&similarity, params.k_neighbors, strategy, store.item_order());
        drop(similarity);
        if strategy.normalizes_neighbors() {
            neighbors.normalize();
            debug!("normalized neighbor lists to unit sums");
        }

        let propagation = match strategy.propagation() {
            Propagation::Forward => None,
            Propagation::Transposed => Some(neighbors.transpose()),
        };
        let popularity = PopularityRanking::new(store.item_support(), store.item_order());

        info!(
            "{} index built in {} micros",
            strategy.name(),
            start_time.elapsed().as_micros()
        );

        ItemKnnIndex {
            strategy_name: strategy.name(),
            params,
            neighbors,
            propagation,
            popularity,
            item_order: store.item_order().to_vec(),
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy_name
    }

    pub fn params(&self) -> ModelParams {
        self.params
    }

    pub fn neighbors(&self) -> &NeighborIndex {
        &self.neighbors
    }

    pub fn popularity(&self) -> &PopularityRanking {
        &self.popularity
    }

    /// Similarity-driven candidates ranked by (score desc, external order asc), at most
    /// `top_n` of them. `seen` must be sorted.
    pub fn ranked_candidates(&self, seen: &[ItemIdx]) -> Vec<ScoredItem> {
        let propagation = self.propagation.as_ref().unwrap_or(&self.neighbors);
        let candidates = scorer::score_candidates(seen, propagation, &self.item_order);
        scorer::rank_candidates(candidates, self.params.top_n)
    }

    /// Ranked candidates followed by the popularity backfill, in that order.
    pub fn recommend_ranked(&self, seen: &[ItemIdx]) -> Vec<ItemIdx> {
        let mut recommendations: Vec<ItemIdx> = self
            .ranked_candidates(seen)
            .into_iter()
            .map(|scored| scored.item)
            .collect();
        self.popularity
            .backfill(&mut recommendations, seen, self.params.top_n);
        recommendations
    }

    /// Final list for `seen`, sorted by external identifier ascending.
    pub fn recommend(&self, seen: &[ItemIdx]) -> Vec<ItemIdx> {
        let mut recommendations = self.recommend_ranked(seen);
        recommendations.sort_unstable_by_key(|item| self.item_order[*item as usize]);
        recommendations
    }

    pub fn recommend_for_user(&self, store: &InteractionStore, user: UserIdx) -> Vec<ItemIdx> {
        self.recommend(store.items_for_user(user))
    }

    /// Recommendations for every user of the store, indexed by user.
    pub fn recommend_all(&self, store: &InteractionStore) -> Vec<Vec<ItemIdx>> {
        (0..store.num_users() as UserIdx)
            .map(|user| self.recommend_for_user(store, user))
            .collect()
    }
}
