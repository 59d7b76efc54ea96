use hashbrown::HashMap;

use crate::interactions::ItemIdx;
use crate::itemknn::neighbors::NeighborIndex;
use crate::itemknn::ScoredItem;

/// Sums neighbor weights reachable from the `seen` items (sorted) through `propagation`.
/// Seen items and non-finite sums never become candidates.
pub fn score_candidates(
    seen: &[ItemIdx],
    propagation: &NeighborIndex,
    item_order: &[u32],
) -> Vec<ScoredItem> {
    let mut item_scores: HashMap<ItemIdx, f64> = HashMap::with_capacity(seen.len() * 16);
    for item in seen.iter() {
        if *item as usize >= propagation.num_items() {
            continue;
        }
        for neighbor in propagation.neighbors(*item) {
            if seen.binary_search(&neighbor.item).is_ok() {
                continue;
            }
            *item_scores.entry(neighbor.item).or_insert(0.0) += neighbor.weight;
        }
    }

    item_scores
        .into_iter()
        .filter(|(_, score)| score.is_finite())
        .map(|(item, score)| ScoredItem::new(item, item_order[item as usize], score))
        .collect()
}

/// Top `how_many` candidates by (score desc, external order asc). Only the selected
/// prefix is fully sorted.
pub fn rank_candidates(mut candidates: Vec<ScoredItem>, how_many: usize) -> Vec<ScoredItem> {
    if how_many == 0 {
        return Vec::new();
    }
    if candidates.len() > how_many {
        candidates.select_nth_unstable_by(how_many - 1, |a, b| b.cmp(a));
        candidates.truncate(how_many);
    }
    candidates.sort_unstable_by(|a, b| b.cmp(a));
    candidates
}
