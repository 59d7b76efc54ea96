use std::time::Instant;

use log::info;

use crate::interactions::ItemIdx;
use crate::itemknn::similarity::SimilarityStrategy;
use crate::itemknn::sparse::CsrMatrix;
use crate::itemknn::topk::BoundedTopK;
use crate::itemknn::{ScoredItem, EPSILON};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub item: ItemIdx,
    pub weight: f64,
}

/// Per-item neighbor lists stored back to back in one arena.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborIndex {
    offsets: Vec<usize>,
    entries: Vec<Neighbor>,
}

impl NeighborIndex {
    /// Keeps the `k` strongest entries of every similarity row, ranked by the strategy's
    /// selection key. Each retained list is stored by (score desc, neighbor order asc).
    pub fn prune(
        similarity: &CsrMatrix<f64>,
        k: usize,
        strategy: &dyn SimilarityStrategy,
        item_order: &[u32],
    ) -> Self {
        let start_time = Instant::now();
        let num_items = similarity.n_rows();
        let mut offsets = Vec::with_capacity(num_items + 1);
        let mut entries = Vec::with_capacity(num_items * k.min(16));
        offsets.push(0);

        for item in 0..num_items {
            let mut top_k = BoundedTopK::new(k);
            for (other, score) in similarity.row_iter(item) {
                if other as usize == item || !score.is_finite() {
                    continue;
                }
                let key = strategy.selection_key(score);
                top_k.push(ScoredItem::with_key(other, item_order[other as usize], score, key));
            }
            let mut retained = top_k.into_sorted_vec();
            retained.sort_unstable_by(|a, b| ScoredItem::by_score(b, a));
            entries.extend(retained.into_iter().map(|scored| Neighbor {
                item: scored.item,
                weight: scored.score,
            }));
            offsets.push(entries.len());
        }

        info!(
            "pruned to {} neighbors (k={}) in {} micros",
            entries.len(),
            k,
            start_time.elapsed().as_micros()
        );
        NeighborIndex { offsets, entries }
    }

    /// Rescales every list so its weights sum to one. An all-zero list divides by a
    /// negligible epsilon instead.
    pub fn normalize(&mut self) {
        for item in 0..self.num_items() {
            let (start, end) = (self.offsets[item], self.offsets[item + 1]);
            let list = &mut self.entries[start..end];
            let sum: f64 = list.iter().map(|neighbor| neighbor.weight).sum();
            let denominator = if sum == 0.0 { EPSILON } else { sum };
            for neighbor in list.iter_mut() {
                neighbor.weight /= denominator;
            }
        }
    }

    /// Index in which item `i` lists every item `j` that has `i` as a neighbor, with the
    /// weight `j` assigned to `i`. Lists are ordered by `j`.
    pub fn transpose(&self) -> NeighborIndex {
        let num_items = self.num_items();
        let mut offsets = vec![0_usize; num_items + 1];
        for neighbor in self.entries.iter() {
            offsets[neighbor.item as usize + 1] += 1;
        }
        for item in 0..num_items {
            offsets[item + 1] += offsets[item];
        }
        let mut next = offsets.clone();
        let mut entries = vec![
            Neighbor {
                item: 0,
                weight: 0.0
            };
            self.entries.len()
        ];
        for item in 0..num_items {
            for neighbor in self.neighbors(item as ItemIdx) {
                let slot = next[neighbor.item as usize];
                entries[slot] = Neighbor {
                    item: item as ItemIdx,
                    weight: neighbor.weight,
                };
                next[neighbor.item as usize] += 1;
            }
        }
        NeighborIndex { offsets, entries }
    }

    pub fn neighbors(&self, item: ItemIdx) -> &[Neighbor] {
        let item = item as usize;
        &self.entries[self.offsets[item]..self.offsets[item + 1]]
    }

    pub fn num_items(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod neighbors_test {
    use super::*;
    use crate::itemknn::similarity::{Cosine, Jaccard};
    use float_cmp::approx_eq;

    fn similarity() -> CsrMatrix<f64> {
        // item 0 has five neighbors, two of them tied
        CsrMatrix::from_triplets(
            6,
            6,
            vec![
                (0, 1, 0.2),
                (0, 2, 0.9),
                (0, 3, 0.5),
                (0, 4, 0.5),
                (0, 5, 0.1),
                (1, 0, 0.2),
                (2, 0, 0.9),
                (3, 0, 0.5),
                (4, 0, 0.5),
                (5, 0, 0.1),
            ],
        )
    }

    #[test]
    fn should_keep_k_strongest_in_deterministic_order() {
        let order: Vec<u32> = (0..6).collect();
        let index = NeighborIndex::prune(&similarity(), 3, &Jaccard, &order);
        let kept: Vec<u32> = index.neighbors(0).iter().map(|n| n.item).collect();
        assert_eq!(vec![2, 3, 4], kept);
        assert_eq!(1, index.neighbors(5).len());
        assert_eq!(8, index.num_entries());
    }

    #[test]
    fn should_break_ties_by_external_order() {
        // item 4 sorts before item 3 externally
        let order: Vec<u32> = vec![0, 1, 2, 4, 3, 5];
        let index = NeighborIndex::prune(&similarity(), 2, &Jaccard, &order);
        let kept: Vec<u32> = index.neighbors(0).iter().map(|n| n.item).collect();
        assert_eq!(vec![2, 4], kept);
    }

    #[test]
    fn should_normalize_to_one() {
        let order: Vec<u32> = (0..6).collect();
        let mut index = NeighborIndex::prune(&similarity(), 10, &Cosine, &order);
        index.normalize();
        for item in 0..6 {
            let sum: f64 = index.neighbors(item).iter().map(|n| n.weight).sum();
            assert!(approx_eq!(f64, 1.0, sum, epsilon = 1e-9));
        }
    }

    #[test]
    fn should_tolerate_empty_lists_when_normalizing() {
        let empty: CsrMatrix<f64> = CsrMatrix::from_triplets(2, 2, vec![]);
        let mut index = NeighborIndex::prune(&empty, 10, &Cosine, &[0, 1]);
        index.normalize();
        assert!(index.neighbors(0).is_empty());
        assert_eq!(2, index.num_items());
    }

    #[test]
    fn should_transpose_neighbor_lists() {
        let order: Vec<u32> = (0..6).collect();
        let index = NeighborIndex::prune(&similarity(), 2, &Jaccard, &order);
        let transposed = index.transpose();
        // item 0 is a neighbor of every other item
        let holders: Vec<u32> = transposed.neighbors(0).iter().map(|n| n.item).collect();
        assert_eq!(vec![1, 2, 3, 4, 5], holders);
        // only 2 and 3 kept item 0's list
        assert_eq!(1, transposed.neighbors(2).len());
        assert_eq!(0, transposed.neighbors(4).len());
        assert_eq!(index.num_entries(), transposed.num_entries());
    }
}
