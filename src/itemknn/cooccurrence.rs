use std::time::Instant;

use hashbrown::HashMap;
use log::{debug, info};

use crate::interactions::{InteractionStore, ItemIdx};
use crate::itemknn::sparse::CsrMatrix;

/// Number of users sharing each pair of distinct items.
pub enum CoOccurrence {
    /// Item x item Gram matrix of the incidence with the diagonal removed. Symmetric.
    Matrix(CsrMatrix<u32>),
    /// Counts keyed by unordered pair `(i, j)` with `i < j`.
    Pairs(HashMap<(ItemIdx, ItemIdx), u32>),
}

impl CoOccurrence {
    /// Matrix form: `Rᵀ·R` over the sparse incidence, then the diagonal (item supports) dropped.
    pub fn matrix(store: &InteractionStore) -> Self {
        let start_time = Instant::now();
        let incidence = CsrMatrix::incidence(store.user_items(), store.num_items());
        let gram = incidence.gram();
        debug!(
            "gram matrix: {} non-zeros including the diagonal",
            gram.nnz()
        );
        let cooccurrence = gram.without_diagonal();
        info!(
            "co-occurrence matrix: {} non-zeros in {} micros",
            cooccurrence.nnz(),
            start_time.elapsed().as_micros()
        );
        CoOccurrence::Matrix(cooccurrence)
    }

    /// Pairwise form: every unordered pair of a user's items is counted once, using the
    /// ascending index order of the user's item set.
    ///
    /// Cost is the sum over users of `|items|·(|items|-1)/2`, quadratic in the size of the
    /// largest item sets.
    pub fn pairwise(store: &InteractionStore) -> Self {
        let start_time = Instant::now();
        let mut counts: HashMap<(ItemIdx, ItemIdx), u32> = HashMap::new();
        for items in store.user_items().iter() {
            if items.len() < 2 {
                continue;
            }
            for (pos, first) in items.iter().enumerate() {
                for second in items[pos + 1..].iter() {
                    *counts.entry((*first, *second)).or_insert(0) += 1;
                }
            }
        }
        info!(
            "co-occurrence pairs: {} in {} micros",
            counts.len(),
            start_time.elapsed().as_micros()
        );
        CoOccurrence::Pairs(counts)
    }

    pub fn count(&self, first: ItemIdx, second: ItemIdx) -> u32 {
        if first == second {
            return 0;
        }
        match self {
            CoOccurrence::Matrix(matrix) => matrix.get(first as usize, second).unwrap_or(0),
            CoOccurrence::Pairs(counts) => {
                let key = (first.min(second), first.max(second));
                counts.get(&key).copied().unwrap_or(0)
            }
        }
    }

    /// Number of distinct unordered item pairs that co-occur at least once.
    pub fn num_pairs(&self) -> usize {
        match self {
            CoOccurrence::Matrix(matrix) => matrix.nnz() / 2,
            CoOccurrence::Pairs(counts) => counts.len(),
        }
    }

    /// Calls `visit(item, other, count)` once for every ordered pair of co-occurring items,
    /// so each unordered pair is visited in both directions.
    pub fn for_each_directed<F>(&self, mut visit: F)
    where
        F: FnMut(ItemIdx, ItemIdx, u32),
    {
        match self {
            CoOccurrence::Matrix(matrix) => {
                for item in 0..matrix.n_rows() {
                    for (other, count) in matrix.row_iter(item) {
                        visit(item as ItemIdx, other, count);
                    }
                }
            }
            CoOccurrence::Pairs(counts) => {
                for ((first, second), count) in counts.iter() {
                    visit(*first, *second, *count);
                    visit(*second, *first, *count);
                }
            }
        }
    }
}
