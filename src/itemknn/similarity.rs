use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use log::info;

use crate::interactions::ItemIdx;
use crate::itemknn::cooccurrence::CoOccurrence;
use crate::itemknn::sparse::CsrMatrix;
use crate::itemknn::EPSILON;

/// Counts needed to score one pair of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairStats {
    pub co_count: u32,
    pub support_i: u32,
    pub support_j: u32,
}

/// How user scores are gathered from the neighbor lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// A seen item adds its own neighbor list to the candidates.
    Forward,
    /// A candidate collects the weights of the seen items that appear in its neighbor list
    /// (the incidence row multiplied by the neighbor-weight matrix).
    Transposed,
}

pub trait SimilarityStrategy {
    fn name(&self) -> &'static str;

    /// Whether co-occurrences are aggregated as the full item x item sparse matrix rather
    /// than as a map of counted pairs.
    fn requires_cooccurrence_matrix(&self) -> bool;

    /// Similarity of a co-occurring pair, or `None` when the pair must not become a neighbor.
    fn pairwise_score(&self, stats: &PairStats) -> Option<f64>;

    /// Magnitude compared when selecting the strongest neighbors.
    fn selection_key(&self, score: f64) -> f64 {
        score
    }

    /// Whether retained neighbor weights are rescaled to sum to one.
    fn normalizes_neighbors(&self) -> bool;

    fn propagation(&self) -> Propagation;
}

/// Co-occurrence count over the geometric mean of both supports.
pub struct Cosine;

impl SimilarityStrategy for Cosine {
    fn name(&self) -> &'static str {
        "cosine"
    }

    fn requires_cooccurrence_matrix(&self) -> bool {
        true
    }

    fn pairwise_score(&self, stats: &PairStats) -> Option<f64> {
        if stats.co_count == 0 {
            return None;
        }
        let norm_i = (stats.support_i as f64).max(EPSILON).sqrt();
        let norm_j = (stats.support_j as f64).max(EPSILON).sqrt();
        let score = stats.co_count as f64 / (norm_i * norm_j);
        if score.is_finite() && score != 0.0 {
            Some(score)
        } else {
            None
        }
    }

    fn selection_key(&self, score: f64) -> f64 {
        score.abs()
    }

    fn normalizes_neighbors(&self) -> bool {
        true
    }

    fn propagation(&self) -> Propagation {
        Propagation::Transposed
    }
}

/// Co-occurrence count over the size of the union of both user sets.
pub struct Jaccard;

impl SimilarityStrategy for Jaccard {
    fn name(&self) -> &'static str {
        "jaccard"
    }

    fn requires_cooccurrence_matrix(&self) -> bool {
        false
    }

    fn pairwise_score(&self, stats: &PairStats) -> Option<f64> {
        if stats.support_i == 0 || stats.support_j == 0 {
            return None;
        }
        let intersection = stats.co_count as i64;
        let union = stats.support_i as i64 + stats.support_j as i64 - intersection;
        if union <= 0 {
            return None;
        }
        let score = intersection as f64 / union as f64;
        if score > 0.0 && score.is_finite() {
            Some(score)
        } else {
            None
        }
    }

    fn normalizes_neighbors(&self) -> bool {
        false
    }

    fn propagation(&self) -> Propagation {
        Propagation::Forward
    }
}

static COSINE: Cosine = Cosine;
static JACCARD: Jaccard = Jaccard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Cosine,
    Jaccard,
}

impl StrategyKind {
    pub fn strategy(self) -> &'static dyn SimilarityStrategy {
        match self {
            StrategyKind::Cosine => &COSINE,
            StrategyKind::Jaccard => &JACCARD,
        }
    }
}

impl Default for StrategyKind {
    fn default() -> Self {
        StrategyKind::Cosine
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(StrategyKind::Cosine),
            "jaccard" => Ok(StrategyKind::Jaccard),
            other => Err(format!(
                "unknown similarity strategy '{}', expected 'cosine' or 'jaccard'",
                other
            )),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.strategy().name())
    }
}

/// Scores every co-occurring pair and returns the symmetric, pre-pruning similarity
/// matrix. Self pairs never appear.
pub fn build_similarity(
    cooccurrence: &CoOccurrence,
    item_support: &[u32],
    strategy: &dyn SimilarityStrategy,
) -> CsrMatrix<f64> {
    let start_time = Instant::now();
    let num_items = item_support.len();
    let mut triplets: Vec<(ItemIdx, ItemIdx, f64)> = Vec::with_capacity(cooccurrence.num_pairs() * 2);
    cooccurrence.for_each_directed(|item, other, co_count| {
        if item == other {
            return;
        }
        let stats = PairStats {
            co_count,
            support_i: item_support[item as usize],
            support_j: item_support[other as usize],
        };
        if let Some(score) = strategy.pairwise_score(&stats) {
            triplets.push((item, other, score));
        }
    });
    let similarity = CsrMatrix::from_triplets(num_items, num_items, triplets);
    info!(
        "{} similarity: {} non-zeros in {} micros",
        strategy.name(),
        similarity.nnz(),
        start_time.elapsed().as_micros()
    );
    similarity
}

#[cfg(test)]
mod similarity_test {
    use super::*;
    use float_cmp::approx_eq;

    fn stats(co_count: u32, support_i: u32, support_j: u32) -> PairStats {
        PairStats {
            co_count,
            support_i,
            support_j,
        }
    }

    #[test]
    fn should_compute_cosine() {
        let score = Cosine.pairwise_score(&stats(2, 2, 2)).unwrap();
        assert!(approx_eq!(f64, 1.0, score, epsilon = 1e-12));
        let score = Cosine.pairwise_score(&stats(1, 2, 1)).unwrap();
        assert!(approx_eq!(f64, 1.0 / 2_f64.sqrt(), score, epsilon = 1e-12));
        assert_eq!(None, Cosine.pairwise_score(&stats(0, 3, 3)));
    }

    #[test]
    fn should_guard_cosine_against_zero_support() {
        let score = Cosine.pairwise_score(&stats(1, 0, 4));
        // floored support gives a huge but finite weight
        assert!(score.unwrap().is_finite());
    }

    #[test]
    fn should_compute_jaccard() {
        let score = Jaccard.pairwise_score(&stats(2, 2, 2)).unwrap();
        assert!(approx_eq!(f64, 1.0, score, epsilon = 1e-12));
        let score = Jaccard.pairwise_score(&stats(1, 2, 3)).unwrap();
        assert!(approx_eq!(f64, 0.25, score, epsilon = 1e-12));
    }

    #[test]
    fn should_skip_degenerate_jaccard_pairs() {
        assert_eq!(None, Jaccard.pairwise_score(&stats(0, 2, 2)));
        assert_eq!(None, Jaccard.pairwise_score(&stats(1, 0, 2)));
        // inconsistent counts giving an empty union
        assert_eq!(None, Jaccard.pairwise_score(&stats(4, 2, 2)));
    }

    #[test]
    fn should_select_by_magnitude_for_cosine_only() {
        assert_eq!(0.5, Cosine.selection_key(-0.5));
        assert_eq!(-0.5, Jaccard.selection_key(-0.5));
    }

    #[test]
    fn should_parse_strategy_kind() {
        assert_eq!(Ok(StrategyKind::Cosine), "cosine".parse::<StrategyKind>());
        assert_eq!(Ok(StrategyKind::Jaccard), " Jaccard ".parse::<StrategyKind>());
        assert!("pearson".parse::<StrategyKind>().is_err());
        assert_eq!("jaccard", StrategyKind::Jaccard.to_string());
        assert!(StrategyKind::Cosine.strategy().requires_cooccurrence_matrix());
        assert!(!StrategyKind::Jaccard.strategy().requires_cooccurrence_matrix());
    }
}
