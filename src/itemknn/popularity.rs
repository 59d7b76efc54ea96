use hashbrown::HashSet;

use crate::interactions::ItemIdx;

/// All items ordered by (support desc, external order asc). Built once, read-only after.
#[derive(Debug, Clone)]
pub struct PopularityRanking {
    ranked: Vec<ItemIdx>,
}

impl PopularityRanking {
    pub fn new(item_support: &[u32], item_order: &[u32]) -> Self {
        let mut ranked: Vec<ItemIdx> = (0..item_support.len() as ItemIdx).collect();
        ranked.sort_unstable_by(|&a, &b| {
            item_support[b as usize]
                .cmp(&item_support[a as usize])
                .then_with(|| item_order[a as usize].cmp(&item_order[b as usize]))
        });
        PopularityRanking { ranked }
    }

    pub fn ranked(&self) -> &[ItemIdx] {
        &self.ranked
    }

    /// Appends the most popular items that are neither recommended yet nor in `seen`
    /// (sorted) until `recommendations` holds `how_many` items or the catalog runs out.
    pub fn backfill(&self, recommendations: &mut Vec<ItemIdx>, seen: &[ItemIdx], how_many: usize) {
        if recommendations.len() >= how_many {
            return;
        }
        let mut present: HashSet<ItemIdx> = recommendations.iter().copied().collect();
        for item in self.ranked.iter() {
            if recommendations.len() >= how_many {
                break;
            }
            if seen.binary_search(item).is_ok() || present.contains(item) {
                continue;
            }
            present.insert(*item);
            recommendations.push(*item);
        }
    }
}

#[cfg(test)]
mod popularity_test {
    use super::*;

    #[test]
    fn should_rank_by_support_then_order() {
        let support = vec![1, 3, 3, 2];
        let order = vec![0, 2, 1, 3];
        let popularity = PopularityRanking::new(&support, &order);
        assert_eq!(&[2, 1, 3, 0], popularity.ranked());
    }

    #[test]
    fn should_backfill_skipping_seen_and_present() {
        let popularity = PopularityRanking::new(&[5, 4, 3, 2, 1], &[0, 1, 2, 3, 4]);
        let mut recommendations = vec![1];
        popularity.backfill(&mut recommendations, &[0], 3);
        assert_eq!(vec![1, 2, 3], recommendations);
    }

    #[test]
    fn should_stop_when_catalog_is_exhausted() {
        let popularity = PopularityRanking::new(&[2, 1, 1], &[0, 1, 2]);
        let mut recommendations = Vec::new();
        popularity.backfill(&mut recommendations, &[1], 20);
        assert_eq!(vec![0, 2], recommendations);
    }

    #[test]
    fn should_leave_full_lists_untouched() {
        let popularity = PopularityRanking::new(&[2, 1, 1], &[0, 1, 2]);
        let mut recommendations = vec![2, 1];
        popularity.backfill(&mut recommendations, &[], 2);
        assert_eq!(vec![2, 1], recommendations);
    }
}
