use hashbrown::HashSet;

use crate::interactions::ItemIdx;
use crate::metrics::UserMetric;

pub struct Ndcg {
    sum_of_scores: f64,
    qty: usize,
    length: usize,
}

impl Ndcg {
    /// Calculate Ndcg of ranked recommendations against the held-out items of each user.
    pub fn new(length: usize) -> Ndcg {
        Ndcg {
            sum_of_scores: 0_f64,
            qty: 0,
            length,
        }
    }

    fn discount(position: usize) -> f64 {
        1_f64 / ((position as f64) + 2_f64).log2()
    }
}

impl UserMetric for Ndcg {
    fn add(&mut self, recommendations: &[ItemIdx], held_out: &[ItemIdx]) {
        let held_out: HashSet<&ItemIdx> = held_out.iter().collect();
        if held_out.is_empty() {
            return;
        }
        let dcg: f64 = recommendations
            .iter()
            .take(self.length)
            .enumerate()
            .filter(|(_, item_id)| held_out.contains(item_id))
            .map(|(position, _)| Ndcg::discount(position))
            .sum();
        let ideal_hits = held_out.len().min(self.length);
        let dcg_max: f64 = (0..ideal_hits).map(Ndcg::discount).sum();
        self.sum_of_scores += dcg / dcg_max;
        self.qty += 1;
    }

    fn result(&self) -> f64 {
        if self.qty > 0 {
            self.sum_of_scores / self.qty as f64
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        format!("Ndcg@{}", self.length)
    }
}

#[cfg(test)]
mod ndcg_test {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn should_calculate_ndcg() {
        let mut mymetric = Ndcg::new(20);
        let recommendations: Vec<ItemIdx> = (1..=24).collect();
        mymetric.add(&recommendations, &[3, 55, 88, 4]);
        let dcg = 1.0 / 4_f64.log2() + 1.0 / 5_f64.log2();
        let dcg_max = 1.0 + 1.0 / 3_f64.log2() + 1.0 / 4_f64.log2() + 1.0 / 5_f64.log2();
        assert!(approx_eq!(f64, dcg / dcg_max, mymetric.result(), epsilon = 1e-12));
        assert_eq!("Ndcg@20", mymetric.get_name());
    }

    #[test]
    fn should_score_perfect_ranking_as_one() {
        let mut mymetric = Ndcg::new(3);
        mymetric.add(&[7, 8, 9], &[8, 7]);
        assert!(approx_eq!(f64, 1.0, mymetric.result(), epsilon = 1e-12));
    }
}
