use hashbrown::HashSet;

use crate::interactions::ItemIdx;
use crate::metrics::UserMetric;

pub struct Recall {
    sum_of_scores: f64,
    qty: usize,
    length: usize,
}

impl Recall {
    /// Returns a Recall evaluation metric.
    /// Recall is the share of distinct held-out items found in the top `length`
    /// recommendations.
    pub fn new(length: usize) -> Recall {
        Recall {
            sum_of_scores: 0_f64,
            qty: 0,
            length,
        }
    }
}

impl UserMetric for Recall {
    fn add(&mut self, recommendations: &[ItemIdx], held_out: &[ItemIdx]) {
        if held_out.is_empty() {
            return;
        }
        self.qty += 1;
        let top_recos: HashSet<&ItemIdx> = recommendations.iter().take(self.length).collect();
        let unique_held_out: HashSet<&ItemIdx> = held_out.iter().collect();
        let qty_hits = top_recos.intersection(&unique_held_out).count();
        self.sum_of_scores += qty_hits as f64 / unique_held_out.len() as f64;
    }

    fn result(&self) -> f64 {
        if self.qty > 0 {
            self.sum_of_scores / self.qty as f64
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        format!("Recall@{}", self.length)
    }
}

#[cfg(test)]
mod recall_test {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn should_calculate_recall() {
        let mut mymetric = Recall::new(20);
        let recommendations: Vec<ItemIdx> = (1..=24).collect();
        mymetric.add(&recommendations, &[3, 55, 3, 4]);
        assert!(approx_eq!(f64, 2.0 / 3.0, mymetric.result(), epsilon = 1e-12));
        assert_eq!("Recall@20", mymetric.get_name());
    }
}
