use crate::interactions::ItemIdx;
use crate::metrics::UserMetric;

pub struct Mrr {
    sum_of_scores: f64,
    qty: usize,
    length: usize,
}

impl Mrr {
    pub fn new(length: usize) -> Mrr {
        Mrr {
            sum_of_scores: 0_f64,
            qty: 0,
            length,
        }
    }
}

impl UserMetric for Mrr {
    /// Reciprocal rank of the first held-out item among the top `length` recommendations.
    fn add(&mut self, recommendations: &[ItemIdx], held_out: &[ItemIdx]) {
        if held_out.is_empty() {
            return;
        }
        self.qty += 1;
        let first_hit = recommendations
            .iter()
            .take(self.length)
            .position(|item_id| held_out.contains(item_id));
        if let Some(rank) = first_hit {
            self.sum_of_scores += 1.0 / (rank + 1) as f64;
        }
    }

    fn result(&self) -> f64 {
        if self.qty > 0 {
            self.sum_of_scores / self.qty as f64
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        format!("Mrr@{}", self.length)
    }
}

#[cfg(test)]
mod mrr_test {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn should_calculate_mrr() {
        let mut mymetric = Mrr::new(20);
        mymetric.add(&[1, 2, 3, 4], &[3, 4]);
        mymetric.add(&[1, 2, 3, 4], &[1]);
        assert!(approx_eq!(f64, ((1.0 / 3.0) + 1.0) / 2.0, mymetric.result(), epsilon = 1e-12));
        assert_eq!("Mrr@20", mymetric.get_name());
    }
}
