use hashbrown::HashSet;

use crate::interactions::ItemIdx;
use crate::metrics::UserMetric;

pub struct Precision {
    sum_of_scores: f64,
    qty: usize,
    length: usize,
}

impl Precision {
    /// Returns a Precision evaluation metric.
    /// Precision is the share of the `length` recommendation slots taken by held-out items.
    ///
    /// # Arguments
    ///
    /// * `length` - the length aka 'n' that will be used for evaluation.
    ///
    pub fn new(length: usize) -> Precision {
        Precision {
            sum_of_scores: 0_f64,
            qty: 0,
            length,
        }
    }
}

impl UserMetric for Precision {
    fn add(&mut self, recommendations: &[ItemIdx], held_out: &[ItemIdx]) {
        if held_out.is_empty() {
            return;
        }
        self.qty += 1;
        let top_recos: HashSet<&ItemIdx> = recommendations.iter().take(self.length).collect();
        let held_out: HashSet<&ItemIdx> = held_out.iter().collect();
        let qty_hits = top_recos.intersection(&held_out).count();
        self.sum_of_scores += qty_hits as f64 / self.length as f64
    }

    fn result(&self) -> f64 {
        if self.qty > 0 {
            self.sum_of_scores / self.qty as f64
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        format!("Precision@{}", self.length)
    }
}
