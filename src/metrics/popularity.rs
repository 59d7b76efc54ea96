use hashbrown::HashSet;

use crate::interactions::ItemIdx;
use crate::metrics::UserMetric;

/// Mean support of the recommended items, relative to the most popular item.
pub struct Popularity {
    sum_of_scores: f64,
    qty: usize,
    item_support: Vec<u32>,
    length: usize,
    max_support: u32,
}

impl Popularity {
    pub fn new(item_support: &[u32], length: usize) -> Popularity {
        Popularity {
            sum_of_scores: 0.0,
            qty: 0,
            item_support: item_support.to_vec(),
            length,
            max_support: item_support.iter().copied().max().unwrap_or(0),
        }
    }
}

impl UserMetric for Popularity {
    fn add(&mut self, recommendations: &[ItemIdx], _held_out: &[ItemIdx]) {
        let items: HashSet<&ItemIdx> = recommendations.iter().take(self.length).collect();
        self.qty += 1;
        if !items.is_empty() && self.max_support > 0 {
            let sum: f64 = items
                .iter()
                .filter_map(|item| self.item_support.get(**item as usize))
                .map(|support| *support as f64 / self.max_support as f64)
                .sum();
            self.sum_of_scores += sum / items.len() as f64;
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
        format!("Popularity@{}", self.length)
    }
}
