use hashbrown::HashSet;

use crate::interactions::ItemIdx;
use crate::metrics::UserMetric;

/// Share of the catalog that appears in at least one recommendation list.
pub struct Coverage {
    num_catalog_items: usize,
    recommended_items: HashSet<ItemIdx>,
    length: usize,
}

impl Coverage {
    pub fn new(num_catalog_items: usize, length: usize) -> Coverage {
        Coverage {
            num_catalog_items,
            recommended_items: HashSet::new(),
            length,
        }
    }
}

impl UserMetric for Coverage {
    fn add(&mut self, recommendations: &[ItemIdx], _held_out: &[ItemIdx]) {
        self.recommended_items
            .extend(recommendations.iter().take(self.length).copied());
    }

    fn result(&self) -> f64 {
        if self.num_catalog_items > 0 {
            self.recommended_items.len() as f64 / self.num_catalog_items as f64
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        format!("Coverage@{}", self.length)
    }
}

#[cfg(test)]
mod coverage_test {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn should_count_distinct_recommended_items() {
        let mut undertest = Coverage::new(10, 2);
        undertest.add(&[1, 2, 3], &[]);
        undertest.add(&[2, 4], &[]);
        assert!(approx_eq!(f64, 0.3, undertest.result(), epsilon = 1e-12));
        assert_eq!("Coverage@2", undertest.get_name());
    }

    #[test]
    fn should_handle_empty_catalog() {
        let undertest = Coverage::new(0, 20);
        assert!(approx_eq!(f64, 0.0, undertest.result(), epsilon = 1e-12));
    }
}
