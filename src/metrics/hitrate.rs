use crate::interactions::ItemIdx;
use crate::metrics::UserMetric;

pub struct HitRate {
    sum_of_scores: f64,
    qty: usize,
    length: usize,
}

impl HitRate {
    pub fn new(length: usize) -> HitRate {
        HitRate {
            sum_of_scores: 0_f64,
            qty: 0,
            length,
        }
    }
}

impl UserMetric for HitRate {
    /// Counts a hit when any held-out item shows up in the top `length` recommendations.
    fn add(&mut self, recommendations: &[ItemIdx], held_out: &[ItemIdx]) {
        if held_out.is_empty() {
            return;
        }
        self.qty += 1;
        let hit = recommendations
            .iter()
            .take(self.length)
            .any(|item_id| held_out.contains(item_id));
        if hit {
            self.sum_of_scores += 1_f64
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
        format!("HitRate@{}", self.length)
    }
}

#[cfg(test)]
mod hitrate_test {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn should_happyflow_hitrate() {
        let mut undertest = HitRate::new(20);
        undertest.add(&[1, 2], &[2, 3]);
        undertest.add(&[1, 2], &[4]);
        assert!(approx_eq!(f64, 0.5, undertest.result(), epsilon = 1e-12));
        assert_eq!("HitRate@20", undertest.get_name());
    }

    #[test]
    fn should_only_look_at_top_length() {
        let mut undertest = HitRate::new(1);
        undertest.add(&[1, 2], &[2]);
        assert!(approx_eq!(f64, 0.0, undertest.result(), epsilon = 1e-12));
    }

    #[test]
    fn should_handle_divide_by_zero() {
        let mut undertest = HitRate::new(20);
        undertest.add(&[1, 2], &[]);
        assert!(approx_eq!(f64, 0.0, undertest.result(), epsilon = 1e-12));
    }
}
