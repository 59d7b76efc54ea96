use std::time::Instant;
use tdigest::TDigest;

/// Collects per-user recommendation latencies and reports percentiles.
#[derive(Clone)]
pub struct Stopwatch {
    start_time: Instant,
    durations: Vec<SizeDurationMicros>,
}

/// Number of seen items of the user and the time spent recommending for it.
pub type SizeDurationMicros = (u32, f64);

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Stopwatch {
        Stopwatch {
            start_time: Instant::now(),
            durations: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = Instant::now();
    }

    pub fn stop(&mut self, qty_seen_items: usize) {
        let duration_as_micros = self.start_time.elapsed().as_micros() as f64;
        self.durations.push((qty_seen_items as u32, duration_as_micros));
    }

    pub fn get_n(&self) -> usize {
        self.durations.len()
    }

    /// Estimated latency at quantile `q` in `[0, 1]`; zero when nothing was measured.
    pub fn get_percentile_in_micros(&self, q: f64) -> f64 {
        if self.durations.is_empty() {
            return 0.0;
        }
        let t_digest = TDigest::new_with_size(100);
        let durations = self.durations.iter().map(|tuple| tuple.1).collect();
        let sorted_digest = t_digest.merge_unsorted(durations);
        sorted_digest.estimate_quantile(q)
    }

    pub fn get_raw_durations(&self) -> &[SizeDurationMicros] {
        &self.durations
    }
}

#[cfg(test)]
mod stopwatch_test {
    use super::*;

    #[test]
    fn should_record_one_duration_per_stop() {
        let mut stopwatch = Stopwatch::new();
        for qty in 1..=3 {
            stopwatch.start();
            stopwatch.stop(qty);
        }
        assert_eq!(3, stopwatch.get_n());
        assert_eq!(vec![1, 2, 3], stopwatch.get_raw_durations().iter().map(|d| d.0).collect::<Vec<_>>());
        assert!(stopwatch.get_percentile_in_micros(0.99) >= 0.0);
    }

    #[test]
    fn should_report_zero_without_measurements() {
        assert_eq!(0.0, Stopwatch::default().get_percentile_in_micros(0.5));
    }
}
