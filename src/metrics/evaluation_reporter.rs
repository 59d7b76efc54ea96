use crate::interactions::ItemIdx;
use crate::metrics::coverage::Coverage;
use crate::metrics::hitrate::HitRate;
use crate::metrics::mrr::Mrr;
use crate::metrics::ndcg::Ndcg;
use crate::metrics::popularity::Popularity;
use crate::metrics::precision::Precision;
use crate::metrics::recall::Recall;
use crate::metrics::UserMetric;

/// Feeds every recommendation list to all metrics at once.
pub struct EvaluationReporter {
    metrics: Vec<Box<dyn UserMetric>>,
}

impl EvaluationReporter {
    pub fn new(item_support: &[u32], length: usize) -> EvaluationReporter {
        let metrics: Vec<Box<dyn UserMetric>> = vec![
            Box::new(Mrr::new(length)),
            Box::new(Ndcg::new(length)),
            Box::new(HitRate::new(length)),
            Box::new(Popularity::new(item_support, length)),
            Box::new(Precision::new(length)),
            Box::new(Coverage::new(item_support.len(), length)),
            Box::new(Recall::new(length)),
        ];
        EvaluationReporter { metrics }
    }

    pub fn add(&mut self, recommendations: &[ItemIdx], held_out: &[ItemIdx]) {
        for metric in self.metrics.iter_mut() {
            metric.add(recommendations, held_out);
        }
    }

    /// Comma separated results, in the same order as `get_name`.
    pub fn result(&self) -> String {
        self.metrics
            .iter()
            .map(|metric| format!("{:.4}", metric.result()))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn get_name(&self) -> String {
        self.metrics
            .iter()
            .map(|metric| metric.get_name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod evaluation_reporter_test {
    use super::*;

    #[test]
    fn should_report_all_metrics() {
        let mut reporter = EvaluationReporter::new(&[2, 1, 1, 1], 2);
        reporter.add(&[0, 1], &[1]);
        assert_eq!(
            "Mrr@2,Ndcg@2,HitRate@2,Popularity@2,Precision@2,Coverage@2,Recall@2",
            reporter.get_name()
        );
        assert_eq!(
            "0.5000,0.6309,1.0000,0.7500,0.5000,0.5000,1.0000",
            reporter.result()
        );
    }
}
