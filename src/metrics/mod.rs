use crate::interactions::ItemIdx;

pub mod coverage;
pub mod evaluation_reporter;
pub mod hitrate;
pub mod mrr;
pub mod ndcg;
pub mod popularity;
pub mod precision;
pub mod recall;

/// Offline accuracy or beyond-accuracy metric, averaged over users.
///
/// `recommendations` is a ranked list (strongest first) and `held_out` the items the
/// user interacted with outside the training data.
pub trait UserMetric {
    fn add(&mut self, recommendations: &[ItemIdx], held_out: &[ItemIdx]);
    fn result(&self) -> f64;
    fn get_name(&self) -> String;
}
