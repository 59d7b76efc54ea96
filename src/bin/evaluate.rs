use anyhow::{anyhow, Context};
use log::info;

use itemcf::config::AppConfig;
use itemcf::io;
use itemcf::itemknn::ItemKnnIndex;
use itemcf::metrics::evaluation_reporter::EvaluationReporter;
use itemcf::stopwatch::Stopwatch;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(config_path)?;
    config.log.init_logger();

    let test_data_path = config
        .evaluation
        .test_data_path
        .clone()
        .ok_or_else(|| anyhow!("evaluation.test_data_path (or TEST_DATA) is required"))?;

    let store = io::read_interactions_file(
        &config.data.training_data_path,
        config.data.skip_malformed_lines,
    )
    .with_context(|| format!("reading training data {}", config.data.training_data_path))?;
    let held_out = io::read_held_out(&test_data_path, &store, config.data.skip_malformed_lines)
        .with_context(|| format!("reading test data {}", test_data_path))?;
    info!("evaluating {} users with held-out items", held_out.len());

    let params = config.model.params();
    let index = ItemKnnIndex::build(&store, config.model.strategy.strategy(), params);

    let mut reporter = EvaluationReporter::new(store.item_support(), params.top_n);
    let mut stopwatch = Stopwatch::new();

    for (user, held_out_items) in held_out.iter() {
        if held_out_items.is_empty() {
            continue;
        }
        let seen = store.items_for_user(*user);
        stopwatch.start();
        let recommendations = index.recommend_ranked(seen);
        stopwatch.stop(seen.len());
        reporter.add(&recommendations, held_out_items);
    }

    println!("===============================================================");
    println!("===          EVALUATING {:>8} NEIGHBORHOOD               ====", index.strategy_name());
    println!("===============================================================");
    println!("{}", reporter.get_name());
    println!("{}", reporter.result());
    println!("Qty test evaluations: {}", stopwatch.get_n());
    println!("Recommendation latency");
    println!("p50 (microseconds): {}", stopwatch.get_percentile_in_micros(0.50));
    println!("p90 (microseconds): {}", stopwatch.get_percentile_in_micros(0.90));
    println!("p99 (microseconds): {}", stopwatch.get_percentile_in_micros(0.99));

    Ok(())
}
