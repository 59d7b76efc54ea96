use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use itemcf::config::AppConfig;
use itemcf::interactions::UserIdx;
use itemcf::io;
use itemcf::itemknn::ItemKnnIndex;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(config_path)?;
    config.log.init_logger();

    let store = io::read_interactions_file(
        &config.data.training_data_path,
        config.data.skip_malformed_lines,
    )
    .with_context(|| format!("reading training data {}", config.data.training_data_path))?;

    let index = ItemKnnIndex::build(&store, config.model.strategy.strategy(), config.model.params());

    let progress = ProgressBar::new(store.num_users() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("scoring users {bar:40} {pos}/{len} [{elapsed_precise}]"),
    );
    let recommendations: Vec<_> = (0..store.num_users() as UserIdx)
        .map(|user| {
            progress.inc(1);
            index.recommend_for_user(&store, user)
        })
        .collect();
    progress.finish_and_clear();
    info!("scored {} users", recommendations.len());

    io::write_recommendations_file(
        &config.data.output_path,
        &store,
        &recommendations,
        config.output.user_order,
    )
    .with_context(|| format!("writing recommendations to {}", config.data.output_path))?;

    Ok(())
}
