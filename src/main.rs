mod config;
mod data;
mod dataset;
mod ml;
mod types;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::AppConfig;
use dataset::{build_training_set, SkipReason, TrainingSet};
use ml::{DoublingPredictor, ModelStore};

#[derive(Parser)]
#[command(name = "doubling-predictor")]
#[command(version = "0.1.0")]
#[command(about = "Candlestick price-doubling predictor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from candlestick series and save it
    Train {
        /// Input JSON file with asset/market candlestick series
        #[arg(short, long)]
        data: String,

        /// Overwrite an existing saved model
        #[arg(long)]
        force: bool,
    },
    /// Predict doubling probability for a dataset sample
    Predict {
        /// Input JSON file with asset/market candlestick series
        #[arg(short, long)]
        data: String,

        /// Sample index within the built dataset
        #[arg(short, long, default_value = "0")]
        sample: usize,
    },
    /// Show dataset shape, skip reasons, and label balance
    Stats {
        /// Input JSON file with asset/market candlestick series
        #[arg(short, long)]
        data: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AppConfig::load(&cli.config)?;
    config
        .validate()
        .map_err(|errors| anyhow!("Invalid configuration: {}", errors.join(", ")))?;

    match cli.command {
        Commands::Train { data, force } => run_train(&config, &data, force),
        Commands::Predict { data, sample } => run_predict(&config, &data, sample),
        Commands::Stats { data } => run_stats(&config, &data),
    }
}

fn build_dataset(config: &AppConfig, data_path: &str) -> Result<TrainingSet> {
    let series = data::load_series(data_path)?;
    info!("Loaded {} series from {}", series.len(), data_path);

    let training_set = build_training_set(&series, &config.dataset);
    info!(
        "Built {} training samples ({} positive)",
        training_set.len(),
        training_set.positives()
    );
    Ok(training_set)
}

fn run_train(config: &AppConfig, data_path: &str, force: bool) -> Result<()> {
    let store = ModelStore::new(&config.model_path);
    if !force && store.load()?.is_some() {
        return Err(anyhow!(
            "A trained model already exists at {}; use --force to overwrite",
            config.model_path
        ));
    }

    let training_set = build_dataset(config, data_path)?;

    let mut predictor = DoublingPredictor::new(config.trainer.clone());
    let report = predictor.train(&training_set)?;
    store.save(&predictor, &report)?;

    println!(
        "Trained on {} samples ({} positive / {} negative), {:.1}% training accuracy",
        report.samples,
        report.positives,
        report.negatives,
        report.accuracy * 100.0
    );
    Ok(())
}

fn run_predict(config: &AppConfig, data_path: &str, sample: usize) -> Result<()> {
    let training_set = build_dataset(config, data_path)?;

    let store = ModelStore::new(&config.model_path);
    let predictor = match store.load()? {
        Some(stored) => stored.into_predictor(config.trainer.clone()),
        None => {
            // No saved model yet: train a fresh one from this data.
            warn!("No saved model at {}, training", config.model_path);
            let mut predictor = DoublingPredictor::new(config.trainer.clone());
            let report = predictor.train(&training_set)?;
            store.save(&predictor, &report)?;
            predictor
        }
    };

    let features = training_set.features(sample).ok_or_else(|| {
        anyhow!(
            "Sample index {} out of range ({} samples)",
            sample,
            training_set.len()
        )
    })?;
    let probability = predictor.predict(features)?;

    println!("Doubling probability for sample {}: {:.4}", sample, probability);
    Ok(())
}

fn run_stats(config: &AppConfig, data_path: &str) -> Result<()> {
    let training_set = build_dataset(config, data_path)?;
    let needed_asset = config.dataset.window + config.dataset.lookahead;

    println!(
        "Dataset parameters: window={} lookahead={} multiplier={}",
        config.dataset.window, config.dataset.lookahead, config.dataset.doubling_multiplier
    );
    for stats in &training_set.series_stats {
        match stats.skipped {
            Some(SkipReason::AssetTooShort) => println!(
                "  {}: skipped ({} asset candles, need {})",
                stats.ticker, stats.asset_len, needed_asset
            ),
            Some(SkipReason::MarketTooShort) => println!(
                "  {}: skipped ({} market candles, need {})",
                stats.ticker, stats.market_len, config.dataset.window
            ),
            None => println!("  {}: {} windows", stats.ticker, stats.windows),
        }
    }

    let total = training_set.len();
    let positives = training_set.positives();
    println!(
        "Total: {} samples of length {}, {} positive / {} negative",
        total,
        config.dataset.feature_len(),
        positives,
        total - positives
    );
    Ok(())
}
