use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use herald_client::{JsonFileWriter, NewsApiFetcher};
use herald_core::traits::ContentWriter;
use herald_core::{AppConfig, Aggregator, CachedFetcher, RetryingFetcher};

const DEFAULT_TOPICS: &str = "startup,entrepreneurship,technology,unicorn";

#[derive(Parser, Debug)]
#[command(name = "herald", version, about = "Concurrent news aggregator")]
struct Cli {
    /// Comma-separated list of topics to search for
    #[arg(
        short,
        long,
        env = "HERALD_TOPICS",
        value_delimiter = ',',
        default_value = DEFAULT_TOPICS
    )]
    topics: Vec<String>,

    /// Path of the JSON file to write
    #[arg(short, long, env = "HERALD_OUTPUT", default_value = "news_results.json")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("herald=info,herald_core=info,herald_client=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let news_api = NewsApiFetcher::new(&config.news_api, config.request_timeout)?;
    let fetcher = RetryingFetcher::new(
        CachedFetcher::new(news_api, &config.cache),
        config.retry.clone(),
    );
    let aggregator = Aggregator::new(vec![fetcher], config.aggregator.clone());

    let topics = normalize_topics(cli.topics);
    tracing::info!(topics = %topics.join(", "), "Fetching news");

    let report = aggregator.aggregate(&topics).await?;
    for (topic, articles) in &report.by_topic {
        tracing::info!(%topic, count = articles.len(), "Topic summary");
    }

    JsonFileWriter::new(&cli.output)
        .write(&report.articles)
        .with_context(|| format!("Failed to save results to {}", cli.output.display()))?;

    tracing::info!(
        run_id = %report.run_id,
        articles = report.articles.len(),
        output = %cli.output.display(),
        "Successfully processed articles"
    );
    Ok(())
}

/// Trim whitespace and drop empty or repeated topics, keeping first-seen order.
fn normalize_topics(raw: Vec<String>) -> Vec<String> {
    let mut topics: Vec<String> = Vec::with_capacity(raw.len());
    for topic in raw {
        let topic = topic.trim();
        if !topic.is_empty() && !topics.iter().any(|t| t == topic) {
            topics.push(topic.to_string());
        }
    }
    topics
}
