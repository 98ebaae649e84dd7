use almasry_scraper::{cli::Cli, sink, Fetcher, NewsSearch, ScraperConfig};
use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The main entry point of the application.
///
/// This function initializes logging, loads the configuration, applies the command line
/// overrides, searches for the keyword and writes the articles it finds to a JSON file.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ScraperConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut config)?;

    let start_time = Instant::now();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));

    let fetcher = Fetcher::from_config(&config)?.with_progress(spinner.clone());
    let search = NewsSearch::with_fetcher(&config, fetcher)?;

    info!(keyword = %cli.keyword, limit = cli.limit, "Starting scrape");
    let articles = search.scrape_articles(&cli.keyword, cli.limit).await;
    spinner.finish_and_clear();

    println!("\nScraped {} articles in {:.2?}:", articles.len(), start_time.elapsed());
    for (idx, article) in articles.iter().enumerate() {
        println!("{}. {}", idx + 1, article.title);
        println!("   Time: {}", article.time);
        println!("   URL: {}\n", article.url);
    }

    sink::save_to_json(&articles, &config.output_path)
        .await
        .with_context(|| format!("failed to write {}", config.output_path.display()))?;
    println!("Results saved to {}", config.output_path.display());

    Ok(())
}
