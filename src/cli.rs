//! Command-line arguments for the scraper.

use crate::config::DelayRange;
use crate::{Result, ScraperConfig};
use clap::Parser;
use std::path::PathBuf;

/// Search Almasryalyoum for a keyword and save the latest matching articles as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Keyword to search for
    #[arg(short, long, default_value = "سد النهضة")]
    pub keyword: String,

    /// Maximum number of articles to return
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Where to write the JSON results (defaults to the configured output path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Optional path to a configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum number of fetch attempts
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Shortest wait between attempts, in seconds
    #[arg(long)]
    pub min_delay: Option<u64>,

    /// Longest wait between attempts, in seconds
    #[arg(long)]
    pub max_delay: Option<u64>,
}

impl Cli {
    /// Applies the command-line overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut ScraperConfig) -> Result<()> {
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        config.delay_range = DelayRange::new(
            self.min_delay.unwrap_or(config.delay_range.min_secs),
            self.max_delay.unwrap_or(config.delay_range.max_secs),
        )?;
        config.validate()
    }
}
