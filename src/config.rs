use crate::{Result, ScraperError};
use ::config::{Config, Environment, File};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// The `ScraperConfig` struct holds the configuration settings for the scraper application.
/// It includes the target site, retry settings, the browser identity presented to the site,
/// the selectors used to read the listing, and where the results are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// The origin every search is resolved against.
    pub base_url: String,
    /// The path of the keyword search page.
    pub search_path: String,
    /// The per-request timeout in seconds.
    pub timeout_secs: u64,
    /// The maximum number of fetch attempts.
    pub max_attempts: u32,
    /// The randomized delay between failed attempts.
    pub delay_range: DelayRange,
    /// The headers that make requests look like a desktop browser.
    pub browser: BrowserProfile,
    /// The CSS selectors used to read teaser items.
    pub selectors: SelectorConfig,
    /// The file the JSON results are written to.
    pub output_path: PathBuf,
}

/// The `DelayRange` struct holds the inclusive bounds, in whole seconds, of the wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    /// The shortest wait.
    pub min_secs: u64,
    /// The longest wait.
    pub max_secs: u64,
}

/// The `BrowserProfile` struct holds the header values sent with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub referer: String,
    /// Sends `DNT: 1` when set.
    pub do_not_track: bool,
}

/// The `SelectorConfig` struct holds the CSS selectors that locate a teaser and its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Selects the teaser items in the listing.
    pub items: String,
    /// Selects the link inside an item.
    pub anchor: String,
    /// Selects the headline inside an item.
    pub title: String,
    /// Selects the publication time inside an item.
    pub time: String,
    /// Selects the thumbnail inside an item.
    pub image: String,
}

impl Default for ScraperConfig {
    /// Provides default values for the `ScraperConfig` struct.
    ///
    /// # Returns
    ///
    /// A `ScraperConfig` instance with default settings.
    fn default() -> Self {
        Self {
            base_url: crate::DEFAULT_BASE_URL.to_string(),
            search_path: String::from("/news/search"),
            timeout_secs: crate::DEFAULT_TIMEOUT.as_secs(),
            max_attempts: crate::DEFAULT_MAX_ATTEMPTS,
            delay_range: DelayRange {
                min_secs: crate::DEFAULT_DELAY_RANGE.0,
                max_secs: crate::DEFAULT_DELAY_RANGE.1,
            },
            browser: BrowserProfile::default(),
            selectors: SelectorConfig::default(),
            output_path: PathBuf::from(crate::DEFAULT_OUTPUT_PATH),
        }
    }
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self {
            user_agent: String::from(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
            ),
            accept: String::from(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
            accept_language: String::from("en-US,en;q=0.5"),
            referer: String::from("https://www.google.com/"),
            do_not_track: true,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            items: String::from(".last_news ul li"),
            anchor: String::from("a"),
            title: String::from(".wrap p:not(.time)"),
            time: String::from(".time"),
            image: String::from("img"),
        }
    }
}

impl ScraperConfig {
    /// Loads the configuration from defaults, an optional file and `ALMASRY_` environment variables.
    ///
    /// Nested keys are addressed with `__`, e.g. `ALMASRY_DELAY_RANGE__MAX_SECS=20`.
    ///
    /// # Arguments
    ///
    /// * `path` - An optional configuration file; its format is inferred from the extension.
    ///
    /// # Returns
    ///
    /// A `Result` containing the validated configuration, or an error if a layer fails to load
    /// or the merged values are invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_layers(path, environment())
    }

    fn load_layers(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(env)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Checks the constraints the fetcher relies on.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ScraperError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ScraperError::InvalidConfig(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        self.delay_range.validate()
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("ALMASRY")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl DelayRange {
    /// Creates a `DelayRange`, rejecting a minimum above the maximum.
    pub fn new(min_secs: u64, max_secs: u64) -> Result<Self> {
        let range = Self { min_secs, max_secs };
        range.validate()?;
        Ok(range)
    }

    fn validate(&self) -> Result<()> {
        if self.min_secs > self.max_secs {
            return Err(ScraperError::InvalidConfig(format!(
                "delay range minimum {} exceeds maximum {}",
                self.min_secs, self.max_secs
            )));
        }
        Ok(())
    }

    /// Draws a whole number of seconds uniformly from the inclusive range.
    pub fn sample(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs(secs)
    }

    /// Whether `delay` lies inside the range.
    pub fn contains(&self, delay: Duration) -> bool {
        let min = Duration::from_secs(self.min_secs);
        let max = Duration::from_secs(self.max_secs);
        delay >= min && delay <= max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScraperConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.delay_range, DelayRange { min_secs: 5, max_secs: 15 });
        assert_eq!(config.output_path, PathBuf::from("response/results.json"));
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let config = ScraperConfig {
            max_attempts: 0,
            ..ScraperConfig::default()
        };
        assert!(matches!(config.validate(), Err(ScraperError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_inverted_delay_range() {
        assert!(matches!(
            DelayRange::new(10, 2),
            Err(ScraperError::InvalidConfig(_))
        ));
        assert!(DelayRange::new(3, 3).is_ok());
    }

    #[test]
    fn test_sample_stays_in_range() {
        let range = DelayRange::new(1, 4).unwrap();
        for _ in 0..200 {
            assert!(range.contains(range.sample()));
        }

        let fixed = DelayRange::new(0, 0).unwrap();
        assert_eq!(fixed.sample(), Duration::ZERO);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
max_attempts = 5
output_path = "out/articles.json"

[delay_range]
min_secs = 1
max_secs = 2
"#
        )
        .unwrap();

        let config = ScraperConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.delay_range, DelayRange { min_secs: 1, max_secs: 2 });
        assert_eq!(config.output_path, PathBuf::from("out/articles.json"));
        assert_eq!(config.base_url, crate::DEFAULT_BASE_URL);
        assert_eq!(config.selectors, SelectorConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[delay_range]\nmin_secs = 9\nmax_secs = 1").unwrap();

        let result = ScraperConfig::load(Some(file.path()));
        assert!(matches!(result, Err(ScraperError::InvalidConfig(_))));
    }

    #[test]
    fn test_environment_overrides_file_and_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "max_attempts = 5").unwrap();

        let vars = ::config::Map::from([
            ("ALMASRY_MAX_ATTEMPTS".to_string(), "7".to_string()),
            ("ALMASRY_DELAY_RANGE__MAX_SECS".to_string(), "20".to_string()),
        ]);
        let config =
            ScraperConfig::load_layers(Some(file.path()), environment().source(Some(vars))).unwrap();

        assert_eq!(config.max_attempts, 7);
        assert_eq!(config.delay_range, DelayRange { min_secs: 5, max_secs: 20 });
        assert_eq!(config.timeout_secs, 30);
    }
}
