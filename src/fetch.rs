use crate::client::{BrowserClient, PageClient};
use crate::config::DelayRange;
use crate::{FetchResponse, Result, ScraperConfig, ScraperError};
use async_trait::async_trait;
use indicatif::ProgressBar;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Waits between attempts. Swapped for a recorder in tests.
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// The `RetryPolicy` struct bounds how many times a page is requested and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// The maximum number of attempts, at least 1.
    pub max_attempts: u32,
    /// The randomized wait after each failed attempt but the last.
    pub delay: DelayRange,
}

impl RetryPolicy {
    /// Creates a new `RetryPolicy`, rejecting a zero attempt budget.
    pub fn new(max_attempts: u32, delay: DelayRange) -> Result<Self> {
        if max_attempts == 0 {
            return Err(ScraperError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_attempts,
            delay,
        })
    }
}

impl From<&ScraperConfig> for RetryPolicy {
    fn from(config: &ScraperConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: config.delay_range,
        }
    }
}

enum Attempt {
    Attempting(u32),
    Succeeded(FetchResponse),
    Exhausted(ScraperError),
}

/// The `Fetcher` struct requests a page until it gets a 200 or runs out of attempts.
pub struct Fetcher<C = BrowserClient, P = TokioPause> {
    /// The client that performs each GET.
    client: C,
    /// The wait between attempts.
    pause: P,
    /// The attempt budget and delay bounds.
    policy: RetryPolicy,
    /// The spinner that shows which attempt is running.
    progress: ProgressBar,
}

impl Fetcher {
    /// Creates a `Fetcher` backed by a `BrowserClient` and real sleeps.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration settings for the scraper.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Fetcher`, or an error if the configuration is invalid
    /// or the client could not be created.
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        config.validate()?;
        let client = BrowserClient::new(&config.browser, config.timeout())?;
        Ok(Self::new(client, TokioPause, RetryPolicy::from(config)))
    }
}

impl<C: PageClient, P: Pause> Fetcher<C, P> {
    pub fn new(client: C, pause: P, policy: RetryPolicy) -> Self {
        Self {
            client,
            pause,
            policy,
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports attempt progress on the given spinner.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    #[cfg(test)]
    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    /// Fetches `url`, retrying on non-200 statuses and transport errors.
    ///
    /// # Arguments
    ///
    /// * `url` - The page to request.
    ///
    /// # Returns
    ///
    /// The first 200 response, or `ScraperError::RetriesExhausted` carrying the error
    /// from the final attempt.
    #[instrument(skip(self), fields(max_attempts = self.policy.max_attempts))]
    pub async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let max_attempts = self.policy.max_attempts;
        let mut state = Attempt::Attempting(1);

        loop {
            state = match state {
                Attempt::Attempting(attempt) => {
                    self.progress
                        .set_message(format!("Attempt {} of {}", attempt, max_attempts));
                    info!(attempt, max_attempts, "Fetching page");

                    match self.try_fetch(url).await {
                        Ok(response) => Attempt::Succeeded(response),
                        Err(e) if attempt < max_attempts => {
                            let delay = self.policy.delay.sample();
                            warn!(attempt, error = %e, delay_secs = delay.as_secs(), "Attempt failed, retrying");
                            self.pause.pause(delay).await;
                            Attempt::Attempting(attempt + 1)
                        }
                        Err(e) => {
                            warn!(attempt, error = %e, "Final attempt failed");
                            Attempt::Exhausted(ScraperError::RetriesExhausted {
                                attempts: attempt,
                                last: Box::new(e),
                            })
                        }
                    }
                }
                Attempt::Succeeded(response) => return Ok(response),
                Attempt::Exhausted(error) => return Err(error),
            };
        }
    }

    /// Runs one attempt and classifies anything but a 200 as a failure.
    async fn try_fetch(&self, url: &str) -> Result<FetchResponse> {
        let response = self.client.get(url).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ScraperError::StatusError(response.status))
        }
    }
}
