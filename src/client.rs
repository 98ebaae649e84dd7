use crate::config::BrowserProfile;
use crate::{FetchResponse, Result, ScraperError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Issues a single GET and reports what came back.
///
/// Anything that gets past a site's browser check lives behind this trait, so the retry
/// loop can be driven by a scripted client in tests.
#[async_trait]
pub trait PageClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse>;
}

/// The `BrowserClient` struct is a reqwest client that presents itself as desktop Chrome.
/// Cookies set by a challenge page are kept, so a later attempt can pass the check.
pub struct BrowserClient {
    /// The HTTP client used for making requests.
    client: Client,
}

impl BrowserClient {
    /// Creates a new `BrowserClient` with the given identity and timeout.
    ///
    /// # Arguments
    ///
    /// * `profile` - The header values to present on every request.
    /// * `timeout` - The timeout applied to each request.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `BrowserClient`, or an error if a header value is invalid
    /// or the client could not be created.
    pub fn new(profile: &BrowserProfile, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&profile.user_agent)
            .default_headers(browser_headers(profile)?)
            .cookie_store(true)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(ScraperError::RequestError)?;

        Ok(Self { client })
    }
}

fn browser_headers(profile: &BrowserProfile) -> Result<HeaderMap> {
    let value = |name: &str, raw: &str| {
        HeaderValue::from_str(raw)
            .map_err(|e| ScraperError::InvalidConfig(format!("header {}: {}", name, e)))
    };

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, value("accept", &profile.accept)?);
    headers.insert(ACCEPT_LANGUAGE, value("accept_language", &profile.accept_language)?);
    headers.insert(REFERER, value("referer", &profile.referer)?);
    if profile.do_not_track {
        headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
    }
    Ok(headers)
}

#[async_trait]
impl PageClient for BrowserClient {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        debug!(status, %url, "Response received");

        let body = response.text().await?;
        Ok(FetchResponse { status, body })
    }
}
