use crate::client::{BrowserClient, PageClient};
use crate::fetch::{Pause, TokioPause};
use crate::{ArticleExtractor, ArticleRecord, Fetcher, Result, ScraperConfig, ScraperError};
use tracing::{error, info, instrument};
use url::Url;

/// The `NewsSearch` struct runs a keyword search and turns the listing into article records.
/// It fetches the search page with retries and hands the HTML to the extractor.
pub struct NewsSearch<C = BrowserClient, P = TokioPause> {
    /// The fetcher used to download the search page.
    fetcher: Fetcher<C, P>,
    /// The extractor used to read teaser items.
    extractor: ArticleExtractor,
    /// The origin of the site being searched.
    base_url: Url,
    /// The path of the search page.
    search_path: String,
}

impl NewsSearch {
    /// Creates a new `NewsSearch` with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration settings for the scraper.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `NewsSearch` instance, or an error if the client, URL or selectors are invalid.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Self::with_fetcher(config, Fetcher::from_config(config)?)
    }
}

impl<C: PageClient, P: Pause> NewsSearch<C, P> {
    /// Creates a `NewsSearch` around an already built fetcher.
    pub fn with_fetcher(config: &ScraperConfig, fetcher: Fetcher<C, P>) -> Result<Self> {
        Ok(Self {
            fetcher,
            extractor: ArticleExtractor::new(&config.base_url, &config.selectors)?,
            base_url: Url::parse(&config.base_url)?,
            search_path: config.search_path.clone(),
        })
    }

    /// Builds the search URL for a keyword.
    ///
    /// # Arguments
    ///
    /// * `keyword` - The free-text search term; it is percent-encoded into the query.
    pub fn search_url(&self, keyword: &str) -> Result<String> {
        let mut url = self.base_url.join(&self.search_path)?;
        url.set_query(Some(&format!("keyword={}", urlencoding::encode(keyword))));
        Ok(url.into())
    }

    /// Searches for `keyword` and returns at most `limit` articles.
    ///
    /// A page that cannot be fetched after every attempt yields an empty list, the same
    /// as a search with no matches; the difference is only visible in the logs.
    #[instrument(skip(self))]
    pub async fn scrape_articles(&self, keyword: &str, limit: usize) -> Vec<ArticleRecord> {
        let url = match self.search_url(keyword) {
            Ok(url) => url,
            Err(e) => {
                error!(error = %e, "Could not build search URL");
                return Vec::new();
            }
        };
        info!(%url, "Starting search");

        match self.fetcher.fetch(&url).await {
            Ok(response) => {
                let articles = self.extractor.extract(&response.body, limit);
                info!(count = articles.len(), "Scraped articles");
                articles
            }
            Err(e @ ScraperError::RetriesExhausted { .. }) => {
                error!(error = %e, "All scraping attempts failed; the site may be blocking requests");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "Search failed");
                Vec::new()
            }
        }
    }
}
