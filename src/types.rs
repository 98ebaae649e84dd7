use serde::{Deserialize, Serialize};

/// One article teaser pulled out of the search listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// The headline text of the teaser.
    pub title: String,
    /// The absolute URL of the article.
    pub url: String,
    /// The publication time as the site prints it (e.g. "منذ ساعتين").
    pub time: String,
    /// The thumbnail `src`, if the teaser has one.
    pub image: Option<String>,
}

/// The raw outcome of a single GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    /// Only an exact 200 counts as a usable page.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}
