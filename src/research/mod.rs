//! # Research Client
//!
//! Boundary to the web search/scrape provider. The pipeline only sees the
//! [`ResearchClient`] trait and the typed [`SearchHit`] / [`ScrapedPage`]
//! records; [`FirecrawlClient`] is the production implementation.
//!
//! Contract:
//! - `search` returns at most `num_results` hits, `Ok(vec![])` for "nothing
//!   found", and `Err` only for transport/provider failures.
//! - `scrape` returns `None` for any failure (paywall, 404, timeout, empty
//!   page). It never errors.

mod firecrawl;

pub use firecrawl::{FirecrawlClient, DEFAULT_BASE_URL};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ResearchError;

/// Metadata the provider attaches to a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, rename = "sourceURL")]
    pub source_url: Option<String>,
}

/// A single search hit.
///
/// Only `url` is guaranteed (possibly empty). Everything else is optional and
/// read through the accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Page body, present when the search also scraped the result.
    #[serde(default)]
    pub markdown: Option<String>,

    #[serde(default)]
    pub metadata: Option<PageMetadata>,
}

impl SearchHit {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.get_or_insert_with(PageMetadata::default).title = Some(title.into());
        self
    }

    pub fn with_markdown(mut self, markdown: impl Into<String>) -> Self {
        self.markdown = Some(markdown.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Page title: metadata title first, then the top-level title.
    /// Blank titles count as absent.
    pub fn title(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.title.as_deref())
            .or(self.title.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Raw text of the hit: markdown body, else the description, else empty.
    pub fn snippet(&self) -> &str {
        self.markdown
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or_default()
    }
}

/// Content of a successfully scraped page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPage {
    #[serde(default)]
    pub markdown: String,

    #[serde(default)]
    pub metadata: Option<PageMetadata>,
}

impl ScrapedPage {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            metadata: None,
        }
    }
}

/// Search and scrape operations the pipeline depends on.
#[async_trait]
pub trait ResearchClient: Send + Sync {
    /// Keyword search returning at most `num_results` hits.
    async fn search(&self, phrase: &str, num_results: usize)
        -> Result<Vec<SearchHit>, ResearchError>;

    /// Fetch a page as markdown. `None` on any failure.
    async fn scrape(&self, url: &str) -> Option<ScrapedPage>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
