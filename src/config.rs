//! # Configuration Module
//!
//! Settings come from environment variables (optionally via a `.env` file),
//! layered over defaults, then checked by [`Config::validate`] before any
//! network call is made.

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

use crate::llm::DEFAULT_MODEL;
use crate::research::DEFAULT_BASE_URL;
use crate::workflow::ResearchLimits;

/// Runtime configuration for the research agent.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI model used for every call
    pub model: String,

    /// Sampling temperature for free-text calls
    pub temperature: f64,

    pub openai_api_key: Option<String>,

    pub firecrawl_api_key: Option<String>,

    /// Firecrawl deployment (hosted or self-hosted)
    pub firecrawl_api_url: String,

    pub firecrawl_timeout_secs: u64,

    pub firecrawl_max_retries: u32,

    /// Comparison articles fetched during extraction
    pub article_results: usize,

    /// Characters kept per scraped article
    pub article_excerpt_chars: usize,

    /// Candidates researched per run
    pub max_tools: usize,

    /// Characters of a homepage sent to analysis
    pub analysis_content_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        let limits = ResearchLimits::default();
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            openai_api_key: None,
            firecrawl_api_key: None,
            firecrawl_api_url: DEFAULT_BASE_URL.to_string(),
            firecrawl_timeout_secs: 30,
            firecrawl_max_retries: 3,
            article_results: limits.article_results,
            article_excerpt_chars: limits.article_excerpt_chars,
            max_tools: limits.max_tools,
            analysis_content_chars: limits.analysis_content_chars,
        }
    }
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// A missing `.env` file is fine; a malformed numeric variable is not.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(val) = get("MODEL") {
            config.model = val;
        }
        config.openai_api_key = get("OPENAI_API_KEY");
        config.firecrawl_api_key = get("FIRECRAWL_API_KEY");
        if let Some(val) = get("FIRECRAWL_API_URL") {
            config.firecrawl_api_url = val;
        }

        parse_into(&get, "TEMPERATURE", "a floating-point number (e.g., 0.1)", &mut config.temperature)?;
        parse_into(&get, "FIRECRAWL_TIMEOUT_SECS", "a positive integer", &mut config.firecrawl_timeout_secs)?;
        parse_into(&get, "FIRECRAWL_MAX_RETRIES", "a non-negative integer", &mut config.firecrawl_max_retries)?;
        parse_into(&get, "ARTICLE_RESULTS", "a positive integer", &mut config.article_results)?;
        parse_into(&get, "ARTICLE_EXCERPT_CHARS", "a positive integer", &mut config.article_excerpt_chars)?;
        parse_into(&get, "MAX_TOOLS", "a positive integer", &mut config.max_tools)?;
        parse_into(&get, "ANALYSIS_CONTENT_CHARS", "a positive integer", &mut config.analysis_content_chars)?;

        Ok(config)
    }

    /// Check ranges and required credentials.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!(
                "TEMPERATURE must be between 0.0 and 2.0, got: {}",
                self.temperature
            );
        }

        if self.model.trim().is_empty() {
            anyhow::bail!("MODEL cannot be empty");
        }

        if self.openai_api_key.is_none() {
            anyhow::bail!("OPENAI_API_KEY is not set");
        }

        if self.firecrawl_api_key.is_none() {
            anyhow::bail!("FIRECRAWL_API_KEY is not set");
        }

        if !self.firecrawl_api_url.starts_with("http://")
            && !self.firecrawl_api_url.starts_with("https://")
        {
            anyhow::bail!(
                "FIRECRAWL_API_URL must be an http(s) URL, got: {}",
                self.firecrawl_api_url
            );
        }

        if self.firecrawl_timeout_secs == 0 {
            anyhow::bail!("FIRECRAWL_TIMEOUT_SECS must be at least 1");
        }

        for (name, value) in [
            ("ARTICLE_RESULTS", self.article_results),
            ("ARTICLE_EXCERPT_CHARS", self.article_excerpt_chars),
            ("MAX_TOOLS", self.max_tools),
            ("ANALYSIS_CONTENT_CHARS", self.analysis_content_chars),
        ] {
            if value == 0 {
                anyhow::bail!("{} must be at least 1", name);
            }
        }

        Ok(())
    }

    pub fn limits(&self) -> ResearchLimits {
        ResearchLimits {
            article_results: self.article_results,
            article_excerpt_chars: self.article_excerpt_chars,
            max_tools: self.max_tools,
            analysis_content_chars: self.analysis_content_chars,
        }
    }
}

fn parse_into<T, G>(get: &G, key: &str, expected: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    if let Some(val) = get(key) {
        *target = val
            .trim()
            .parse()
            .with_context(|| format!("{} must be {}, got: {}", key, expected, val))?;
    }
    Ok(())
}
