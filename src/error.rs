//! # Error Types
//!
//! Library errors are typed with `thiserror`. The binary wraps them in
//! `anyhow` for context.
//!
//! Two layers:
//! - [`ResearchError`]: transport-level failures from the search/scrape API
//! - [`AgentError`]: everything the pipeline can surface to a caller

use thiserror::Error;

/// Typed errors for the search/scrape provider.
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized - check FIRECRAWL_API_KEY")]
    Unauthorized,

    #[error("Payment required - research credits exhausted")]
    PaymentRequired,

    #[error("Rate limited - too many requests")]
    RateLimited,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("HTTP error ({0}): {1}")]
    HttpError(u16, String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Provider reported failure: {0}")]
    Unsuccessful(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ResearchError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ResearchError::Timeout
                | ResearchError::Connection(_)
                | ResearchError::RateLimited
                | ResearchError::ServerError(_, _)
        )
    }

    /// Classify a reqwest send error.
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ResearchError::Timeout
        } else if e.is_connect() {
            ResearchError::Connection(e.to_string())
        } else {
            ResearchError::Network(e.to_string())
        }
    }

    /// Classify a non-success HTTP status.
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            400 => ResearchError::BadRequest(body),
            401 => ResearchError::Unauthorized,
            402 => ResearchError::PaymentRequired,
            429 => ResearchError::RateLimited,
            500..=599 => ResearchError::ServerError(status, body),
            _ => ResearchError::HttpError(status, body),
        }
    }
}

/// Top-level pipeline error.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Structured output error: {0}")]
    StructuredOutput(String),

    #[error("Research client error: {0}")]
    Research(#[from] ResearchError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
