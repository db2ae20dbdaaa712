//! # Research Workflow
//!
//! Three sequential stages over one [`RunState`]:
//!
//! ```text
//! START ─▶ Extracting ─▶ Researching ─▶ Synthesizing ─▶ Done
//! ```
//!
//! - **Extracting**: search comparison articles, scrape them, ask the model
//!   for candidate tool names. Any failure degrades to an empty list.
//! - **Researching**: for up to [`ResearchLimits::max_tools`] candidates (or
//!   direct-search titles when there are none), find the official site,
//!   scrape it and run structured analysis. Failures stay per candidate.
//! - **Synthesizing**: one model call over all records. Errors here end the
//!   run.
//!
//! Each stage reads the current state and returns a [`RunUpdate`]; `run`
//! merges it into the next state. Stages never overlap and candidates are
//! handled one at a time, in order.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AgentError;
use crate::llm::{LanguageModel, OpenAIModel};
use crate::models::{CompanyRecord, RunState, RunUpdate, ToolAnalysis};
use crate::prompts;
use crate::research::{FirecrawlClient, ResearchClient};

/// Appended to the query when looking for comparison articles
pub const ARTICLE_QUERY_SUFFIX: &str = "tools comparison best alternatives";

/// Appended to a tool name when looking for its homepage
pub const OFFICIAL_SITE_SUFFIX: &str = "official site";

/// Name used for a direct-search hit without a title
pub const UNKNOWN_TOOL_NAME: &str = "Unknown";

/// Fan-out and truncation bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResearchLimits {
    /// Comparison articles fetched during extraction
    pub article_results: usize,
    /// Characters kept from each scraped article
    pub article_excerpt_chars: usize,
    /// Candidates researched (also the direct-search result count)
    pub max_tools: usize,
    /// Characters of a tool's page sent to structured analysis
    pub analysis_content_chars: usize,
}

impl Default for ResearchLimits {
    fn default() -> Self {
        Self {
            article_results: 3,
            article_excerpt_chars: 1500,
            max_tools: 4,
            analysis_content_chars: 2500,
        }
    }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowStage {
    Extracting,
    Researching,
    Synthesizing,
    Done,
}

impl WorkflowStage {
    /// The stage that follows this one. `None` after `Done`.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Extracting => Some(Self::Researching),
            Self::Researching => Some(Self::Synthesizing),
            Self::Synthesizing => Some(Self::Done),
            Self::Done => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Extracting => "extracting",
            Self::Researching => "researching",
            Self::Synthesizing => "synthesizing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Orchestrates model and research calls for one query at a time.
pub struct Workflow {
    model: Arc<dyn LanguageModel>,
    research: Arc<dyn ResearchClient>,
    limits: ResearchLimits,
}

impl Workflow {
    pub fn new(model: Arc<dyn LanguageModel>, research: Arc<dyn ResearchClient>) -> Self {
        Self {
            model,
            research,
            limits: ResearchLimits::default(),
        }
    }

    /// Wire the production OpenAI model and Firecrawl client from config.
    pub fn from_config(config: &Config) -> Result<Self, AgentError> {
        let openai_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| AgentError::Config("OPENAI_API_KEY is not set".to_string()))?;
        let firecrawl_key = config
            .firecrawl_api_key
            .clone()
            .ok_or_else(|| AgentError::Config("FIRECRAWL_API_KEY is not set".to_string()))?;

        let model = OpenAIModel::new(openai_key, &config.model, config.temperature);
        let research = FirecrawlClient::new(firecrawl_key)
            .with_base_url(&config.firecrawl_api_url)
            .with_timeout(Duration::from_secs(config.firecrawl_timeout_secs))
            .with_max_retries(config.firecrawl_max_retries);

        Ok(Self::new(Arc::new(model), Arc::new(research)).with_limits(config.limits()))
    }

    pub fn with_limits(mut self, limits: ResearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &ResearchLimits {
        &self.limits
    }

    /// Run every stage for `query` and return the final state.
    ///
    /// Only a synthesis failure is returned as an error; everything earlier
    /// degrades into partial data.
    pub async fn run(&self, query: &str) -> Result<RunState, AgentError> {
        info!(
            query = %query,
            model = %self.model.model_name(),
            research = %self.research.name(),
            "Starting research run"
        );

        let mut state = RunState::new(query);
        let mut stage = WorkflowStage::Extracting;

        while !stage.is_terminal() {
            debug!(stage = %stage, "Entering stage");

            let update = match stage {
                WorkflowStage::Extracting => self.extract_tools(&state).await,
                WorkflowStage::Researching => self.research_tools(&state).await,
                WorkflowStage::Synthesizing => self.synthesize(&state).await?,
                WorkflowStage::Done => RunUpdate::default(),
            };
            state = state.apply_update(update);

            stage = match stage.next() {
                Some(next) => next,
                None => break,
            };
        }

        info!(
            query = %query,
            companies = state.companies.len(),
            "Research run complete"
        );
        Ok(state)
    }

    /// Stage 1: candidate tool names from comparison articles.
    pub async fn extract_tools(&self, state: &RunState) -> RunUpdate {
        info!(query = %state.query, "Finding articles");

        let article_query = format!("{} {}", state.query, ARTICLE_QUERY_SUFFIX);
        let hits = match self
            .research
            .search(&article_query, self.limits.article_results)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(query = %article_query, error = %e, "Article search failed");
                return RunUpdate::with_extracted_tools(Vec::new());
            }
        };

        let mut all_content = String::new();
        for hit in &hits {
            if let Some(page) = self.research.scrape(&hit.url).await {
                all_content.push_str(truncate_chars(
                    &page.markdown,
                    self.limits.article_excerpt_chars,
                ));
                all_content.push_str("\n\n");
            }
        }
        debug!(articles = hits.len(), chars = all_content.len(), "Collected article content");

        let prompt = prompts::tool_extraction(&state.query, &all_content);
        let tool_names = match self.model.invoke(&prompt).await {
            Ok(content) => parse_tool_names(&content),
            Err(e) => {
                warn!(error = %e, "Tool extraction failed");
                Vec::new()
            }
        };

        info!(
            count = tool_names.len(),
            tools = %tool_names.iter().take(5).cloned().collect::<Vec<_>>().join(", "),
            "Extracted tools"
        );

        RunUpdate::with_extracted_tools(tool_names).with_search_results(hits)
    }

    /// Stage 2: one [`CompanyRecord`] per researched candidate.
    pub async fn research_tools(&self, state: &RunState) -> RunUpdate {
        let max_tools = self.limits.max_tools;

        let (tool_names, captured) = if state.extracted_tools.is_empty() {
            info!(query = %state.query, "No extracted tools found, falling back to direct search");
            match self.research.search(&state.query, max_tools).await {
                Ok(hits) => {
                    let names = hits
                        .iter()
                        .map(|hit| hit.title().unwrap_or(UNKNOWN_TOOL_NAME).to_string())
                        .collect();
                    (names, hits)
                }
                Err(e) => {
                    warn!(query = %state.query, error = %e, "Direct search failed");
                    (Vec::new(), Vec::new())
                }
            }
        } else {
            (state.extracted_tools.clone(), Vec::new())
        };

        let tool_names: Vec<String> = tool_names.into_iter().take(max_tools).collect();
        info!(tools = %tool_names.join(", "), "Researching specific tools");

        let mut companies = Vec::with_capacity(tool_names.len());
        for name in &tool_names {
            if let Some(company) = self.research_tool(name).await {
                companies.push(company);
            }
        }

        RunUpdate::with_companies(companies).with_search_results(captured)
    }

    /// Research a single candidate. `None` when no usable homepage was found.
    async fn research_tool(&self, name: &str) -> Option<CompanyRecord> {
        let phrase = format!("{} {}", name, OFFICIAL_SITE_SUFFIX);

        let hit = match self.research.search(&phrase, 1).await {
            Ok(hits) => match hits.into_iter().next() {
                Some(hit) => hit,
                None => {
                    warn!(tool = %name, "No official site found, skipping");
                    return None;
                }
            },
            Err(e) => {
                warn!(tool = %name, error = %e, "Official site search failed, skipping");
                return None;
            }
        };

        if hit.url.trim().is_empty() {
            warn!(tool = %name, "Official site result has no URL, skipping");
            return None;
        }

        let mut company = CompanyRecord::seeded(name, hit.snippet(), hit.url.as_str());

        match self.research.scrape(&hit.url).await {
            Some(page) => {
                let analysis = self.analyze_company(name, &page.markdown).await;
                company.apply_analysis(analysis);
            }
            None => {
                warn!(tool = %name, url = %hit.url, "Scrape failed, keeping search snippet");
            }
        }

        Some(company)
    }

    /// Structured analysis of one tool's page; [`ToolAnalysis::failed`] on error.
    pub async fn analyze_company(&self, name: &str, content: &str) -> ToolAnalysis {
        let prompt = prompts::tool_analysis(name, content, self.limits.analysis_content_chars);

        match self.model.invoke_structured(&prompt).await {
            Ok(analysis) => {
                debug!(tool = %name, pricing = %analysis.pricing_model, "Analyzed tool");
                analysis
            }
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool analysis failed");
                ToolAnalysis::failed()
            }
        }
    }

    /// Stage 3: recommendation over all records. Errors propagate.
    pub async fn synthesize(&self, state: &RunState) -> Result<RunUpdate, AgentError> {
        info!(companies = state.companies.len(), "Generating recommendations");

        let company_data = state
            .companies
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?
            .join("\n");

        let prompt = prompts::recommendations(&state.query, &company_data);
        let analysis = self.model.invoke(&prompt).await?;

        Ok(RunUpdate::with_analysis(analysis))
    }
}

/// One name per non-blank line, whitespace trimmed.
pub fn parse_tool_names(content: &str) -> Vec<String> {
    content
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// First `max_chars` characters of `s`, never splitting a code point.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
