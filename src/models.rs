//! # Data Model
//!
//! Plain records shared by every pipeline stage:
//! - [`ToolAnalysis`]: schema the model fills in for one tool
//! - [`CompanyRecord`]: everything known about one researched tool
//! - [`RunState`]: the aggregate for one run, built up from [`RunUpdate`]s

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::research::SearchHit;

/// Pricing label used when nothing could be determined.
pub const UNKNOWN_PRICING: &str = "Unknown";

/// Description marker carried only by [`ToolAnalysis::failed`].
pub const FAILED_DESCRIPTION: &str = "Failed";

/// Structured facts extracted from a tool's website.
///
/// Doubles as the JSON Schema handed to the model, so the field docs are
/// written for the model as much as for readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolAnalysis {
    /// One of "Free", "Freemium", "Paid", "Enterprise" or "Unknown".
    #[serde(default = "default_pricing_model")]
    pub pricing_model: String,

    /// true if open source, false if proprietary, null if unclear.
    #[serde(default)]
    pub is_open_source: Option<bool>,

    /// Languages, frameworks, databases and APIs the tool uses or supports.
    #[serde(default)]
    pub tech_stack: Vec<String>,

    /// One sentence on what the tool does for developers.
    #[serde(default)]
    pub description: String,

    /// true if a REST/GraphQL API, SDK or other programmatic access exists.
    #[serde(default)]
    pub api_available: Option<bool>,

    /// Programming languages explicitly supported.
    #[serde(default)]
    pub language_support: Vec<String>,

    /// Tools and platforms it integrates with.
    #[serde(default)]
    pub integration_capabilities: Vec<String>,
}

fn default_pricing_model() -> String {
    UNKNOWN_PRICING.to_string()
}

impl Default for ToolAnalysis {
    fn default() -> Self {
        Self {
            pricing_model: default_pricing_model(),
            is_open_source: None,
            tech_stack: Vec::new(),
            description: String::new(),
            api_available: None,
            language_support: Vec::new(),
            integration_capabilities: Vec::new(),
        }
    }
}

impl ToolAnalysis {
    /// Placeholder substituted when structured extraction fails.
    pub fn failed() -> Self {
        Self {
            description: FAILED_DESCRIPTION.to_string(),
            ..Self::default()
        }
    }

    /// Whether this is the [`ToolAnalysis::failed`] placeholder.
    pub fn is_failed(&self) -> bool {
        *self == Self::failed()
    }
}

/// A researched tool/company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,

    /// Raw search snippet until analysis replaces it.
    pub description: String,

    pub website: String,

    pub pricing_model: Option<String>,

    pub is_open_source: Option<bool>,

    #[serde(default)]
    pub tech_stack: Vec<String>,

    /// Reserved: nothing populates this yet.
    #[serde(default)]
    pub competitors: Vec<String>,

    pub api_available: Option<bool>,

    #[serde(default)]
    pub language_support: Vec<String>,

    #[serde(default)]
    pub integration_capabilities: Vec<String>,

    /// Reserved tier label ("Poor", "Good", "Excellent").
    pub developer_experience_rating: Option<String>,
}

impl CompanyRecord {
    /// Seed a record from the official-site search result.
    pub fn seeded(
        name: impl Into<String>,
        description: impl Into<String>,
        website: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            website: website.into(),
            pricing_model: None,
            is_open_source: None,
            tech_stack: Vec::new(),
            competitors: Vec::new(),
            api_available: None,
            language_support: Vec::new(),
            integration_capabilities: Vec::new(),
            developer_experience_rating: None,
        }
    }

    /// Overwrite the analysis-derived fields, description included.
    pub fn apply_analysis(&mut self, analysis: ToolAnalysis) {
        self.pricing_model = Some(analysis.pricing_model);
        self.is_open_source = analysis.is_open_source;
        self.tech_stack = analysis.tech_stack;
        self.description = analysis.description;
        self.api_available = analysis.api_available;
        self.language_support = analysis.language_support;
        self.integration_capabilities = analysis.integration_capabilities;
    }

    /// True once any analysis (including the failure placeholder) was applied.
    pub fn is_analyzed(&self) -> bool {
        self.pricing_model.is_some()
    }

    /// True if the applied analysis was the failure placeholder.
    pub fn analysis_failed(&self) -> bool {
        self.pricing_model.as_deref() == Some(UNKNOWN_PRICING)
            && self.description == FAILED_DESCRIPTION
            && self.is_open_source.is_none()
            && self.api_available.is_none()
            && self.tech_stack.is_empty()
            && self.language_support.is_empty()
            && self.integration_capabilities.is_empty()
    }
}

/// Aggregate for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    /// Original query, never modified after creation.
    pub query: String,

    /// Candidate tool names from the extraction stage, in model order.
    pub extracted_tools: Vec<String>,

    /// Researched records, in processing order.
    pub companies: Vec<CompanyRecord>,

    /// Search hits captured along the way. Not consumed downstream.
    pub search_results: Vec<SearchHit>,

    /// Final recommendation text; set only by the synthesis stage.
    pub analysis: Option<String>,
}

impl RunState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Merge a stage's output into a new state.
    ///
    /// Replacement fields overwrite only when present; search hits append.
    pub fn apply_update(mut self, update: RunUpdate) -> Self {
        if let Some(tools) = update.extracted_tools {
            self.extracted_tools = tools;
        }
        if let Some(companies) = update.companies {
            self.companies = companies;
        }
        self.search_results.extend(update.search_results);
        if let Some(analysis) = update.analysis {
            self.analysis = Some(analysis);
        }
        self
    }
}

/// Partial output of one stage.
#[derive(Debug, Clone, Default)]
pub struct RunUpdate {
    pub extracted_tools: Option<Vec<String>>,
    pub companies: Option<Vec<CompanyRecord>>,
    pub search_results: Vec<SearchHit>,
    pub analysis: Option<String>,
}

impl RunUpdate {
    pub fn with_extracted_tools(tools: Vec<String>) -> Self {
        Self {
            extracted_tools: Some(tools),
            ..Default::default()
        }
    }

    pub fn with_companies(companies: Vec<CompanyRecord>) -> Self {
        Self {
            companies: Some(companies),
            ..Default::default()
        }
    }

    pub fn with_analysis(analysis: impl Into<String>) -> Self {
        Self {
            analysis: Some(analysis.into()),
            ..Default::default()
        }
    }

    /// Attach captured search hits.
    pub fn with_search_results(mut self, hits: Vec<SearchHit>) -> Self {
        self.search_results = hits;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.extracted_tools.is_none()
            && self.companies.is_none()
            && self.search_results.is_empty()
            && self.analysis.is_none()
    }
}
