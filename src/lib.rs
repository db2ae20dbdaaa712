//! # Developer Tools Research Agent
//!
//! Given a free-text query ("vector databases", "headless CMS"), the agent:
//! 1. finds comparison articles and asks the model for candidate tools
//! 2. researches each candidate's homepage and extracts structured facts
//! 3. asks the model for a short recommendation over everything gathered
//!
//! ```rust,ignore
//! let config = Config::from_env()?;
//! config.validate()?;
//! let workflow = Workflow::from_config(&config)?;
//! let state = workflow.run("vector databases").await?;
//! println!("{}", report::render(&state));
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod prompts;
pub mod report;
pub mod research;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{AgentError, ResearchError};
pub use llm::{LanguageModel, ModelPrompt, OpenAIModel};
pub use models::{CompanyRecord, RunState, RunUpdate, ToolAnalysis};
pub use research::{FirecrawlClient, ResearchClient, ScrapedPage, SearchHit};
pub use workflow::{ResearchLimits, Workflow, WorkflowStage};
