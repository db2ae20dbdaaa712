//! # Language Model Boundary
//!
//! Provider-agnostic interface the pipeline uses for its three model calls:
//! free-text completion (tool extraction, recommendation) and
//! schema-constrained extraction of a [`ToolAnalysis`].

mod openai;

pub use openai::{OpenAIModel, DEFAULT_MODEL};

use async_trait::async_trait;

use crate::error::AgentError;
use crate::models::ToolAnalysis;

/// A system instruction plus the user turn it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPrompt {
    pub system: String,
    pub user: String,
}

impl ModelPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Core model trait.
///
/// Implementations own model selection, temperature and transport; callers
/// decide what to do with failures.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Free-text completion. Returns the raw response content.
    async fn invoke(&self, prompt: &ModelPrompt) -> Result<String, AgentError>;

    /// Completion constrained to the [`ToolAnalysis`] schema.
    ///
    /// Fails with [`AgentError::StructuredOutput`] when the output cannot be
    /// coerced into the schema.
    async fn invoke_structured(&self, prompt: &ModelPrompt) -> Result<ToolAnalysis, AgentError>;

    /// Model identifier for logging
    fn model_name(&self) -> &str;
}
