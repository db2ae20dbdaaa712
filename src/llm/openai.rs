//! OpenAI model via rig-core.
//!
//! Free-text calls go through a rig agent; structured calls go through a rig
//! extractor, which hands the model the JSON Schema derived from
//! [`ToolAnalysis`] and deserializes the result.

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::openai::Client;
use tracing::debug;

use super::{LanguageModel, ModelPrompt};
use crate::error::AgentError;
use crate::models::ToolAnalysis;

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI-backed [`LanguageModel`].
///
/// ```rust,ignore
/// // OPENAI_API_KEY from the environment
/// let model = OpenAIModel::from_env("gpt-4o-mini", 0.1);
///
/// // Or with an explicit key
/// let model = OpenAIModel::new("sk-...", "gpt-4o-mini", 0.1);
/// ```
pub struct OpenAIModel {
    client: Client,
    model: String,
    temperature: f64,
}

impl OpenAIModel {
    /// Build from `OPENAI_API_KEY`.
    pub fn from_env(model: impl Into<String>, temperature: f64) -> Self {
        Self {
            client: Client::from_env(),
            model: model.into(),
            temperature,
        }
    }

    pub fn new(api_key: impl Into<String>, model: impl Into<String>, temperature: f64) -> Self {
        let api_key: String = api_key.into();
        Self {
            client: Client::from_val(api_key.into()),
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAIModel {
    async fn invoke(&self, prompt: &ModelPrompt) -> Result<String, AgentError> {
        debug!(model = %self.model, chars = prompt.user.len(), "Invoking model");

        let agent = self
            .client
            .agent(&self.model)
            .preamble(&prompt.system)
            .temperature(self.temperature)
            .build();

        agent
            .prompt(prompt.user.as_str())
            .await
            .map_err(|e| AgentError::Llm(format!("OpenAI completion failed: {}", e)))
    }

    async fn invoke_structured(&self, prompt: &ModelPrompt) -> Result<ToolAnalysis, AgentError> {
        debug!(model = %self.model, chars = prompt.user.len(), "Invoking structured extraction");

        let extractor = self
            .client
            .extractor::<ToolAnalysis>(&self.model)
            .preamble(&prompt.system)
            .build();

        extractor
            .extract(prompt.user.as_str())
            .await
            .map_err(|e| AgentError::StructuredOutput(format!("ToolAnalysis extraction failed: {}", e)))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
