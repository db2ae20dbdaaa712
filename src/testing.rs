//! Test doubles for the pipeline's two collaborators.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::error::{AgentError, ResearchError};
use crate::llm::{LanguageModel, ModelPrompt};
use crate::models::ToolAnalysis;
use crate::research::{ResearchClient, ScrapedPage, SearchHit};

/// A model that replays queued responses in FIFO order.
///
/// Free-text and structured calls have separate queues. An empty queue is an
/// error, so unexpected calls fail loudly.
#[derive(Default)]
pub struct ScriptedModel {
    text_responses: Mutex<VecDeque<Result<String, String>>>,
    structured_responses: Mutex<VecDeque<Result<ToolAnalysis, String>>>,
    /// Prompts seen by `invoke`
    pub text_prompts: Mutex<Vec<ModelPrompt>>,
    /// Prompts seen by `invoke_structured`
    pub structured_prompts: Mutex<Vec<ModelPrompt>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_text(self, content: &str) -> Self {
        self.text_responses
            .lock()
            .unwrap()
            .push_back(Ok(content.to_string()));
        self
    }

    pub fn queue_text_error(self, message: &str) -> Self {
        self.text_responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn queue_analysis(self, analysis: ToolAnalysis) -> Self {
        self.structured_responses
            .lock()
            .unwrap()
            .push_back(Ok(analysis));
        self
    }

    pub fn queue_analysis_error(self, message: &str) -> Self {
        self.structured_responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn text_call_count(&self) -> usize {
        self.text_prompts.lock().unwrap().len()
    }

    pub fn structured_call_count(&self) -> usize {
        self.structured_prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn invoke(&self, prompt: &ModelPrompt) -> Result<String, AgentError> {
        self.text_prompts.lock().unwrap().push(prompt.clone());
        match self.text_responses.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(content),
            Some(Err(message)) => Err(AgentError::Llm(message)),
            None => Err(AgentError::Llm("No mock response queued".to_string())),
        }
    }

    async fn invoke_structured(&self, prompt: &ModelPrompt) -> Result<ToolAnalysis, AgentError> {
        self.structured_prompts.lock().unwrap().push(prompt.clone());
        match self.structured_responses.lock().unwrap().pop_front() {
            Some(Ok(analysis)) => Ok(analysis),
            Some(Err(message)) => Err(AgentError::StructuredOutput(message)),
            None => Err(AgentError::StructuredOutput(
                "No mock analysis queued".to_string(),
            )),
        }
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

enum SearchOutcome {
    Hits(Vec<SearchHit>),
    Fail,
}

/// In-memory research client keyed by exact search phrase and URL.
///
/// Unknown phrases return no hits; unknown URLs fail to scrape.
#[derive(Default)]
pub struct StubResearchClient {
    searches: HashMap<String, SearchOutcome>,
    pages: HashMap<String, ScrapedPage>,
    /// `(phrase, num_results)` for every search call
    pub search_calls: Mutex<Vec<(String, usize)>>,
    /// URL of every scrape call
    pub scrape_calls: Mutex<Vec<String>>,
}

impl StubResearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, phrase: &str, hits: Vec<SearchHit>) -> Self {
        self.searches
            .insert(phrase.to_string(), SearchOutcome::Hits(hits));
        self
    }

    pub fn with_search_failure(mut self, phrase: &str) -> Self {
        self.searches.insert(phrase.to_string(), SearchOutcome::Fail);
        self
    }

    pub fn with_page(mut self, url: &str, markdown: &str) -> Self {
        self.pages.insert(url.to_string(), ScrapedPage::new(markdown));
        self
    }

    pub fn searched_phrases(&self) -> Vec<String> {
        self.search_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(phrase, _)| phrase.clone())
            .collect()
    }
}

#[async_trait]
impl ResearchClient for StubResearchClient {
    async fn search(
        &self,
        phrase: &str,
        num_results: usize,
    ) -> Result<Vec<SearchHit>, ResearchError> {
        self.search_calls
            .lock()
            .unwrap()
            .push((phrase.to_string(), num_results));

        match self.searches.get(phrase) {
            Some(SearchOutcome::Hits(hits)) => Ok(hits.iter().take(num_results).cloned().collect()),
            Some(SearchOutcome::Fail) => Err(ResearchError::Timeout),
            None => Ok(Vec::new()),
        }
    }

    async fn scrape(&self, url: &str) -> Option<ScrapedPage> {
        self.scrape_calls.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned()
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Analysis with a distinctive description, for asserting it was applied.
pub fn analysis_for(name: &str) -> ToolAnalysis {
    ToolAnalysis {
        pricing_model: "Freemium".to_string(),
        is_open_source: Some(true),
        tech_stack: vec!["Rust".to_string(), "gRPC".to_string()],
        description: format!("{} stores and queries embeddings", name),
        api_available: Some(true),
        language_support: vec!["Python".to_string(), "TypeScript".to_string()],
        integration_capabilities: vec!["LangChain".to_string()],
    }
}
