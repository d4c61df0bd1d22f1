//! Tier 3: LLM-backed discovery.
//!
//! Three parts behind one façade: a prompt builder over the catalog
//! listings, a provider client with a typed failure taxonomy, and a JSON
//! response parser. Provider failures propagate to the router; parse
//! failures degrade into an empty result carrying the error text, so a
//! confused model never crashes a route.

mod client;
mod parser;
mod prompt;

pub use client::{AnthropicClient, LlmClient, DEFAULT_MODEL};
pub use parser::parse_response;
pub use prompt::build_prompt;

use crate::catalog::Catalog;
use crate::config::DiscoveryConfig;
use crate::error::DiscoveryError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Whether a discovery match names a task or a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryKind {
    Task,
    Skill,
}

/// One candidate the model proposed, with its confidence and rationale.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryMatch {
    pub kind: DiscoveryKind,
    pub name: String,
    /// In [0.0, 1.0]; slightly out-of-range values are clamped at parse time.
    pub confidence: f64,
    pub reasoning: String,
}

/// Raw provider response plus token accounting.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub model: String,
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub finish_reason: Option<String>,
}

/// Parsed discovery outcome: matches sorted by confidence descending, plus
/// the raw text for debugging.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryResult {
    pub matches: Vec<DiscoveryMatch>,
    pub raw_response: String,
    pub model: String,
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
}

impl DiscoveryResult {
    pub fn top(&self) -> Option<&DiscoveryMatch> {
        self.matches.first()
    }

    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Tier 3 seam used by the router.
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn discover(
        &self,
        query: &str,
        catalog: &Catalog,
    ) -> Result<DiscoveryResult, DiscoveryError>;
}

/// The production façade: prompt → provider → parse.
pub struct LlmDiscovery {
    client: Arc<dyn LlmClient>,
    max_results: usize,
    deadline: Duration,
}

impl LlmDiscovery {
    pub fn new(client: Arc<dyn LlmClient>, max_results: usize, deadline: Duration) -> Self {
        Self {
            client,
            max_results,
            deadline,
        }
    }
}

#[async_trait]
impl Discovery for LlmDiscovery {
    async fn discover(
        &self,
        query: &str,
        catalog: &Catalog,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        let prompt = build_prompt(query, &catalog.tasks, &catalog.skills, self.max_results)?;
        let response = self.client.invoke(&prompt, self.deadline).await?;

        match parse_response(&response) {
            Ok(result) => Ok(result),
            Err(err @ DiscoveryError::Parse(_)) => {
                tracing::warn!(raw = %response.text, "discovery response unparseable, degrading");
                Ok(DiscoveryResult {
                    matches: Vec::new(),
                    raw_response: err.to_string(),
                    model: response.model,
                    prompt_tokens: response.prompt_tokens,
                    completion_tokens: response.completion_tokens,
                })
            }
            Err(other) => Err(other),
        }
    }
}

/// Discovery that always declines. Used when Tier 3 is disabled or no
/// credentials are configured; routing then degrades to an error result
/// instead of failing at startup.
pub struct NoopDiscovery;

#[async_trait]
impl Discovery for NoopDiscovery {
    async fn discover(
        &self,
        _query: &str,
        _catalog: &Catalog,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        Ok(DiscoveryResult {
            model: "no-op".to_string(),
            ..Default::default()
        })
    }
}

/// Wire up discovery from configuration. Credentials are read here, once,
/// never per request.
pub fn create_discovery(config: &DiscoveryConfig) -> Arc<dyn Discovery> {
    if !config.enabled {
        tracing::debug!("discovery disabled by config");
        return Arc::new(NoopDiscovery);
    }
    match config.resolve_api_key() {
        Some(api_key) => {
            let client = AnthropicClient::new(
                api_key,
                config.model.clone(),
                config.max_tokens,
                config.base_url.as_deref(),
            );
            Arc::new(LlmDiscovery::new(
                Arc::new(client),
                config.max_results,
                Duration::from_millis(config.timeout_ms),
            ))
        }
        None => {
            tracing::warn!(
                env = %config.api_key_env,
                "no API key configured, LLM discovery disabled"
            );
            Arc::new(NoopDiscovery)
        }
    }
}
