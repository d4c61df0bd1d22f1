//! Anthropic messages-API client for discovery.
//!
//! A thin, single-purpose client: one user message in, concatenated text
//! blocks out. HTTP-layer failures are translated into the discovery error
//! taxonomy so the router never inspects status codes. Credentials are
//! provided at construction time, never read per call.

use super::LlmResponse;
use crate::error::DiscoveryError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fast, cheap classifier model. Deployments can override via config.
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";

/// Response ceiling; discovery answers are a few JSON lines.
pub const DEFAULT_MAX_TOKENS: u32 = 300;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Provider seam: one prompt in, one response out, bounded by a deadline.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, prompt: &str, deadline: Duration)
        -> Result<LlmResponse, DiscoveryError>;
}

pub struct AnthropicClient {
    client: reqwest::Client,
    messages_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    content: Vec<ResponseBlock>,
    model: Option<String>,
    stop_reason: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text { text: String },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

impl AnthropicClient {
    pub fn new(
        api_key: String,
        model: String,
        max_tokens: u32,
        base_url: Option<&str>,
    ) -> Self {
        let base = base_url
            .unwrap_or("https://api.anthropic.com")
            .trim_end_matches('/');
        Self {
            client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            messages_url: format!("{base}/v1/messages"),
            api_key,
            model,
            max_tokens,
        }
    }

    fn classify_status(status: StatusCode, body: &str) -> DiscoveryError {
        let detail = truncate(body, MAX_ERROR_BODY_CHARS);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                DiscoveryError::Auth(format!("{status}: {detail}"))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                DiscoveryError::RateLimited(format!("{status}: {detail}"))
            }
            other => DiscoveryError::Client(format!("{other}: {detail}")),
        }
    }

    fn classify_transport(err: reqwest::Error) -> DiscoveryError {
        if err.is_timeout() || err.is_connect() {
            DiscoveryError::Timeout(err.to_string())
        } else {
            DiscoveryError::Client(err.to_string())
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn invoke(
        &self,
        prompt: &str,
        deadline: Duration,
    ) -> Result<LlmResponse, DiscoveryError> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.messages_url)
            .timeout(deadline)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, &body));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| DiscoveryError::Client(format!("malformed provider body: {e}")))?;

        let text = chat
            .content
            .iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text.as_str()),
                ResponseBlock::Unsupported => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(LlmResponse {
            text,
            model: chat.model.unwrap_or_else(|| self.model.clone()),
            prompt_tokens: chat.usage.as_ref().map(|u| u.input_tokens),
            completion_tokens: chat.usage.as_ref().map(|u| u.output_tokens),
            finish_reason: chat.stop_reason,
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}
