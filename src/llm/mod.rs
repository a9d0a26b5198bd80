//! LLM client for keyword enrichment
//!
//! This module collapses a candidate game name plus its page title into
//! one normalized SEO keyword via an OpenAI-compatible chat-completions
//! endpoint. Enrichment failures are per-item and non-fatal: the hit is
//! carried forward with an empty keyword and the run continues. No
//! retries, no exactly-once guarantee.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::{EnrichedHit, SearchHit};
use crate::report::Reporter;

/// Fixed system instruction constraining the completion to one keyword
const SYSTEM_PROMPT: &str = "You are a Google SEO expert. I will give you some game information, \
and you need to help me summarize the information into a single Google SEO keyword. \
Please output only the keyword.";

/// Errors that can occur during keyword enrichment
#[derive(Error, Debug)]
pub enum EnrichError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the completions endpoint
    #[error("Completions endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response carried no completion text
    #[error("Empty completion response")]
    EmptyResponse,

    /// No API key configured
    #[error("No API key configured for the text-generation service")]
    MissingApiKey,
}

/// Configuration for the text-generation client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL
    pub endpoint: String,

    /// API key; read from the environment when absent from the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name to use
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("TRENDSCOUT_LLM_ENDPOINT")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            model: std::env::var("TRENDSCOUT_LLM_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            timeout_secs: std::env::var("TRENDSCOUT_LLM_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
        }
    }
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

/// One chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

/// Keyword enricher backed by a chat-completions endpoint
pub struct KeywordEnricher {
    client: Client,
    config: LlmConfig,
    reporter: Reporter,
}

impl KeywordEnricher {
    /// Create a new enricher with the given config
    pub fn new(config: LlmConfig, reporter: Reporter) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            reporter,
        })
    }

    /// Build the user message from a hit's name and title
    ///
    /// The title is appended only when it differs from the candidate
    /// name; a hit with no candidate name is enriched from its title.
    fn build_user_message(hit: &SearchHit) -> String {
        let name = hit.candidate_name.as_deref().unwrap_or(&hit.title);
        if name != hit.title {
            format!("{name} {}", hit.title)
        } else {
            name.to_string()
        }
    }

    /// Enrich one hit; failures degrade to an empty keyword
    pub async fn enrich(&self, hit: SearchHit) -> EnrichedHit {
        let message = Self::build_user_message(&hit);

        match self.generate(&message).await {
            Ok(keyword) => {
                let keyword = keyword.trim().to_string();
                if keyword.is_empty() {
                    EnrichedHit::from_hit(hit, None)
                } else {
                    tracing::debug!(input = %message, %keyword, "Extracted keyword");
                    EnrichedHit::from_hit(hit, Some(keyword))
                }
            }
            Err(e) => {
                tracing::warn!(title = %hit.title, error = %e, "Keyword enrichment failed");
                EnrichedHit::from_hit(hit, None)
            }
        }
    }

    /// Enrich every hit in order, one call per hit
    pub async fn enrich_all(&self, hits: Vec<SearchHit>) -> Vec<EnrichedHit> {
        let total = hits.len();
        let mut enriched = Vec::with_capacity(total);

        for (i, hit) in hits.into_iter().enumerate() {
            self.reporter
                .report(&format!("Enriching {}/{total}: {}", i + 1, hit.title));
            enriched.push(self.enrich(hit).await);
        }

        enriched
    }

    /// Request one completion from the endpoint
    async fn generate(&self, user_message: &str) -> Result<String, EnrichError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(EnrichError::MissingApiKey)?;

        let url = format!("{}/chat/completions", self.config.endpoint);
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_message.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(EnrichError::EmptyResponse)
    }
}
