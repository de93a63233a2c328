//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use domains::{DomainError, ProductRanker, ProductSummary, RankedCandidate, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::prompt;

#[derive(Debug, Error)]
pub enum RankerError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("model API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("invalid model response: {0}")]
    InvalidResponse(String),

    #[error("semantic search is not configured")]
    NotConfigured,
}

impl From<RankerError> for DomainError {
    fn from(err: RankerError) -> Self {
        DomainError::Internal(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ChatRankerConfig {
    /// e.g. `https://api.openai.com/v1`; `/chat/completions` is appended.
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct ChatRanker {
    client: Client,
    config: ChatRankerConfig,
}

impl std::fmt::Debug for ChatRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRanker")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("api_key", &self.config.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RankingReply {
    results: Vec<RankedCandidate>,
}

impl ChatRanker {
    pub fn new(config: ChatRankerConfig) -> std::result::Result<Self, RankerError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn complete(
        &self,
        query: &str,
        candidates: &[ProductSummary],
        limit: usize,
    ) -> std::result::Result<Vec<RankedCandidate>, RankerError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": prompt::SYSTEM_PROMPT },
                { "role": "user", "content": prompt::user_prompt(query, candidates, limit) },
            ],
            "response_format": prompt::response_format(),
        });

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(ref api_key) = self.config.api_key {
            request = request.bearer_auth(api_key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), "model API error");
            return Err(RankerError::ApiError { status: status.as_u16(), message });
        }

        let completion: ChatCompletion =
            response.json().await.map_err(|e| RankerError::InvalidResponse(e.to_string()))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| RankerError::InvalidResponse("no content in reply".into()))?;
        parse_reply(&content)
    }
}

/// The reply must be exactly `{"results": [...]}` with well-typed entries.
fn parse_reply(content: &str) -> std::result::Result<Vec<RankedCandidate>, RankerError> {
    serde_json::from_str::<RankingReply>(content)
        .map(|reply| reply.results)
        .map_err(|e| RankerError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl ProductRanker for ChatRanker {
    #[instrument(skip(self, candidates), fields(candidates = candidates.len(), model = %self.config.model))]
    async fn rank(&self, query: &str, candidates: &[ProductSummary], limit: usize) -> Result<Vec<RankedCandidate>> {
        let ranked = self.complete(query, candidates, limit).await?;
        debug!(results = ranked.len(), "model ranked candidates");
        Ok(ranked)
    }
}

/// Used when no model endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRanker;

#[async_trait]
impl ProductRanker for DisabledRanker {
    async fn rank(&self, _query: &str, _candidates: &[ProductSummary], _limit: usize) -> Result<Vec<RankedCandidate>> {
        Err(RankerError::NotConfigured.into())
    }
}
