//! Document classification via an OpenAI-compatible chat-completion API.
//!
//! The request pins the model to the JSON schema in
//! [`crate::prompts::ANALYSIS_SCHEMA`] and the reply's message content is
//! decoded strictly into [`DocumentInfo`]. Two failure classes are kept
//! apart: the call itself failing (transport, HTTP status, malformed
//! completion envelope) and the model answering with something that is not
//! the expected JSON document.

use crate::config::PipelineConfig;
use crate::error::DocsiftError;
use crate::output::{Analysis, DocumentInfo};
use crate::prompts::{analysis_user_message, ANALYSIS_SCHEMA, SCHEMA_NAME, SYSTEM_PROMPT};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Classifies extracted document text.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Analysis, DocsiftError>;
}

/// Return the first `limit` characters of `text`.
///
/// Counts Unicode scalar values, so the cut never splits a code point.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    response_format: ResponseFormat,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaSpec,
}

#[derive(Debug, Serialize)]
struct JsonSchemaSpec {
    name: &'static str,
    schema: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u64,
}

// ── Client ───────────────────────────────────────────────────────────────

/// [`Analyzer`] that calls `{base_url}/chat/completions`.
#[derive(Clone)]
pub struct ChatAnalyzer {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    char_limit: usize,
    temperature: f32,
    max_tokens: u32,
}

impl ChatAnalyzer {
    pub fn new(config: &PipelineConfig) -> Result<Self, DocsiftError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| DocsiftError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/chat/completions",
                config.llm_base_url.trim_end_matches('/')
            ),
            api_key: config.llm_api_key.clone(),
            model: config.model.clone(),
            char_limit: config.analysis_char_limit,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn build_request<'a>(&'a self, text: &str) -> ChatRequest<'a> {
        let excerpt = truncate_chars(text, self.char_limit);
        ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user",
                    content: analysis_user_message(excerpt),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaSpec {
                    name: SCHEMA_NAME,
                    schema: ANALYSIS_SCHEMA.clone(),
                },
            },
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<String, DocsiftError> {
        let remote = |detail: String| DocsiftError::AnalysisRemoteFailure { detail };

        let mut builder = self.http.post(&self.endpoint).json(request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| remote(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| remote(e.to_string()))?;

        if !status.is_success() {
            return Err(remote(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }
}

#[async_trait]
impl Analyzer for ChatAnalyzer {
    async fn analyze(&self, text: &str) -> Result<Analysis, DocsiftError> {
        let start = Instant::now();
        let request = self.build_request(text);
        debug!(
            "Analysing {} of {} characters with {}",
            self.char_limit.min(text.chars().count()),
            text.chars().count(),
            self.model
        );

        let result = match self.send(&request).await {
            Ok(body) => parse_completion(&body),
            Err(e) => Err(e),
        };

        match &result {
            Ok(analysis) => info!(
                "Classified as {} ({}) using {} tokens in {:?}",
                analysis.info.doc_type,
                analysis.info.lang_type,
                analysis.tokens_used,
                start.elapsed()
            ),
            Err(e) => warn!("{}", e),
        }
        result
    }
}

/// Decode a raw chat-completion body into an [`Analysis`].
pub fn parse_completion(body: &str) -> Result<Analysis, DocsiftError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| DocsiftError::AnalysisRemoteFailure {
            detail: format!("malformed completion response: {e}"),
        })?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| DocsiftError::AnalysisRemoteFailure {
            detail: "completion has no message content".into(),
        })?;

    let info: DocumentInfo = serde_json::from_str(&content).map_err(|e| {
        DocsiftError::AnalysisJsonParseFailure {
            detail: e.to_string(),
        }
    })?;

    Ok(Analysis {
        info,
        tokens_used: response.usage.map(|u| u.total_tokens).unwrap_or(0),
    })
}
