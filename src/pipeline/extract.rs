//! Text extraction through the LlamaParse REST API.
//!
//! ## Job Flow
//!
//! ```text
//! POST /parsing/upload            ──▶ {"id": "...", "status": "PENDING"}
//! GET  /parsing/job/{id}          ──▶ poll while PENDING
//! GET  /parsing/job/{id}/result/markdown
//! ```
//!
//! Polling belongs to a single parse attempt; there is no retry. Any status
//! other than `PENDING` or `SUCCESS` ends the job. The whole job, upload and
//! result fetch included, is bounded by `parse_timeout_secs`; each request
//! by `http_timeout_secs`.

use crate::config::PipelineConfig;
use crate::error::DocsiftError;
use crate::pipeline::validate::guess_mime;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Turns a document on disk into markdown text.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, path: &Path, api_key: &str) -> Result<String, DocsiftError>;
}

/// [`Extractor`] for the LlamaParse cloud service.
#[derive(Debug, Clone)]
pub struct LlamaParseExtractor {
    http: reqwest::Client,
    base_url: String,
    language: String,
    poll_interval: Duration,
    job_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct JobStatus {
    id: String,
    status: String,
    #[serde(default)]
    error_message: Option<String>,
}

impl LlamaParseExtractor {
    pub fn new(config: &PipelineConfig) -> Result<Self, DocsiftError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| DocsiftError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.parse_base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            poll_interval: Duration::from_millis(config.parse_poll_interval_ms),
            job_timeout: Duration::from_secs(config.parse_timeout_secs),
        })
    }

    async fn upload(&self, path: &Path, api_key: &str) -> Result<JobStatus, String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let mime = guess_mime(path).unwrap_or("application/octet-stream");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| e.to_string())?;
        let form = Form::new()
            .part("file", part)
            .text("language", self.language.clone());

        let url = format!("{}/parsing/upload", self.base_url);
        debug!("Uploading {} to {}", path.display(), url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        read_json(response).await
    }

    async fn wait_for_job(&self, job_id: &str, api_key: &str) -> Result<(), String> {
        let url = format!("{}/parsing/job/{}", self.base_url, job_id);

        loop {
            let response = self
                .http
                .get(&url)
                .bearer_auth(api_key)
                .send()
                .await
                .map_err(|e| e.to_string())?;
            let job: JobStatus = read_json(response).await?;
            debug!("Parse job {}: {}", job.id, job.status);

            match job.status.to_ascii_uppercase().as_str() {
                "SUCCESS" => return Ok(()),
                "PENDING" => {}
                _ => {
                    return Err(format!(
                        "job {} ended with status {}: {}",
                        job_id,
                        job.status,
                        job.error_message.as_deref().unwrap_or("no details")
                    ));
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn fetch_markdown(&self, job_id: &str, api_key: &str) -> Result<String, String> {
        let url = format!("{}/parsing/job/{}/result/markdown", self.base_url, job_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let body: Value = read_json(response).await?;
        Ok(decode_parse_result(body))
    }
}

#[async_trait]
impl Extractor for LlamaParseExtractor {
    async fn extract(&self, path: &Path, api_key: &str) -> Result<String, DocsiftError> {
        let run = async {
            let job = self.upload(path, api_key).await?;
            info!("LlamaParse job {} started ({})", job.id, job.status);
            self.wait_for_job(&job.id, api_key).await?;
            self.fetch_markdown(&job.id, api_key).await
        };

        let outcome = match tokio::time::timeout(self.job_timeout, run).await {
            Ok(outcome) => outcome,
            Err(_) => Err(format!(
                "parse job did not finish within {}s",
                self.job_timeout.as_secs()
            )),
        };

        match outcome {
            Ok(text) => {
                info!("Extracted {} characters", text.chars().count());
                Ok(text)
            }
            Err(detail) => {
                warn!("LlamaParse failed for {}: {}", path.display(), detail);
                Err(DocsiftError::ExtractionFailure { detail })
            }
        }
    }
}

/// Read a JSON body, turning non-2xx statuses into an error string.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, String> {
    let status = response.status();
    let text = response.text().await.map_err(|e| e.to_string())?;
    if !status.is_success() {
        return Err(format!("HTTP {status}: {text}"));
    }
    serde_json::from_str(&text).map_err(|e| format!("unexpected response body: {e}"))
}

// ── Result decoding ──────────────────────────────────────────────────────

/// A document object exposing its text under one of the known keys.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParsedDocument {
    Markdown { markdown: String },
    Text { text: String },
}

impl ParsedDocument {
    fn into_text(self) -> String {
        match self {
            ParsedDocument::Markdown { markdown } => markdown,
            ParsedDocument::Text { text } => text,
        }
    }
}

/// Recognised shapes of a parse result body.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParseResult {
    Document(ParsedDocument),
    Documents(Vec<Value>),
    Other(Value),
}

/// Pull the extracted text out of a parse result.
///
/// * an object with `markdown` or `text` → that field
/// * a non-empty array → the first element, decoded the same way or
///   stringified if it has no text field
/// * anything else → the whole body as a string
pub fn decode_parse_result(body: Value) -> String {
    let shape = match serde_json::from_value::<ParseResult>(body.clone()) {
        Ok(shape) => shape,
        Err(_) => ParseResult::Other(body),
    };

    match shape {
        ParseResult::Document(doc) => doc.into_text(),
        ParseResult::Documents(mut docs) if !docs.is_empty() => {
            let first = docs.swap_remove(0);
            match serde_json::from_value::<ParsedDocument>(first.clone()) {
                Ok(doc) => doc.into_text(),
                Err(_) => coerce_to_string(first),
            }
        }
        ParseResult::Documents(docs) => coerce_to_string(Value::Array(docs)),
        ParseResult::Other(v) => coerce_to_string(v),
    }
}

fn coerce_to_string(v: Value) -> String {
    match v {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
