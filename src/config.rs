//! Configuration for a document-processing run.
//!
//! Every knob lives in [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. The config is immutable once built and is
//! shared by every stage of a [`crate::DocumentProcessor`], so one value can
//! drive any number of independent runs.

use crate::error::DocsiftError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable holding the LlamaParse API key.
pub const PARSE_API_KEY_ENV: &str = "LLAMA_CLOUD_API_KEY";

/// Environment variables searched, in order, for the LLM API key.
pub const LLM_API_KEY_ENVS: [&str; 2] = ["GITHUB_TOKEN", "OPENAI_API_KEY"];

/// GitHub Models inference endpoint (OpenAI-compatible).
pub const DEFAULT_LLM_BASE_URL: &str = "https://models.inference.ai.azure.com";

/// LlamaParse REST API root.
pub const DEFAULT_PARSE_BASE_URL: &str = "https://api.cloud.llamaindex.ai/api/v1";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for document validation, extraction and analysis.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use docsift::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .max_pages(5)
///     .max_size_mb(20)
///     .model("gpt-4o")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_pages, 5);
/// ```
///
/// The serde form omits both API keys, and missing fields take their
/// defaults, so a partial settings file is enough.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum PDF page count. Default: 10.
    ///
    /// Only PDFs are page-checked; images and office documents bypass this
    /// limit entirely.
    pub max_pages: usize,

    /// Maximum file size in megabytes (1 MB = 1024² bytes). Default: 10.
    pub max_size_mb: u64,

    /// Chat-completion model identifier. Default: `gpt-4o-mini`.
    pub model: String,

    /// Base URL of the OpenAI-compatible endpoint; `/chat/completions` is
    /// appended.
    pub llm_base_url: String,

    /// Base URL of the LlamaParse API.
    pub parse_base_url: String,

    /// Document language hint sent to the parsing service. Default: `en`.
    pub language: String,

    /// Number of leading characters of extracted text sent for analysis.
    /// Default: 4000.
    ///
    /// Truncation is by position only; nothing past the limit is seen by the
    /// model.
    pub analysis_char_limit: usize,

    /// Sampling temperature for the analysis call. Default: 0.1.
    pub temperature: f32,

    /// Output token cap for the analysis call. Default: 500.
    pub max_tokens: u32,

    /// Timeout for the analysis request in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Upper bound on the whole parse job (upload, polling, result) in
    /// seconds. Default: 300.
    pub parse_timeout_secs: u64,

    /// Timeout for each individual parsing-service request in seconds.
    /// Default: 120.
    pub http_timeout_secs: u64,

    /// Delay between parse-job status polls in milliseconds. Default: 1000.
    pub parse_poll_interval_ms: u64,

    /// LlamaParse API key. Checked right before extraction.
    #[serde(skip)]
    pub parse_api_key: Option<String>,

    /// LLM API key, sent as a bearer token when present.
    #[serde(skip)]
    pub llm_api_key: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            max_size_mb: 10,
            model: DEFAULT_MODEL.to_string(),
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            parse_base_url: DEFAULT_PARSE_BASE_URL.to_string(),
            language: "en".to_string(),
            analysis_char_limit: 4000,
            temperature: 0.1,
            max_tokens: 500,
            api_timeout_secs: 60,
            parse_timeout_secs: 300,
            http_timeout_secs: 120,
            parse_poll_interval_ms: 1000,
            parse_api_key: None,
            llm_api_key: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |k: &Option<String>| k.as_ref().map(|_| "<redacted>");
        f.debug_struct("PipelineConfig")
            .field("max_pages", &self.max_pages)
            .field("max_size_mb", &self.max_size_mb)
            .field("model", &self.model)
            .field("llm_base_url", &self.llm_base_url)
            .field("parse_base_url", &self.parse_base_url)
            .field("language", &self.language)
            .field("analysis_char_limit", &self.analysis_char_limit)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("parse_timeout_secs", &self.parse_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("parse_poll_interval_ms", &self.parse_poll_interval_ms)
            .field("parse_api_key", &redact(&self.parse_api_key))
            .field("llm_api_key", &redact(&self.llm_api_key))
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Fill in any unset credentials from the process environment.
    ///
    /// Empty variables count as unset.
    pub fn with_env_credentials(mut self) -> Self {
        if self.parse_api_key.is_none() {
            self.parse_api_key = non_empty_env(PARSE_API_KEY_ENV);
        }
        if self.llm_api_key.is_none() {
            self.llm_api_key = LLM_API_KEY_ENVS.iter().find_map(|k| non_empty_env(k));
        }
        self
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = n;
        self
    }

    pub fn max_size_mb(mut self, mb: u64) -> Self {
        self.config.max_size_mb = mb;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn llm_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.llm_base_url = url.into();
        self
    }

    pub fn parse_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.parse_base_url = url.into();
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn analysis_char_limit(mut self, n: usize) -> Self {
        self.config.analysis_char_limit = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t;
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn parse_timeout_secs(mut self, secs: u64) -> Self {
        self.config.parse_timeout_secs = secs;
        self
    }

    pub fn http_timeout_secs(mut self, secs: u64) -> Self {
        self.config.http_timeout_secs = secs;
        self
    }

    pub fn parse_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.parse_poll_interval_ms = ms;
        self
    }

    pub fn parse_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.parse_api_key = Some(key.into());
        self
    }

    pub fn llm_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.llm_api_key = Some(key.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, DocsiftError> {
        let c = &self.config;
        if c.max_pages == 0 {
            return Err(DocsiftError::InvalidConfig(
                "max_pages must be ≥ 1".into(),
            ));
        }
        if c.max_size_mb == 0 {
            return Err(DocsiftError::InvalidConfig(
                "max_size_mb must be ≥ 1".into(),
            ));
        }
        if c.analysis_char_limit == 0 {
            return Err(DocsiftError::InvalidConfig(
                "analysis_char_limit must be ≥ 1".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(DocsiftError::InvalidConfig("model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(DocsiftError::InvalidConfig(format!(
                "temperature must be 0.0–2.0, got {}",
                c.temperature
            )));
        }
        Ok(self.config)
    }
}
