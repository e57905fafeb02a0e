//! The document-processing orchestrator.
//!
//! [`DocumentProcessor`] runs the six stages in a fixed order and stops at
//! the first failure:
//!
//! ```text
//! exists ──▶ size ──▶ pages ──▶ extract ──▶ content ──▶ analyse
//! ```
//!
//! Collaborators that touch the outside world (pdfium, LlamaParse, the LLM)
//! sit behind trait objects so tests and embedders can swap them. None of
//! them hold per-call state, so one processor can serve concurrent runs.

use crate::config::{PipelineConfig, PARSE_API_KEY_ENV};
use crate::error::DocsiftError;
use crate::output::{round2, PipelineOutcome, ProcessingReport};
use crate::pipeline::analyze::{Analyzer, ChatAnalyzer};
use crate::pipeline::extract::{Extractor, LlamaParseExtractor};
use crate::pipeline::validate::{self, PageCounter, PdfiumPageCounter};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Validates, extracts and classifies documents.
///
/// # Example
/// ```rust,no_run
/// use docsift::{DocumentProcessor, PipelineConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PipelineConfig::builder().max_pages(5).build()?.with_env_credentials();
/// let processor = DocumentProcessor::new(config)?;
/// let outcome = processor.process("letter.pdf").await;
/// println!("{}", serde_json::to_string_pretty(&outcome)?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DocumentProcessor {
    config: PipelineConfig,
    page_counter: Arc<dyn PageCounter>,
    extractor: Arc<dyn Extractor>,
    analyzer: Arc<dyn Analyzer>,
}

impl DocumentProcessor {
    /// Wire the default pdfium, LlamaParse and chat-completion collaborators.
    pub fn new(config: PipelineConfig) -> Result<Self, DocsiftError> {
        Self::builder(config).build()
    }

    /// Start a builder for injecting custom collaborators.
    pub fn builder(config: PipelineConfig) -> DocumentProcessorBuilder {
        DocumentProcessorBuilder {
            config,
            page_counter: None,
            extractor: None,
            analyzer: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline and return the envelope. Never fails.
    pub async fn process(&self, path: impl AsRef<Path>) -> PipelineOutcome {
        self.try_process(path).await.into()
    }

    /// Run the pipeline, returning the first stage error unchanged.
    pub async fn try_process(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<ProcessingReport, DocsiftError> {
        let path = path.as_ref();
        info!("Processing document: {}", path.display());

        let result = self.run_stages(path).await;
        if let Err(ref e) = result {
            warn!("Pipeline stopped for {}: {}", path.display(), e);
        }
        result
    }

    async fn run_stages(&self, path: &Path) -> Result<ProcessingReport, DocsiftError> {
        // ── Step 1: Existence ────────────────────────────────────────────
        validate::check_exists(path)?;

        // ── Step 2: Size ─────────────────────────────────────────────────
        let doc = validate::check_size(path, self.config.max_size_mb)?;

        // ── Step 3: Page count (PDF only) ────────────────────────────────
        let doc = validate::check_pages(
            doc,
            self.config.max_pages,
            Arc::clone(&self.page_counter),
        )
        .await?;

        // ── Step 4: Extraction ───────────────────────────────────────────
        let api_key = self
            .config
            .parse_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DocsiftError::MissingApiKey {
                name: PARSE_API_KEY_ENV.to_string(),
            })?;
        let text = self.extractor.extract(&doc.path, api_key).await?;

        // ── Step 5: Content ──────────────────────────────────────────────
        let content = validate::check_content(text)?;

        // ── Step 6: Analysis ─────────────────────────────────────────────
        let analysis = self.analyzer.analyze(&content).await?;

        Ok(ProcessingReport {
            file_path: doc.path.to_string_lossy().into_owned(),
            file_size_mb: round2(doc.size_mb()),
            content_length: content.chars().count(),
            tokens_used: analysis.tokens_used,
            analysis: analysis.info,
        })
    }

    /// Synchronous wrapper around [`DocumentProcessor::process`].
    ///
    /// Creates a temporary tokio runtime internally; do not call from inside
    /// an async context.
    pub fn process_sync(&self, path: impl AsRef<Path>) -> PipelineOutcome {
        match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(self.process(path)),
            Err(e) => PipelineOutcome::Error {
                error: DocsiftError::Internal(format!("Failed to create tokio runtime: {e}"))
                    .to_string(),
            },
        }
    }
}

/// Builder for [`DocumentProcessor`].
///
/// Unset collaborators fall back to the defaults built from the config.
pub struct DocumentProcessorBuilder {
    config: PipelineConfig,
    page_counter: Option<Arc<dyn PageCounter>>,
    extractor: Option<Arc<dyn Extractor>>,
    analyzer: Option<Arc<dyn Analyzer>>,
}

impl DocumentProcessorBuilder {
    pub fn page_counter(mut self, counter: Arc<dyn PageCounter>) -> Self {
        self.page_counter = Some(counter);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn build(self) -> Result<DocumentProcessor, DocsiftError> {
        let page_counter: Arc<dyn PageCounter> = match self.page_counter {
            Some(c) => c,
            None => Arc::new(PdfiumPageCounter::from_env()),
        };
        let extractor: Arc<dyn Extractor> = match self.extractor {
            Some(e) => e,
            None => Arc::new(LlamaParseExtractor::new(&self.config)?),
        };
        let analyzer: Arc<dyn Analyzer> = match self.analyzer {
            Some(a) => a,
            None => Arc::new(ChatAnalyzer::new(&self.config)?),
        };

        Ok(DocumentProcessor {
            config: self.config,
            page_counter,
            extractor,
            analyzer,
        })
    }
}
