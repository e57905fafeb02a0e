//! # docsift
//!
//! Validate a document, extract its text with LlamaParse and classify it with
//! an LLM.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document
//!  │
//!  ├─ 1. Exists    the path names a regular file
//!  ├─ 2. Size      reject files above max_size_mb
//!  ├─ 3. Pages     PDFs only: reject above max_pages (pdfium)
//!  ├─ 4. Extract   LlamaParse → markdown
//!  ├─ 5. Content   reject empty / whitespace-only text
//!  └─ 6. Analyse   chat completion with a JSON schema → doc_type, lang_type, summary
//! ```
//!
//! Every run yields exactly one [`PipelineOutcome`], serialised either as
//! `{"success": true, …, "analysis": {…}}` or `{"error": "…"}`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsift::{DocumentProcessor, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Keys from LLAMA_CLOUD_API_KEY and GITHUB_TOKEN / OPENAI_API_KEY
//!     let config = PipelineConfig::default().with_env_credentials();
//!     let processor = DocumentProcessor::new(config)?;
//!     let outcome = processor.process("invoice.pdf").await;
//!     println!("{}", serde_json::to_string_pretty(&outcome)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docsift` binary (clap + anyhow + tracing-subscriber + dotenvy) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::DocsiftError;
pub use output::{Analysis, DocType, DocumentInfo, DocumentRef, PipelineOutcome, ProcessingReport};
pub use pipeline::analyze::{Analyzer, ChatAnalyzer};
pub use pipeline::extract::{Extractor, LlamaParseExtractor};
pub use pipeline::validate::{PageCounter, PdfiumPageCounter};
pub use process::{DocumentProcessor, DocumentProcessorBuilder};
