//! Error types for the docsift library.
//!
//! Every pipeline stage returns `Result<_, DocsiftError>`. The variants fall
//! into two groups:
//!
//! * **Pipeline errors** — a stage rejected the document or a remote call
//!   failed. The orchestrator turns the first one into the `{"error": …}`
//!   envelope, so their `Display` strings are part of the output contract
//!   and must stay stable.
//!
//! * **Setup errors** — [`DocsiftError::InvalidConfig`] and
//!   [`DocsiftError::HttpClient`] surface while building a
//!   [`crate::DocumentProcessor`], before any document is touched. These are
//!   the only failures the CLI treats as process-fatal.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the docsift library.
#[derive(Debug, Error)]
pub enum DocsiftError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Input path does not resolve to a readable file.
    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// File size could not be determined.
    #[error("Cannot check file size: {detail}")]
    SizeCheckFailed { detail: String },

    /// File exceeds the configured size ceiling.
    #[error("File too large: {actual_mb:.2}MB (max: {max_mb}MB)")]
    FileTooLarge { actual_mb: f64, max_mb: u64 },

    /// PDF has more pages than the configured ceiling.
    #[error("Document too long (more than {max_pages} pages)")]
    DocumentTooLong { max_pages: usize, page_count: usize },

    /// PDF could not be opened or its pages counted.
    #[error("Cannot read PDF: {detail}")]
    PdfReadFailure { detail: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// A required credential is absent from the environment.
    #[error("{name} not found in environment variables")]
    MissingApiKey { name: String },

    /// The parsing service call failed.
    #[error("LlamaParse failed: {detail}")]
    ExtractionFailure { detail: String },

    /// Extraction produced no usable text.
    #[error("No content to read")]
    EmptyContent,

    // ── Analysis errors ───────────────────────────────────────────────────
    /// The model answered, but not with the expected JSON document.
    #[error("Failed to parse AI response as JSON: {detail}")]
    AnalysisJsonParseFailure { detail: String },

    /// The chat-completion request failed.
    #[error("Document analysis failed: {detail}")]
    AnalysisRemoteFailure { detail: String },

    // ── Setup errors ──────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocsiftError {
    /// True for errors raised while wiring the processor rather than while
    /// processing a document.
    pub fn is_setup_error(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::HttpClient(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let e = DocsiftError::FileNotFound {
            path: PathBuf::from("/tmp/missing.pdf"),
        };
        assert_eq!(e.to_string(), "File not found: /tmp/missing.pdf");
    }

    #[test]
    fn file_too_large_uses_two_decimals() {
        let e = DocsiftError::FileTooLarge {
            actual_mb: 12.3456,
            max_mb: 10,
        };
        assert_eq!(e.to_string(), "File too large: 12.35MB (max: 10MB)");
    }

    #[test]
    fn document_too_long_names_the_ceiling() {
        let e = DocsiftError::DocumentTooLong {
            max_pages: 5,
            page_count: 9,
        };
        assert_eq!(e.to_string(), "Document too long (more than 5 pages)");
    }

    #[test]
    fn missing_api_key_display() {
        let e = DocsiftError::MissingApiKey {
            name: "LLAMA_CLOUD_API_KEY".into(),
        };
        assert_eq!(
            e.to_string(),
            "LLAMA_CLOUD_API_KEY not found in environment variables"
        );
    }

    #[test]
    fn remote_error_prefixes() {
        let e = DocsiftError::ExtractionFailure {
            detail: "HTTP 500".into(),
        };
        assert_eq!(e.to_string(), "LlamaParse failed: HTTP 500");

        let e = DocsiftError::AnalysisJsonParseFailure {
            detail: "expected value at line 1 column 1".into(),
        };
        assert!(e.to_string().starts_with("Failed to parse AI response as JSON: "));

        let e = DocsiftError::AnalysisRemoteFailure {
            detail: "HTTP 401".into(),
        };
        assert_eq!(e.to_string(), "Document analysis failed: HTTP 401");
    }

    #[test]
    fn setup_errors_are_flagged() {
        assert!(DocsiftError::InvalidConfig("x".into()).is_setup_error());
        assert!(DocsiftError::HttpClient("x".into()).is_setup_error());
        assert!(!DocsiftError::EmptyContent.is_setup_error());
    }
}
