//! Result types: the analysis record and the pipeline envelope.
//!
//! [`PipelineOutcome`] serialises to exactly one of two JSON shapes:
//!
//! ```text
//! {"success": true, "file_path": …, "file_size_mb": …, "content_length": …,
//!  "tokens_used": …, "analysis": {"doc_type": …, "lang_type": …, "summary": …}}
//!
//! {"error": "…"}
//! ```

use crate::error::DocsiftError;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Closed set of document categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Resume,
    Letter,
    Invoice,
    Blog,
    Other,
}

impl DocType {
    /// Every category, in schema order.
    pub const ALL: [DocType; 5] = [
        DocType::Resume,
        DocType::Letter,
        DocType::Invoice,
        DocType::Blog,
        DocType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Resume => "resume",
            DocType::Letter => "letter",
            DocType::Invoice => "invoice",
            DocType::Blog => "blog",
            DocType::Other => "other",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification returned by the model.
///
/// Deserialisation is strict: all three fields are required and unknown
/// fields are rejected, mirroring the schema sent with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentInfo {
    pub doc_type: DocType,
    /// Detected language code (`en`, `es`, `fr`, …).
    pub lang_type: String,
    pub summary: String,
}

/// Output of the analysis stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub info: DocumentInfo,
    /// `usage.total_tokens` from the backend, 0 when not reported.
    pub tokens_used: u64,
}

/// Metadata gathered by the validation stages.
///
/// `page_count` is only populated for PDFs.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRef {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub mime_type: Option<&'static str>,
    pub page_count: Option<usize>,
}

impl DocumentRef {
    /// Size in MB (1024² bytes), unrounded.
    pub fn size_mb(&self) -> f64 {
        bytes_to_mb(self.size_bytes)
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == Some("application/pdf")
    }
}

pub(crate) fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Success payload of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingReport {
    /// The input path as display text. Bytes that are not valid UTF-8 are
    /// replaced with U+FFFD, since the envelope is JSON.
    pub file_path: String,
    /// File size in MB rounded to two decimals.
    pub file_size_mb: f64,
    /// Length of the extracted text in characters.
    pub content_length: usize,
    pub tokens_used: u64,
    pub analysis: DocumentInfo,
}

/// The single result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Success(ProcessingReport),
    Error { error: String },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success(_))
    }

    /// The error message, if this is an error envelope.
    pub fn error(&self) -> Option<&str> {
        match self {
            PipelineOutcome::Error { error } => Some(error),
            PipelineOutcome::Success(_) => None,
        }
    }

    pub fn report(&self) -> Option<&ProcessingReport> {
        match self {
            PipelineOutcome::Success(r) => Some(r),
            PipelineOutcome::Error { .. } => None,
        }
    }
}

impl From<Result<ProcessingReport, DocsiftError>> for PipelineOutcome {
    fn from(result: Result<ProcessingReport, DocsiftError>) -> Self {
        match result {
            Ok(report) => PipelineOutcome::Success(report),
            Err(e) => PipelineOutcome::Error {
                error: e.to_string(),
            },
        }
    }
}

impl Serialize for PipelineOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PipelineOutcome::Success(r) => {
                let mut map = serializer.serialize_map(Some(6))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("file_path", &r.file_path)?;
                map.serialize_entry("file_size_mb", &r.file_size_mb)?;
                map.serialize_entry("content_length", &r.content_length)?;
                map.serialize_entry("tokens_used", &r.tokens_used)?;
                map.serialize_entry("analysis", &r.analysis)?;
                map.end()
            }
            PipelineOutcome::Error { error } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report() -> ProcessingReport {
        ProcessingReport {
            file_path: "cv.pdf".into(),
            file_size_mb: 0.12,
            content_length: 42,
            tokens_used: 317,
            analysis: DocumentInfo {
                doc_type: DocType::Resume,
                lang_type: "en".into(),
                summary: "A software engineer's CV.".into(),
            },
        }
    }

    #[test]
    fn success_envelope_shape() {
        let v = serde_json::to_value(PipelineOutcome::Success(report())).unwrap();
        assert_eq!(
            v,
            json!({
                "success": true,
                "file_path": "cv.pdf",
                "file_size_mb": 0.12,
                "content_length": 42,
                "tokens_used": 317,
                "analysis": {
                    "doc_type": "resume",
                    "lang_type": "en",
                    "summary": "A software engineer's CV."
                }
            })
        );
    }

    #[test]
    fn error_envelope_has_only_error_key() {
        let outcome: PipelineOutcome = Err(DocsiftError::EmptyContent).into();
        let v = serde_json::to_value(&outcome).unwrap();
        assert_eq!(v, json!({"error": "No content to read"}));
        assert!(!outcome.is_success());
        assert_eq!(outcome.error(), Some("No content to read"));
    }

    #[test]
    fn document_info_rejects_unknown_fields_and_categories() {
        let extra = r#"{"doc_type":"blog","lang_type":"en","summary":"s","mood":"happy"}"#;
        assert!(serde_json::from_str::<DocumentInfo>(extra).is_err());

        let bad_type = r#"{"doc_type":"memo","lang_type":"en","summary":"s"}"#;
        assert!(serde_json::from_str::<DocumentInfo>(bad_type).is_err());

        let missing = r#"{"doc_type":"blog","summary":"s"}"#;
        assert!(serde_json::from_str::<DocumentInfo>(missing).is_err());
    }

    #[test]
    fn round2_rounds_half_away() {
        assert_eq!(round2(1.005_f64 + 1e-9), 1.01);
        assert_eq!(round2(bytes_to_mb(1024 * 1024)), 1.0);
        assert_eq!(round2(bytes_to_mb(1536 * 1024)), 1.5);
    }

    #[test]
    fn pdf_detection_uses_mime() {
        let mut d = DocumentRef {
            path: "a.pdf".into(),
            size_bytes: 0,
            mime_type: Some("application/pdf"),
            page_count: None,
        };
        assert!(d.is_pdf());
        d.mime_type = Some("image/png");
        assert!(!d.is_pdf());
    }
}
