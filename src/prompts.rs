//! Prompt and response-schema constants for document classification.
//!
//! Everything the model is told lives here so that the taxonomy, the user
//! message framing and the JSON schema stay in sync. The schema's `enum`
//! must list exactly the variants of [`crate::output::DocType`].

use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// System prompt describing the five-category taxonomy.
pub const SYSTEM_PROMPT: &str = r#"You are a document analysis expert. Analyze the provided document content and categorize it.

Document Types:
- resume: Professional CV or resume documents
- letter: Formal letters, cover letters, business correspondence
- invoice: Bills, invoices, receipts, financial documents
- blog: Blog posts, articles, informal writing
- other: Any document that doesn't fit the above categories (reports, manuals, contracts, etc.)

Examples:
- A document with "Dear Hiring Manager" and work experience → resume
- A document with "Invoice #123" and amounts → invoice
- A document with "Dear Sir/Madam" and formal tone → letter
- A document with casual writing and personal opinions → blog
- A technical manual or legal contract → other

Return your analysis in the exact JSON format requested."#;

/// Name attached to the `json_schema` response format.
pub const SCHEMA_NAME: &str = "document_analysis";

/// JSON schema the model output must conform to.
pub static ANALYSIS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "doc_type": {
                "type": "string",
                "enum": ["resume", "letter", "invoice", "blog", "other"]
            },
            "lang_type": {
                "type": "string",
                "description": "Detected language code (e.g., en, es, fr)"
            },
            "summary": {
                "type": "string",
                "description": "Brief summary of the document content"
            }
        },
        "required": ["doc_type", "lang_type", "summary"],
        "additionalProperties": false
    })
});

/// Build the user message carrying the (already truncated) excerpt.
pub fn analysis_user_message(excerpt: &str) -> String {
    format!("Analyze this document:\n\n{excerpt}")
}
