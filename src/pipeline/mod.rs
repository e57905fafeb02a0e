//! Pipeline stages for document classification.
//!
//! Each submodule owns one kind of work so stages can be tested and swapped
//! independently.
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ extract ──▶ validate ──▶ analyze
//! (exists, size, pages)  (LlamaParse)  (content)  (LLM)
//! ```
//!
//! 1. [`validate`] — local checks; the page count goes through
//!    [`validate::PageCounter`] and runs on the blocking pool
//! 2. [`extract`]  — upload to the parsing service and decode its result
//! 3. [`analyze`]  — schema-constrained chat completion over a truncated
//!    excerpt

pub mod analyze;
pub mod extract;
pub mod validate;

#[cfg(test)]
mod http_stub;
