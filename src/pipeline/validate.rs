//! Local guard checks: existence, size, page count and extracted content.
//!
//! None of these stages touch the network. The page check is the only one
//! that opens the document, and only for PDFs.

use crate::error::DocsiftError;
use crate::output::{bytes_to_mb, DocumentRef};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Environment variable pointing at a pdfium shared library or its directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Counts the pages of a PDF on disk.
///
/// Implementations are called from `spawn_blocking` and may block freely.
pub trait PageCounter: Send + Sync {
    fn count_pages(&self, path: &Path) -> Result<usize, DocsiftError>;
}

/// [`PageCounter`] backed by pdfium.
///
/// pdfium is bound per call so a missing library only fails the PDF being
/// checked, and never panics the way `Pdfium::default()` does.
#[derive(Debug, Clone, Default)]
pub struct PdfiumPageCounter {
    library_path: Option<PathBuf>,
}

impl PdfiumPageCounter {
    /// Resolve the library from `PDFIUM_LIB_PATH`, falling back to the system
    /// library when unset.
    pub fn from_env() -> Self {
        Self {
            library_path: std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from),
        }
    }

    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium, DocsiftError> {
        let bindings = match &self.library_path {
            Some(p) if p.is_dir() => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(p))
            }
            Some(p) => Pdfium::bind_to_library(p),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| DocsiftError::PdfReadFailure {
            detail: format!("pdfium library unavailable: {e:?}"),
        })?;
        Ok(Pdfium::new(bindings))
    }
}

impl PageCounter for PdfiumPageCounter {
    fn count_pages(&self, path: &Path) -> Result<usize, DocsiftError> {
        let pdfium = self.bind()?;
        let document =
            pdfium
                .load_pdf_from_file(path, None)
                .map_err(|e| DocsiftError::PdfReadFailure {
                    detail: format!("{e:?}"),
                })?;
        Ok(document.pages().len() as usize)
    }
}

/// Guess the MIME type from the file extension.
pub fn guess_mime(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

/// Stage 1: the path must name an existing regular file.
pub fn check_exists(path: &Path) -> Result<(), DocsiftError> {
    if !path.is_file() {
        return Err(DocsiftError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    debug!("Found input file: {}", path.display());
    Ok(())
}

/// Stage 2: stat the file and enforce the size ceiling.
pub fn check_size(path: &Path, max_size_mb: u64) -> Result<DocumentRef, DocsiftError> {
    let size_bytes = std::fs::metadata(path)
        .map_err(|e| DocsiftError::SizeCheckFailed {
            detail: e.to_string(),
        })?
        .len();
    let actual_mb = bytes_to_mb(size_bytes);

    if actual_mb > max_size_mb as f64 {
        return Err(DocsiftError::FileTooLarge {
            actual_mb,
            max_mb: max_size_mb,
        });
    }

    info!("File size: {:.2}MB", actual_mb);
    Ok(DocumentRef {
        path: path.to_path_buf(),
        size_bytes,
        mime_type: guess_mime(path),
        page_count: None,
    })
}

/// Stage 3: enforce the page ceiling on PDFs; everything else passes.
///
/// Page counting runs on the blocking pool since pdfium is synchronous FFI.
pub async fn check_pages(
    mut doc: DocumentRef,
    max_pages: usize,
    counter: Arc<dyn PageCounter>,
) -> Result<DocumentRef, DocsiftError> {
    if !doc.is_pdf() {
        info!("Processing non-PDF file: {}", doc.path.display());
        return Ok(doc);
    }

    let path = doc.path.clone();
    let page_count = tokio::task::spawn_blocking(move || counter.count_pages(&path))
        .await
        .map_err(|e| DocsiftError::Internal(format!("Page-count task panicked: {e}")))??;

    info!("Document has {} pages", page_count);
    if page_count > max_pages {
        return Err(DocsiftError::DocumentTooLong {
            max_pages,
            page_count,
        });
    }

    doc.page_count = Some(page_count);
    Ok(doc)
}

/// Stage 5: extracted text must contain something other than whitespace.
pub fn check_content(text: String) -> Result<String, DocsiftError> {
    if text.trim().is_empty() {
        return Err(DocsiftError::EmptyContent);
    }
    info!("Reading {} characters of content", text.chars().count());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FixedPages(usize);

    impl PageCounter for FixedPages {
        fn count_pages(&self, _path: &Path) -> Result<usize, DocsiftError> {
            Ok(self.0)
        }
    }

    struct Unreadable;

    impl PageCounter for Unreadable {
        fn count_pages(&self, _path: &Path) -> Result<usize, DocsiftError> {
            Err(DocsiftError::PdfReadFailure {
                detail: "FormatError".into(),
            })
        }
    }

    fn doc(name: &str) -> DocumentRef {
        let path = PathBuf::from(name);
        DocumentRef {
            mime_type: guess_mime(&path),
            path,
            size_bytes: 1,
            page_count: None,
        }
    }

    #[test]
    fn mime_guess_by_extension() {
        assert_eq!(guess_mime(Path::new("a/b/report.PDF")), Some("application/pdf"));
        assert_eq!(guess_mime(Path::new("scan.png")), Some("image/png"));
        assert_eq!(guess_mime(Path::new("noext")), None);
    }

    #[test]
    fn missing_file_and_directory_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.pdf");
        assert!(matches!(
            check_exists(&missing),
            Err(DocsiftError::FileNotFound { .. })
        ));
        assert!(matches!(
            check_exists(dir.path()),
            Err(DocsiftError::FileNotFound { .. })
        ));
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&vec![0u8; 1024 * 1024]).unwrap();
        let d = check_size(f.path(), 1).unwrap();
        assert_eq!(d.size_bytes, 1024 * 1024);

        f.write_all(&[0u8; 1]).unwrap();
        let err = check_size(f.path(), 1).unwrap_err();
        assert_eq!(err.to_string(), "File too large: 1.00MB (max: 1MB)");
    }

    #[tokio::test]
    async fn pdf_over_limit_is_rejected() {
        let err = check_pages(doc("long.pdf"), 5, Arc::new(FixedPages(6)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Document too long (more than 5 pages)");
    }

    #[tokio::test]
    async fn pdf_at_limit_passes_and_records_count() {
        let d = check_pages(doc("exact.pdf"), 5, Arc::new(FixedPages(5)))
            .await
            .unwrap();
        assert_eq!(d.page_count, Some(5));
    }

    #[tokio::test]
    async fn non_pdf_bypasses_counter() {
        let d = check_pages(doc("photo.jpg"), 1, Arc::new(Unreadable))
            .await
            .unwrap();
        assert_eq!(d.page_count, None);
    }

    #[tokio::test]
    async fn unreadable_pdf_is_wrapped() {
        let err = check_pages(doc("broken.pdf"), 5, Arc::new(Unreadable))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot read PDF: FormatError");
    }

    #[test]
    fn whitespace_only_content_is_empty() {
        assert!(matches!(
            check_content(" \n\t ".into()),
            Err(DocsiftError::EmptyContent)
        ));
        assert!(matches!(
            check_content(String::new()),
            Err(DocsiftError::EmptyContent)
        ));
        assert_eq!(check_content(" x ".into()).unwrap(), " x ");
    }
}
