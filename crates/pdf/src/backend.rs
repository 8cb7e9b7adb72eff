use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parse error: {0}")]
    Parse(String),
    #[error("{0} panicked while extracting text")]
    Panicked(&'static str),
}

/// Abstraction over a PDF text library.
/// Implementations accept raw PDF bytes and return the text of each page.
pub trait TextBackend: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract_pages(&self, data: &[u8], max_pages: usize) -> Result<Vec<String>, ExtractError>;
}

/// Run a third-party extractor, turning a panic into an error.
fn guarded<T>(
    backend: &'static str,
    f: impl FnOnce() -> Result<T, ExtractError>,
) -> Result<T, ExtractError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or(Err(ExtractError::Panicked(backend)))
}

// ── pdf-extract ───────────────────────────────────────────────────────────────

/// Whole-document extraction via `pdf-extract`, split into pages on form feeds.
pub struct PdfExtractBackend;

impl TextBackend for PdfExtractBackend {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract_pages(&self, data: &[u8], max_pages: usize) -> Result<Vec<String>, ExtractError> {
        let text = guarded(self.name(), || {
            pdf_extract::extract_text_from_mem(data).map_err(|e| ExtractError::Parse(e.to_string()))
        })?;
        Ok(text.split('\x0C').take(max_pages).map(str::to_string).collect())
    }
}

// ── lopdf ─────────────────────────────────────────────────────────────────────

/// Page-by-page extraction via `lopdf`. Pages that fail are skipped.
pub struct LopdfBackend;

impl TextBackend for LopdfBackend {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract_pages(&self, data: &[u8], max_pages: usize) -> Result<Vec<String>, ExtractError> {
        guarded(self.name(), || {
            let doc = lopdf::Document::load_mem(data).map_err(|e| ExtractError::Parse(e.to_string()))?;
            let mut pages = Vec::new();
            for page_number in doc.get_pages().keys().take(max_pages) {
                match doc.extract_text(&[*page_number]) {
                    Ok(text) => pages.push(text),
                    Err(e) => tracing::debug!(page = page_number, error = %e, "lopdf could not extract page"),
                }
            }
            Ok(pages)
        })
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns pre-set text or a pre-set failure regardless of input.
pub struct MockBackend {
    pub text: Option<String>,
}

impl MockBackend {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()) }
    }

    pub fn failing() -> Self {
        Self { text: None }
    }
}

impl TextBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn extract_pages(&self, _data: &[u8], _max_pages: usize) -> Result<Vec<String>, ExtractError> {
        match &self.text {
            Some(text) => Ok(vec![text.clone()]),
            None => Err(ExtractError::Parse("mock failure".into())),
        }
    }
}

// ── Fallback chain ────────────────────────────────────────────────────────────

/// Text lines pulled from a statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedText {
    /// Trimmed, non-blank lines in page order.
    pub lines: Vec<String>,
    /// Which backend produced the text, `None` when every backend came up empty.
    pub backend: Option<&'static str>,
}

impl ExtractedText {
    fn from_pages(pages: &[String], backend: &'static str) -> Self {
        let lines = pages
            .iter()
            .flat_map(|p| p.lines())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Self { lines, backend: Some(backend) }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn full_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Tries each backend in order; the first one to produce non-blank text wins.
///
/// Image-only statements are normal, so running out of backends yields empty
/// text rather than an error.
pub struct FallbackExtractor {
    backends: Vec<Box<dyn TextBackend>>,
    max_pages: usize,
}

impl FallbackExtractor {
    pub fn new(backends: Vec<Box<dyn TextBackend>>, max_pages: usize) -> Self {
        Self { backends, max_pages: max_pages.max(1) }
    }

    /// `pdf-extract` first, then `lopdf`.
    pub fn standard(max_pages: usize) -> Self {
        Self::new(vec![Box::new(PdfExtractBackend), Box::new(LopdfBackend)], max_pages)
    }

    pub fn extract(&self, data: &[u8]) -> ExtractedText {
        for backend in &self.backends {
            match backend.extract_pages(data, self.max_pages) {
                Ok(pages) if pages.iter().any(|p| !p.trim().is_empty()) => {
                    let text = ExtractedText::from_pages(&pages, backend.name());
                    tracing::debug!(backend = backend.name(), lines = text.lines.len(), "extracted text");
                    return text;
                }
                Ok(_) => tracing::debug!(backend = backend.name(), "backend returned no text"),
                Err(e) => tracing::warn!(backend = backend.name(), error = %e, "backend failed"),
            }
        }
        ExtractedText::default()
    }

    pub fn extract_file(&self, path: &Path) -> Result<ExtractedText, ExtractError> {
        let data = std::fs::read(path)?;
        let text = self.extract(&data);
        if text.is_empty() {
            tracing::warn!(file = %path.display(), "no text extracted, likely an image-only PDF");
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{blank_pdf, text_pdf};

    #[test]
    fn mock_returns_preset_text() {
        let b = MockBackend::new("ACCOUNT 1234");
        assert_eq!(b.extract_pages(b"", 10).unwrap(), vec!["ACCOUNT 1234".to_string()]);
        assert!(MockBackend::failing().extract_pages(b"", 10).is_err());
    }

    #[test]
    fn fallback_skips_failing_and_blank_backends() {
        let extractor = FallbackExtractor::new(
            vec![
                Box::new(MockBackend::failing()),
                Box::new(MockBackend::new("   \n  ")),
                Box::new(MockBackend::new("  PNC BANK \n\n Statement  ")),
            ],
            10,
        );
        let text = extractor.extract(b"%PDF-");
        assert_eq!(text.lines, vec!["PNC BANK", "Statement"]);
        assert_eq!(text.backend, Some("mock"));
    }

    #[test]
    fn all_backends_empty_is_not_an_error() {
        let extractor = FallbackExtractor::new(vec![Box::new(MockBackend::failing())], 10);
        let text = extractor.extract(b"garbage");
        assert!(text.is_empty());
        assert_eq!(text.backend, None);
    }

    #[test]
    fn lopdf_reads_synthetic_pdf() {
        let pdf = text_pdf(&[&["Hello World"], &["Second page"]]);
        let pages = LopdfBackend.extract_pages(&pdf, 10).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("Hello World"));
        assert!(pages[1].contains("Second page"));
    }

    #[test]
    fn lopdf_respects_page_limit() {
        let pdf = text_pdf(&[&["one"], &["two"], &["three"]]);
        let pages = LopdfBackend.extract_pages(&pdf, 2).unwrap();
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn lopdf_rejects_garbage() {
        assert!(LopdfBackend.extract_pages(b"not a pdf", 10).is_err());
    }

    #[test]
    fn standard_chain_extracts_text() {
        let pdf = text_pdf(&[&["Hello World"]]);
        let text = FallbackExtractor::standard(10).extract(&pdf);
        assert!(text.full_text().contains("Hello World"));
        assert!(text.backend.is_some());
    }

    #[test]
    fn blank_pdf_yields_no_lines() {
        let text = FallbackExtractor::new(vec![Box::new(LopdfBackend)], 10).extract(&blank_pdf());
        assert!(text.is_empty());
    }

    #[test]
    fn extract_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FallbackExtractor::standard(10).extract_file(&dir.path().join("missing.pdf"));
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }
}
