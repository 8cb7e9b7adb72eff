use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Anything larger is almost certainly not a bank statement.
pub const MAX_PDF_SIZE: u64 = 150 * 1024 * 1024;

/// `%PDF-` must start within this many leading bytes.
const SIGNATURE_WINDOW: usize = 20;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("file not found")]
    NotFound,
    #[error("not a regular file")]
    NotAFile,
    #[error("file is empty")]
    Empty,
    #[error("file too large ({0} bytes)")]
    TooLarge(u64),
    #[error("missing %PDF- signature")]
    BadSignature,
    #[error("invalid PDF structure: {0}")]
    Structure(String),
    #[error("previously found corrupt")]
    KnownCorrupt,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VerifyError {
    /// Whether the file itself is damaged, as opposed to missing or unreadable.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            VerifyError::Empty
                | VerifyError::BadSignature
                | VerifyError::Structure(_)
                | VerifyError::KnownCorrupt
        )
    }
}

/// Checks that files are readable PDFs, remembering verdicts for the run.
#[derive(Debug, Default)]
pub struct PdfVerifier {
    verified: HashSet<PathBuf>,
    corrupt: HashSet<PathBuf>,
}

impl PdfVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verify(&mut self, path: &Path) -> Result<(), VerifyError> {
        if self.verified.contains(path) {
            return Ok(());
        }
        if self.corrupt.contains(path) {
            return Err(VerifyError::KnownCorrupt);
        }
        let result = check(path);
        match &result {
            Ok(()) => {
                self.verified.insert(path.to_path_buf());
            }
            Err(e) if e.is_corruption() => {
                tracing::warn!(file = %path.display(), error = %e, "PDF failed verification");
                self.corrupt.insert(path.to_path_buf());
            }
            Err(e) => tracing::warn!(file = %path.display(), error = %e, "could not verify PDF"),
        }
        result
    }

    pub fn is_corrupt(&self, path: &Path) -> bool {
        self.corrupt.contains(path)
    }

    pub fn verified_count(&self) -> usize {
        self.verified.len()
    }

    pub fn corrupt_count(&self) -> usize {
        self.corrupt.len()
    }
}

fn check(path: &Path) -> Result<(), VerifyError> {
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(VerifyError::NotFound),
        Err(e) => return Err(e.into()),
    };
    if !meta.is_file() {
        return Err(VerifyError::NotAFile);
    }
    match meta.len() {
        0 => return Err(VerifyError::Empty),
        n if n > MAX_PDF_SIZE => return Err(VerifyError::TooLarge(n)),
        _ => {}
    }

    let mut head = Vec::with_capacity(SIGNATURE_WINDOW);
    std::fs::File::open(path)?
        .take(SIGNATURE_WINDOW as u64)
        .read_to_end(&mut head)?;
    if find_signature(&head).is_none() {
        return Err(VerifyError::BadSignature);
    }

    let doc = lopdf::Document::load(path).map_err(|e| VerifyError::Structure(e.to_string()))?;
    if doc.get_pages().is_empty() {
        tracing::warn!(file = %path.display(), "PDF has no pages");
    }
    Ok(())
}

/// Offset of the `%PDF-` marker in `data`.
pub fn find_signature(data: &[u8]) -> Option<usize> {
    data.windows(5).position(|w| w == b"%PDF-")
}
