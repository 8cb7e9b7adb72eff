use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::verify::find_signature;

/// Suffix given to rebuilt copies; files carrying it are never collected as input.
pub const REPAIRED_SUFFIX: &str = ".repaired.pdf";

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no %PDF- signature anywhere in file")]
    NoSignature,
    #[error("document still unreadable: {0}")]
    Unreadable(String),
    #[error("document has no pages")]
    NoPages,
}

pub fn is_repaired_copy(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.to_lowercase().ends_with(REPAIRED_SUFFIX))
}

/// `statement.pdf` → `statement.repaired.pdf`, next to the original.
pub fn repaired_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("document");
    path.with_file_name(format!("{stem}{REPAIRED_SUFFIX}"))
}

/// Rebuild a damaged PDF: drop junk before the signature, re-parse, renumber
/// objects and write a fresh copy. Returns the path of the copy.
pub fn repair(path: &Path) -> Result<PathBuf, RepairError> {
    let data = std::fs::read(path)?;
    let start = find_signature(&data).ok_or(RepairError::NoSignature)?;
    let mut doc = lopdf::Document::load_mem(&data[start..])
        .map_err(|e| RepairError::Unreadable(e.to_string()))?;
    if doc.get_pages().is_empty() {
        return Err(RepairError::NoPages);
    }
    doc.renumber_objects();

    let out = repaired_path(path);
    if let Err(e) = doc.save(&out) {
        let _ = std::fs::remove_file(&out);
        return Err(e.into());
    }
    tracing::info!(from = %path.display(), to = %out.display(), skipped_bytes = start, "repaired PDF");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::text_pdf;
    use crate::verify::PdfVerifier;

    #[test]
    fn repaired_path_naming() {
        assert_eq!(
            repaired_path(Path::new("/in/Statement_1.pdf")),
            PathBuf::from("/in/Statement_1.repaired.pdf")
        );
        assert!(is_repaired_copy(Path::new("/in/a.REPAIRED.pdf")));
        assert!(!is_repaired_copy(Path::new("/in/a.pdf")));
    }

    #[test]
    fn strips_leading_junk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.pdf");
        let mut data = b"HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\n\r\n".to_vec();
        data.extend_from_slice(&text_pdf(&[&["Hello World"]]));
        std::fs::write(&path, &data).unwrap();

        let mut verifier = PdfVerifier::new();
        assert!(verifier.verify(&path).is_err());

        let fixed = repair(&path).unwrap();
        assert_eq!(fixed, dir.path().join("junk.repaired.pdf"));
        verifier.verify(&fixed).unwrap();
    }

    #[test]
    fn no_signature_is_unrepairable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.pdf");
        std::fs::write(&path, b"just some text").unwrap();
        assert!(matches!(repair(&path), Err(RepairError::NoSignature)));
        assert!(!repaired_path(&path).exists());
    }

    #[test]
    fn garbage_body_is_unrepairable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pdf");
        std::fs::write(&path, b"xx%PDF-1.4 nothing else").unwrap();
        assert!(matches!(
            repair(&path),
            Err(RepairError::Unreadable(_) | RepairError::NoPages)
        ));
        assert!(!repaired_path(&path).exists());
    }
}
