use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Compute SHA-256 of a file via streaming reads (constant memory).
pub fn sha256_file(path: &Path) -> io::Result<[u8; 32]> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().into())
}

/// Encode a raw 32-byte hash as a lowercase hex string (64 chars).
pub fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Files with identical content. `paths[0]` is the first one seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub hash_hex: String,
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    pub fn original(&self) -> &Path {
        &self.paths[0]
    }

    pub fn copies(&self) -> &[PathBuf] {
        &self.paths[1..]
    }
}

/// Group `paths` by content hash, keeping input order both across and within
/// groups. Only groups with more than one member are returned. Unreadable
/// files are logged and left out.
pub fn find_duplicates(paths: &[PathBuf]) -> Vec<DuplicateGroup> {
    let mut order: Vec<[u8; 32]> = Vec::new();
    let mut groups: HashMap<[u8; 32], Vec<PathBuf>> = HashMap::new();
    for path in paths {
        match sha256_file(path) {
            Ok(hash) => {
                let entry = groups.entry(hash).or_default();
                if entry.is_empty() {
                    order.push(hash);
                }
                entry.push(path.clone());
            }
            Err(e) => tracing::warn!(file = %path.display(), error = %e, "could not hash file"),
        }
    }
    order
        .into_iter()
        .filter_map(|hash| {
            let paths = groups.remove(&hash)?;
            (paths.len() > 1).then(|| DuplicateGroup { hash_hex: to_hex(&hash), paths })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_file_known_vector() {
        // SHA-256 of empty input is a known constant.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();
        let hex = to_hex(&sha256_file(&path).unwrap());
        assert_eq!(
            hex,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_file_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sha256_file(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn groups_preserve_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let mk = |name: &str, body: &[u8]| {
            let p = dir.path().join(name);
            std::fs::write(&p, body).unwrap();
            p
        };
        let paths = vec![
            mk("c.pdf", b"same"),
            mk("a.pdf", b"other"),
            mk("b.pdf", b"same"),
            mk("d.pdf", b"unique"),
            mk("e.pdf", b"other"),
            dir.path().join("missing.pdf"),
        ];
        let groups = find_duplicates(&paths);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].original(), dir.path().join("c.pdf"));
        assert_eq!(groups[0].copies(), &[dir.path().join("b.pdf")]);
        assert_eq!(groups[1].original(), dir.path().join("a.pdf"));
        assert_eq!(groups[1].hash_hex.len(), 64);
    }

    #[test]
    fn no_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        std::fs::write(&a, b"x").unwrap();
        assert!(find_duplicates(&[a]).is_empty());
    }
}
