pub mod backend;
pub mod hash;
pub mod repair;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod verify;

pub use backend::{
    ExtractError, ExtractedText, FallbackExtractor, LopdfBackend, MockBackend, PdfExtractBackend,
    TextBackend,
};
pub use hash::{find_duplicates, sha256_file, to_hex, DuplicateGroup};
pub use repair::{is_repaired_copy, repair, repaired_path, RepairError};
pub use verify::{PdfVerifier, VerifyError};
