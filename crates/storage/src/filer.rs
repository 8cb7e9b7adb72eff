use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use stmtfile_core::{Bank, MatchStatus};

use crate::checklist::ChecklistEntry;

/// Give up looking for a free destination name after this many tries.
pub const MAX_CONFLICT_ATTEMPTS: usize = 100;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to create folder {path}: {source}")]
    Folder { path: PathBuf, source: io::Error },
    #[error("no free name for {desired} in {dir} after {attempts} attempts")]
    TooManyConflicts {
        dir: PathBuf,
        desired: String,
        attempts: usize,
    },
    #[error("failed to transfer {from} to {to}: {source}")]
    Transfer {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transfer {
    #[default]
    Copy,
    Move,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilerOptions {
    pub transfer: Transfer,
    /// Remove the source after a successful copy. Ignored when moving.
    pub delete_originals: bool,
}

/// Why a file never reached the filer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Duplicate,
    VerificationFailed,
    Unlabeled,
    InsufficientInfo,
    ExtractionError,
}

/// Outcome recorded in the checklist `Status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    WouldProcess,
    Processed,
    OriginalDeleted,
    DeleteFailed,
    FolderFailed,
    CopyFailed,
    Skipped(SkipReason),
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStatus::WouldProcess => "Would Process",
            FileStatus::Processed => "Processed",
            FileStatus::OriginalDeleted => "Processed (Original Deleted)",
            FileStatus::DeleteFailed => "Processed (Delete Failed)",
            FileStatus::FolderFailed => "Error (Folder Fail)",
            FileStatus::CopyFailed => "Error (Copy Fail)",
            FileStatus::Skipped(SkipReason::Duplicate) => "Skipped (Duplicate)",
            FileStatus::Skipped(SkipReason::VerificationFailed) => "Skipped (Verification Failed)",
            FileStatus::Skipped(SkipReason::Unlabeled) => "Skipped (Unlabeled)",
            FileStatus::Skipped(SkipReason::InsufficientInfo) => "Skipped (Insufficient Info)",
            FileStatus::Skipped(SkipReason::ExtractionError) => "Skipped (Extraction Error)",
        };
        f.write_str(s)
    }
}

/// One statement ready to be filed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequest {
    /// The file in the input folder. Named in the checklist and removed by
    /// `delete_originals` or a move.
    pub original: PathBuf,
    /// What actually gets copied: `original`, or a repaired copy of it.
    pub source: PathBuf,
    pub output_base: PathBuf,
    /// Relative to `output_base`.
    pub subfolder: PathBuf,
    pub filename: String,
    pub bank: Bank,
    pub account_name: Option<String>,
    pub match_status: MatchStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiledFile {
    pub destination: PathBuf,
    /// Destination relative to the output base, always with `/`.
    pub relative: String,
    pub status: FileStatus,
}

/// Copies or moves statements into the output tree and keeps the log the
/// checklist is built from.
#[derive(Debug, Default)]
pub struct Filer {
    options: FilerOptions,
    created: HashSet<PathBuf>,
    reserved: HashSet<PathBuf>,
    log: Vec<ChecklistEntry>,
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

impl Filer {
    pub fn new(options: FilerOptions) -> Self {
        Self { options, ..Default::default() }
    }

    pub fn options(&self) -> FilerOptions {
        self.options
    }

    /// Create `path` unless it is known to exist. A dry run only logs.
    pub fn ensure_folder(&mut self, path: &Path, dry_run: bool) -> Result<(), FileError> {
        if self.created.contains(path) || path.is_dir() {
            self.created.insert(path.to_path_buf());
            return Ok(());
        }
        if dry_run {
            tracing::debug!(path = %path.display(), "dry run: would create folder");
            return Ok(());
        }
        fs::create_dir_all(path).map_err(|source| FileError::Folder {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "created folder");
        self.created.insert(path.to_path_buf());
        Ok(())
    }

    /// First free name among `desired`, `desired (1)`, `desired (2)`, ...
    /// Names handed out earlier in this run count as taken.
    pub fn non_conflicting_name(&self, dir: &Path, desired: &str) -> Result<String, FileError> {
        let taken = |name: &str| {
            let path = dir.join(name);
            self.reserved.contains(&path) || path.exists()
        };
        if !taken(desired) {
            return Ok(desired.to_string());
        }
        let (stem, ext) = match desired.rfind('.') {
            Some(i) if i > 0 => desired.split_at(i),
            _ => (desired, ""),
        };
        for n in 1..=MAX_CONFLICT_ATTEMPTS {
            let candidate = format!("{stem} ({n}){ext}");
            if !taken(&candidate) {
                tracing::warn!(desired, chosen = %candidate, "destination exists, renaming");
                return Ok(candidate);
            }
        }
        tracing::error!(desired, dir = %dir.display(), "too many name conflicts");
        Err(FileError::TooManyConflicts {
            dir: dir.to_path_buf(),
            desired: desired.to_string(),
            attempts: MAX_CONFLICT_ATTEMPTS,
        })
    }

    /// File one statement, or in a dry run work out where it would go.
    pub fn file(&mut self, request: &FileRequest, dry_run: bool) -> Result<FiledFile, FileError> {
        let folder = request.output_base.join(&request.subfolder);

        if let Err(e) = self.ensure_folder(&folder, dry_run) {
            tracing::error!(error = %e, "cannot create destination folder");
            self.record(request, "Error".to_string(), FileStatus::FolderFailed);
            return Err(e);
        }

        let name = match self.non_conflicting_name(&folder, &request.filename) {
            Ok(name) => name,
            Err(e) => {
                self.record(request, "Error".to_string(), FileStatus::CopyFailed);
                return Err(e);
            }
        };
        let destination = folder.join(&name);
        let relative = slash_path(&request.subfolder.join(&name));
        self.reserved.insert(destination.clone());

        if dry_run {
            tracing::info!(
                from = %file_name_of(&request.original),
                to = %relative,
                "dry run: would file"
            );
            self.record(request, relative.clone(), FileStatus::WouldProcess);
            return Ok(FiledFile { destination, relative, status: FileStatus::WouldProcess });
        }

        let transferred = match self.options.transfer {
            Transfer::Copy => fs::copy(&request.source, &destination).map(|_| ()),
            Transfer::Move => move_file(&request.source, &destination),
        };
        if let Err(source) = transferred {
            tracing::error!(
                from = %request.source.display(),
                to = %destination.display(),
                error = %source,
                "transfer failed"
            );
            self.reserved.remove(&destination);
            self.record(request, relative, FileStatus::CopyFailed);
            return Err(FileError::Transfer {
                from: request.source.clone(),
                to: destination,
                source,
            });
        }
        tracing::info!(from = %file_name_of(&request.original), to = %relative, "filed");

        // A move of a repaired copy still has to take the damaged original out.
        let remove_original = match self.options.transfer {
            Transfer::Copy => self.options.delete_originals,
            Transfer::Move => request.source != request.original,
        };
        let status = if !remove_original {
            FileStatus::Processed
        } else {
            match fs::remove_file(&request.original) {
                Ok(()) if self.options.transfer == Transfer::Move => FileStatus::Processed,
                Ok(()) => {
                    tracing::info!(path = %request.original.display(), "deleted original");
                    FileStatus::OriginalDeleted
                }
                Err(e) => {
                    tracing::error!(path = %request.original.display(), error = %e, "failed to delete original");
                    FileStatus::DeleteFailed
                }
            }
        };
        self.record(request, relative.clone(), status);
        Ok(FiledFile { destination, relative, status })
    }

    /// Log a file that never reached [`Filer::file`].
    pub fn record_skip(&mut self, source: &Path, bank: Option<Bank>, reason: SkipReason) {
        let status = FileStatus::Skipped(reason);
        tracing::info!(file = %file_name_of(source), status = %status, "skipped");
        self.log.push(ChecklistEntry {
            original_file: file_name_of(source),
            destination_file: "N/A".to_string(),
            bank_type: bank.map_or("Unknown", Bank::name).to_string(),
            account_name: String::new(),
            match_status: String::new(),
            status: status.to_string(),
            verified: String::new(),
        });
    }

    fn record(&mut self, request: &FileRequest, destination: String, status: FileStatus) {
        self.log.push(ChecklistEntry {
            original_file: file_name_of(&request.original),
            destination_file: destination,
            bank_type: request.bank.name().to_string(),
            account_name: request.account_name.clone().unwrap_or_default(),
            match_status: request.match_status.to_string(),
            status: status.to_string(),
            verified: String::new(),
        });
    }

    pub fn entries(&self) -> &[ChecklistEntry] {
        &self.log
    }

    pub fn into_entries(self) -> Vec<ChecklistEntry> {
        self.log
    }
}

/// `rename`, falling back to copy and delete across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::debug!(error = %e, "rename failed, copying instead");
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}
