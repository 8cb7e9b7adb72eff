use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChecklistError {
    #[error("failed to create checklist folder {path}: {source}")]
    Folder {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write checklist {path}: {source}")]
    Write { path: PathBuf, source: csv::Error },
    #[error("failed to read checklist {path}: {source}")]
    Read { path: PathBuf, source: csv::Error },
}

const HEADERS: [&str; 7] = [
    "Original File",
    "Destination File",
    "Bank Type",
    "Account Name",
    "Match Status",
    "Status",
    "Verified",
];

/// One row of the review checklist. `verified` stays blank for the person
/// signing off on the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    #[serde(rename = "Original File")]
    pub original_file: String,
    #[serde(rename = "Destination File")]
    pub destination_file: String,
    #[serde(rename = "Bank Type")]
    pub bank_type: String,
    #[serde(rename = "Account Name")]
    pub account_name: String,
    #[serde(rename = "Match Status")]
    pub match_status: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Verified")]
    pub verified: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistKind {
    /// Dry runs and cancelled runs: nothing was filed.
    Preview,
    Final,
}

impl ChecklistKind {
    fn prefix(self) -> &'static str {
        match self {
            ChecklistKind::Preview => "preview_",
            ChecklistKind::Final => "",
        }
    }
}

pub fn checklist_filename(kind: ChecklistKind, now: NaiveDateTime) -> String {
    format!("{}checklist_{}.csv", kind.prefix(), now.format("%Y%m%d_%H%M%S"))
}

/// Write `entries`, sorted by original file name, to a timestamped CSV in
/// `dir`. Returns the path written.
pub fn write_checklist(
    dir: &Path,
    entries: &[ChecklistEntry],
    kind: ChecklistKind,
    now: NaiveDateTime,
) -> Result<PathBuf, ChecklistError> {
    fs::create_dir_all(dir).map_err(|source| ChecklistError::Folder {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(checklist_filename(kind, now));
    let write_err = |source| ChecklistError::Write { path: path.clone(), source };

    let mut sorted: Vec<&ChecklistEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.original_file.cmp(&b.original_file));

    // Headers are written by hand so an empty run still gets them.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(write_err)?;
    writer.write_record(HEADERS).map_err(write_err)?;
    for entry in sorted {
        writer.serialize(entry).map_err(write_err)?;
    }
    writer.flush().map_err(|e| write_err(e.into()))?;

    tracing::info!(path = %path.display(), rows = entries.len(), "checklist written");
    Ok(path)
}

pub fn read_checklist(path: &Path) -> Result<Vec<ChecklistEntry>, ChecklistError> {
    let read_err = |source| ChecklistError::Read { path: path.to_path_buf(), source };
    let mut reader = csv::Reader::from_path(path).map_err(read_err)?;
    reader.deserialize().collect::<Result<Vec<_>, _>>().map_err(read_err)
}
