pub mod checklist;
pub mod filer;

pub use checklist::{
    checklist_filename, read_checklist, write_checklist, ChecklistEntry, ChecklistError, ChecklistKind,
};
pub use filer::{
    FileError, FileRequest, FileStatus, FiledFile, Filer, FilerOptions, SkipReason, Transfer,
    MAX_CONFLICT_ATTEMPTS,
};
