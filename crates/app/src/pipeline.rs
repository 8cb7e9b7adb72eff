//! One filing run: collect, de-duplicate, verify, preview, confirm, file,
//! and write the checklist.

use anyhow::{bail, Context, Result};
use chrono::Local;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use stmtfile_core::Settings;
use stmtfile_import::{ExtractionStats, Processed, StatementProcessor};
use stmtfile_pdf::{find_duplicates, is_repaired_copy, repair, FallbackExtractor, PdfVerifier};
use stmtfile_storage::{
    write_checklist, ChecklistEntry, ChecklistKind, FileRequest, Filer, FilerOptions, SkipReason, Transfer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    /// Ask on the terminal before the first batch is filed.
    Prompt,
    Auto,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub checklist_dir: PathBuf,
    pub dry_run: bool,
    pub show_preview: bool,
    pub process_duplicates: bool,
    pub confirm: Confirm,
    pub transfer: Transfer,
}

/// A PDF queued for processing. `source` is a repaired copy when the
/// original failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub original: PathBuf,
    pub source: PathBuf,
}

impl Candidate {
    fn new(path: PathBuf) -> Self {
        Self { original: path.clone(), source: path }
    }

    fn file_name(&self) -> String {
        file_name(&self.original)
    }
}

/// A previewed statement and where it will go.
#[derive(Debug, Clone)]
struct Plan {
    original: String,
    relative: String,
    request: FileRequest,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub attempted: usize,
    /// Filed, or in a dry run, previewed for filing.
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub stats: ExtractionStats,
    pub checklist: Option<PathBuf>,
    pub cancelled: bool,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn exit_code(&self) -> u8 {
        if self.interrupted {
            130
        } else if self.errors > 0 {
            1
        } else {
            0
        }
    }
}

enum Answer {
    Yes,
    No,
    Interrupted,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── Collection ────────────────────────────────────────────────────────────────

/// `*.pdf` files directly in `dir`, any case, sorted, without repaired copies.
pub fn collect_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("input folder {} does not exist or is not a folder", dir.display());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry.with_context(|| format!("reading {}", dir.display()))?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() && !is_repaired_copy(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Drop every copy after the first in each group of identical files.
pub fn drop_duplicates(files: Vec<PathBuf>, skips: &mut Filer) -> Vec<PathBuf> {
    let groups = find_duplicates(&files);
    let copies: HashSet<&PathBuf> = groups.iter().flat_map(|g| g.copies()).collect();
    for group in &groups {
        for copy in group.copies() {
            tracing::info!(
                file = %file_name(copy),
                original = %file_name(group.original()),
                hash = %group.hash_hex,
                "skipping duplicate"
            );
            skips.record_skip(copy, None, SkipReason::Duplicate);
        }
    }
    files.into_iter().filter(|f| !copies.contains(f)).collect()
}

/// Verify each file, repairing corrupt ones when `auto_recovery` is on.
pub fn verify_all(files: Vec<PathBuf>, auto_recovery: bool, skips: &mut Filer) -> Vec<Candidate> {
    let mut verifier = PdfVerifier::new();
    let mut ready = Vec::with_capacity(files.len());
    for path in files {
        match verifier.verify(&path) {
            Ok(()) => ready.push(Candidate::new(path)),
            Err(e) if e.is_corruption() && auto_recovery => {
                let repaired = repair(&path).map_err(|e| e.to_string()).and_then(|fixed| {
                    verifier.verify(&fixed).map(|()| fixed).map_err(|e| e.to_string())
                });
                match repaired {
                    Ok(fixed) => {
                        tracing::info!(file = %file_name(&path), repaired = %fixed.display(), "using repaired copy");
                        ready.push(Candidate { original: path, source: fixed });
                    }
                    Err(reason) => {
                        tracing::error!(file = %file_name(&path), error = %reason, "repair failed");
                        skips.record_skip(&path, None, SkipReason::VerificationFailed);
                    }
                }
            }
            Err(e) => {
                tracing::error!(file = %file_name(&path), error = %e, "verification failed");
                skips.record_skip(&path, None, SkipReason::VerificationFailed);
            }
        }
    }
    tracing::info!(
        verified = verifier.verified_count(),
        corrupt = verifier.corrupt_count(),
        "verification finished"
    );
    ready
}

// ── Extraction ────────────────────────────────────────────────────────────────

enum Extraction {
    Done { processed: Processed, no_text: bool },
    Failed,
}

/// Extract and process `batch` on the blocking pool, at most `max_workers`
/// at a time. Results come back in batch order.
async fn extract_batch(
    batch: &[Candidate],
    extractor: &Arc<FallbackExtractor>,
    processor: &Arc<StatementProcessor>,
    max_workers: usize,
) -> Result<Vec<(Candidate, Extraction)>> {
    let limit = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut tasks = JoinSet::new();
    for (index, candidate) in batch.iter().cloned().enumerate() {
        let permit = limit.clone().acquire_owned().await.context("worker pool closed")?;
        let extractor = Arc::clone(extractor);
        let processor = Arc::clone(processor);
        tasks.spawn_blocking(move || {
            let _permit = permit;
            let outcome = match extractor.extract_file(&candidate.source) {
                Ok(text) => Extraction::Done {
                    processed: processor.process(&candidate.file_name(), &text.lines),
                    no_text: text.is_empty(),
                },
                Err(e) => {
                    tracing::error!(file = %candidate.file_name(), error = %e, "text extraction failed");
                    Extraction::Failed
                }
            };
            (index, candidate, outcome)
        });
    }

    let mut results = Vec::with_capacity(batch.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => tracing::error!(error = %e, "extraction worker failed"),
        }
    }
    // Workers that died never reported back; surface them as failures.
    let reported: HashSet<usize> = results.iter().map(|(i, _, _)| *i).collect();
    for (index, candidate) in batch.iter().enumerate() {
        if !reported.contains(&index) {
            results.push((index, candidate.clone(), Extraction::Failed));
        }
    }
    results.sort_by_key(|(i, _, _)| *i);
    Ok(results.into_iter().map(|(_, c, e)| (c, e)).collect())
}

// ── Preview ───────────────────────────────────────────────────────────────────

fn print_preview(plans: &[Plan]) {
    let mut by_bank: BTreeMap<&str, Vec<&Plan>> = BTreeMap::new();
    for plan in plans {
        by_bank.entry(plan.request.bank.name()).or_default().push(plan);
    }
    println!("PREVIEW_SUMMARY:");
    for (bank, plans) in &by_bank {
        println!("BANK_COUNT: {bank} {}", plans.len());
        for plan in plans {
            println!("  From: {} -> To: {}", plan.original, plan.relative);
        }
    }
    println!("PROCESSED_COUNT: {}", plans.len());
}

async fn ask(count: usize) -> Result<Answer> {
    print!("Proceed with filing {count} file(s)? [y/N] ");
    io::stdout().flush()?;
    let read = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().read_line(&mut line).map(|_| line)
    });
    tokio::select! {
        line = read => {
            let line = line.context("reading confirmation")??;
            Ok(match line.trim().to_lowercase().as_str() {
                "y" | "yes" => Answer::Yes,
                _ => Answer::No,
            })
        }
        _ = tokio::signal::ctrl_c() => Ok(Answer::Interrupted),
    }
}

// ── Run ───────────────────────────────────────────────────────────────────────

pub struct Pipeline {
    settings: Settings,
    options: RunOptions,
    processor: Arc<StatementProcessor>,
    extractor: Arc<FallbackExtractor>,
}

impl Pipeline {
    pub fn new(settings: Settings, options: RunOptions, processor: StatementProcessor) -> Self {
        let extractor = FallbackExtractor::standard(settings.pdf_scan_max_pages);
        Self {
            settings,
            options,
            processor: Arc::new(processor),
            extractor: Arc::new(extractor),
        }
    }

    pub fn with_extractor(mut self, extractor: FallbackExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub async fn run(self) -> Result<RunSummary> {
        let started = Instant::now();
        let mut summary = RunSummary::default();
        let opts = &self.options;

        let files = collect_pdfs(&opts.input)?;
        summary.attempted = files.len();
        tracing::info!(input = %opts.input.display(), files = files.len(), "collected PDFs");

        // Skips are kept apart so they land in the checklist whether or not
        // anything is filed.
        let skips = Filer::default();
        let check_duplicates = self.settings.check_duplicates && !opts.process_duplicates;
        let verification = self.settings.file_verification;
        let auto_recovery = self.settings.auto_recovery;
        let (candidates, mut skips) = tokio::task::spawn_blocking(move || {
            let mut skips = skips;
            let files = if check_duplicates { drop_duplicates(files, &mut skips) } else { files };
            let candidates = if verification {
                verify_all(files, auto_recovery, &mut skips)
            } else {
                files.into_iter().map(Candidate::new).collect()
            };
            (candidates, skips)
        })
        .await
        .context("checking input files")?;

        let filer_options = FilerOptions {
            transfer: opts.transfer,
            delete_originals: self.settings.delete_originals,
        };
        let mut preview = Filer::new(filer_options);
        let mut executor = Filer::new(filer_options);
        let mut confirmed = opts.dry_run || opts.confirm == Confirm::Auto;
        let batch_size = self.settings.batch_size.max(1);
        let total_batches = candidates.len().div_ceil(batch_size);

        for (n, batch) in candidates.chunks(batch_size).enumerate() {
            tracing::info!(batch = n + 1, of = total_batches, files = batch.len(), "processing batch");
            let results =
                extract_batch(batch, &self.extractor, &self.processor, self.settings.max_workers).await?;

            let mut plans = Vec::new();
            for (candidate, outcome) in results {
                let processed = match outcome {
                    Extraction::Failed => {
                        summary.stats.increment(ExtractionStats::TEXT_EXTRACTION_FAILED);
                        summary.errors += 1;
                        skips.record_skip(&candidate.original, None, SkipReason::ExtractionError);
                        continue;
                    }
                    Extraction::Done { processed, no_text } => {
                        if no_text {
                            summary.stats.increment(ExtractionStats::NO_TEXT);
                        }
                        summary.stats.record(&processed);
                        processed
                    }
                };
                match processed {
                    Processed::Filed { info, .. } | Processed::Unlabeled { info: Some(info) } => {
                        let (subfolder, filename) = self.processor.destination(&info);
                        let request = FileRequest {
                            original: candidate.original.clone(),
                            source: candidate.source.clone(),
                            output_base: opts.output.clone(),
                            subfolder,
                            filename,
                            bank: info.bank,
                            account_name: info.account_name.clone(),
                            match_status: info.match_status,
                        };
                        match preview.file(&request, true) {
                            Ok(filed) => plans.push(Plan {
                                original: candidate.file_name(),
                                relative: filed.relative,
                                request,
                            }),
                            Err(e) => {
                                tracing::error!(file = %candidate.file_name(), error = %e, "cannot place file");
                                summary.errors += 1;
                            }
                        }
                    }
                    Processed::Unlabeled { info: None } => {
                        skips.record_skip(&candidate.original, None, SkipReason::Unlabeled);
                    }
                    Processed::Insufficient { info } => {
                        skips.record_skip(&candidate.original, Some(info.bank), SkipReason::InsufficientInfo);
                    }
                }
            }

            if opts.show_preview {
                print_preview(&plans);
            }
            if opts.dry_run {
                summary.processed += plans.len();
                continue;
            }
            if plans.is_empty() {
                continue;
            }

            if !confirmed && !summary.cancelled {
                match ask(plans.len()).await? {
                    Answer::Yes => confirmed = true,
                    Answer::No => {
                        tracing::warn!("filing cancelled by user");
                        summary.cancelled = true;
                    }
                    Answer::Interrupted => {
                        tracing::warn!("interrupted at confirmation prompt");
                        summary.cancelled = true;
                        summary.interrupted = true;
                        break;
                    }
                }
            }
            if summary.cancelled {
                continue;
            }

            let filer = std::mem::take(&mut executor);
            let (filer, ok, failed) = tokio::task::spawn_blocking(move || {
                let mut filer = filer;
                let mut ok = 0;
                let mut failed = 0;
                for plan in &plans {
                    match filer.file(&plan.request, false) {
                        Ok(_) => ok += 1,
                        Err(e) => {
                            tracing::error!(file = %plan.original, error = %e, "filing failed");
                            failed += 1;
                        }
                    }
                }
                (filer, ok, failed)
            })
            .await
            .context("filing batch")?;
            executor = filer;
            summary.processed += ok;
            summary.errors += failed;
        }

        discard_repaired(&candidates);

        let preview_only = opts.dry_run || summary.cancelled;
        let mut entries = skips.into_entries();
        summary.skipped = entries.len();
        if preview_only {
            entries.extend(preview.into_entries());
        } else {
            entries.extend(executor.into_entries());
        }
        let kind = if preview_only { ChecklistKind::Preview } else { ChecklistKind::Final };
        summary.checklist = write_run_checklist(&opts.checklist_dir, &entries, kind);

        summary.elapsed = started.elapsed();
        report(&summary);
        Ok(summary)
    }
}

/// Remove repaired copies left in the input folder. Filed ones were already
/// copied out or moved.
fn discard_repaired(candidates: &[Candidate]) {
    for candidate in candidates.iter().filter(|c| c.source != c.original) {
        if !candidate.source.exists() {
            continue;
        }
        match fs::remove_file(&candidate.source) {
            Ok(()) => tracing::debug!(path = %candidate.source.display(), "removed repaired copy"),
            Err(e) => tracing::warn!(path = %candidate.source.display(), error = %e, "could not remove repaired copy"),
        }
    }
}

fn write_run_checklist(dir: &Path, entries: &[ChecklistEntry], kind: ChecklistKind) -> Option<PathBuf> {
    match write_checklist(dir, entries, kind, Local::now().naive_local()) {
        Ok(path) => {
            println!("CHECKLIST_PATH: {}", path.display());
            Some(path)
        }
        Err(e) => {
            tracing::error!(error = %e, "could not write checklist");
            None
        }
    }
}

fn report(summary: &RunSummary) {
    tracing::info!(
        attempted = summary.attempted,
        processed = summary.processed,
        skipped = summary.skipped,
        errors = summary.errors,
        cancelled = summary.cancelled,
        elapsed_secs = summary.elapsed.as_secs_f64(),
        "run finished"
    );
    println!(
        "SUMMARY: attempted={} processed={} skipped={} errors={} elapsed={:.1}s{}",
        summary.attempted,
        summary.processed,
        summary.skipped,
        summary.errors,
        summary.elapsed.as_secs_f64(),
        if summary.cancelled { " (cancelled)" } else { "" }
    );
    if !summary.stats.is_empty() {
        println!("EXTRACTION_STATS: {}", summary.stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stmtfile_core::{Config, SensitiveAccounts};
    use stmtfile_pdf::testing::{blank_pdf, text_pdf};
    use stmtfile_pdf::{repaired_path, LopdfBackend};
    use stmtfile_storage::read_checklist;
    use tempfile::TempDir;

    const BERKSHIRE: &str = "NewStatement_2024-01-31_4455.pdf";
    const BERKSHIRE_FILED: &str = "Berkshire/2024-01/4455-BERKSHIRE_ACCOUNT_4455-20240131.pdf";

    struct Workspace {
        _dir: TempDir,
        input: PathBuf,
        output: PathBuf,
        checklists: PathBuf,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let input = dir.path().join("in");
            fs::create_dir(&input).unwrap();
            Self {
                input,
                output: dir.path().join("out"),
                checklists: dir.path().join("checklists"),
                _dir: dir,
            }
        }

        fn add(&self, name: &str, bytes: &[u8]) -> PathBuf {
            let path = self.input.join(name);
            fs::write(&path, bytes).unwrap();
            path
        }

        fn options(&self) -> RunOptions {
            RunOptions {
                input: self.input.clone(),
                output: self.output.clone(),
                checklist_dir: self.checklists.clone(),
                dry_run: false,
                show_preview: false,
                process_duplicates: false,
                confirm: Confirm::Auto,
                transfer: Transfer::Copy,
            }
        }

        fn pipeline(&self, options: RunOptions) -> Pipeline {
            let config = Config::default();
            let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
            let processor = StatementProcessor::new(&config, SensitiveAccounts::default(), today);
            Pipeline::new(config.settings, options, processor)
                .with_extractor(FallbackExtractor::new(vec![Box::new(LopdfBackend)], 10))
        }
    }

    #[test]
    fn collects_only_pdfs() {
        let ws = Workspace::new();
        ws.add("b.PDF", &blank_pdf());
        ws.add("a.pdf", &blank_pdf());
        ws.add("a.repaired.pdf", &blank_pdf());
        ws.add("notes.txt", b"hello");
        fs::create_dir(ws.input.join("sub.pdf")).unwrap();

        let names: Vec<String> = collect_pdfs(&ws.input).unwrap().iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["a.pdf", "b.PDF"]);
    }

    #[test]
    fn missing_input_folder_is_an_error() {
        let ws = Workspace::new();
        assert!(collect_pdfs(&ws.input.join("nope")).is_err());
    }

    #[test]
    fn duplicates_keep_the_first_copy() {
        let ws = Workspace::new();
        let a = ws.add("a.pdf", &blank_pdf());
        let b = ws.add("b.pdf", &blank_pdf());
        let c = ws.add("c.pdf", &text_pdf(&[&["different"]]));

        let mut skips = Filer::default();
        let kept = drop_duplicates(vec![a.clone(), b, c.clone()], &mut skips);
        assert_eq!(kept, vec![a, c]);
        assert_eq!(skips.entries().len(), 1);
        assert_eq!(skips.entries()[0].original_file, "b.pdf");
    }

    #[test]
    fn exit_codes() {
        let mut summary = RunSummary::default();
        assert_eq!(summary.exit_code(), 0);
        summary.errors = 2;
        assert_eq!(summary.exit_code(), 1);
        summary.interrupted = true;
        assert_eq!(summary.exit_code(), 130);
    }

    #[tokio::test]
    async fn files_image_statement_by_download_name() {
        let ws = Workspace::new();
        let source = ws.add(BERKSHIRE, &blank_pdf());

        let summary = ws.pipeline(ws.options()).run().await.unwrap();
        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.stats.get(ExtractionStats::NO_TEXT), 1);
        assert!(ws.output.join(BERKSHIRE_FILED).is_file());
        assert!(source.exists(), "copy mode keeps the original");

        let checklist = summary.checklist.unwrap();
        assert!(file_name(&checklist).starts_with("checklist_"));
        let rows = read_checklist(&checklist).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].original_file, BERKSHIRE);
        assert_eq!(rows[0].bank_type, "Berkshire");
    }

    #[tokio::test]
    async fn dry_run_writes_preview_checklist_only() {
        let ws = Workspace::new();
        ws.add(BERKSHIRE, &blank_pdf());
        let options = RunOptions { dry_run: true, confirm: Confirm::Prompt, ..ws.options() };

        let summary = ws.pipeline(options).run().await.unwrap();
        assert_eq!(summary.processed, 1);
        assert!(!ws.output.exists());

        let checklist = summary.checklist.unwrap();
        assert!(file_name(&checklist).starts_with("preview_checklist_"));
        let rows = read_checklist(&checklist).unwrap();
        assert_eq!(rows[0].status, "Would Process");
        assert!(rows[0].destination_file.ends_with("4455-BERKSHIRE_ACCOUNT_4455-20240131.pdf"));
    }

    #[tokio::test]
    async fn skips_land_in_the_checklist() {
        let ws = Workspace::new();
        ws.add(BERKSHIRE, &blank_pdf());
        ws.add("zz_copy.pdf", &blank_pdf());
        ws.add("broken.pdf", b"this is not a pdf");
        ws.add("notes.pdf", &text_pdf(&[&["Meeting notes", "nothing to see"]]));

        let summary = ws.pipeline(ws.options()).run().await.unwrap();
        assert_eq!(summary.attempted, 4);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 3);

        let rows = read_checklist(&summary.checklist.unwrap()).unwrap();
        let status_of = |name: &str| {
            rows.iter().find(|r| r.original_file == name).map(|r| r.status.clone()).unwrap()
        };
        assert_eq!(rows.len(), 4);
        assert!(status_of("zz_copy.pdf").contains("Duplicate"));
        assert!(status_of("broken.pdf").contains("Verification"));
        assert!(status_of("notes.pdf").contains("Unlabeled"));
    }

    fn junk_prefixed(pdf: &[u8]) -> Vec<u8> {
        let mut data = b"HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\n\r\n".to_vec();
        data.extend_from_slice(pdf);
        data
    }

    #[tokio::test]
    async fn repaired_statement_keeps_its_name() {
        let ws = Workspace::new();
        let original = ws.add(BERKSHIRE, &junk_prefixed(&blank_pdf()));

        let summary = ws.pipeline(ws.options()).run().await.unwrap();
        assert_eq!(summary.processed, 1);
        assert!(ws.output.join(BERKSHIRE_FILED).is_file());
        assert!(original.exists(), "copy mode keeps the original");
        assert!(!repaired_path(&original).exists());

        let rows = read_checklist(&summary.checklist.unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].original_file, BERKSHIRE);
        assert_eq!(rows[0].status, "Processed");
    }

    #[tokio::test]
    async fn moving_a_repaired_statement_clears_the_input() {
        let ws = Workspace::new();
        let original = ws.add(BERKSHIRE, &junk_prefixed(&blank_pdf()));
        let options = RunOptions { transfer: Transfer::Move, ..ws.options() };

        let summary = ws.pipeline(options).run().await.unwrap();
        assert_eq!(summary.processed, 1);
        assert!(ws.output.join(BERKSHIRE_FILED).is_file());
        assert!(!original.exists());
        assert!(!repaired_path(&original).exists());
        assert_eq!(fs::read_dir(&ws.input).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn dry_run_leaves_no_repaired_copies() {
        let ws = Workspace::new();
        let original = ws.add(BERKSHIRE, &junk_prefixed(&blank_pdf()));
        let options = RunOptions { dry_run: true, ..ws.options() };

        let summary = ws.pipeline(options).run().await.unwrap();
        assert_eq!(summary.processed, 1);
        assert!(original.exists());
        assert!(!repaired_path(&original).exists());
        let rows = read_checklist(&summary.checklist.unwrap()).unwrap();
        assert_eq!(rows[0].original_file, BERKSHIRE);
    }

    #[tokio::test]
    async fn duplicates_can_be_processed() {
        let ws = Workspace::new();
        ws.add(BERKSHIRE, &blank_pdf());
        ws.add("NewStatement_2024-01-31_4455 copy.pdf", &blank_pdf());
        let options = RunOptions { process_duplicates: true, ..ws.options() };

        let summary = ws.pipeline(options).run().await.unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, 0);
        let folder = ws.output.join("Berkshire/2024-01");
        assert_eq!(fs::read_dir(folder).unwrap().count(), 2);
    }
}
