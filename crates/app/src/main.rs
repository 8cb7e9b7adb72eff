use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use stmtfile_core::{Config, SensitiveAccounts};
use stmtfile_import::StatementProcessor;
use stmtfile_storage::Transfer;

mod logging;
mod pipeline;

use pipeline::{Confirm, Pipeline, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "stmtfile", version, about = "Rename and file bank statement PDFs")]
struct Cli {
    /// Folder of statements to process (overrides `input_folder`)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Root of the filed statement tree (overrides `processed_folder`)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Settings file, created with defaults when missing
    #[arg(long, default_value = "stmtfile.toml")]
    config: PathBuf,

    /// Sensitive-account list (overrides `sensitive_accounts_file`)
    #[arg(long)]
    sensitive_accounts: Option<PathBuf>,

    /// Preview only; nothing is copied or moved
    #[arg(long)]
    dry_run: bool,

    /// Print the grouped preview for each batch
    #[arg(long)]
    show_preview: bool,

    #[arg(long, value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: Option<String>,

    /// Defaults to logs/stmtfile_<timestamp>.log
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// File byte-identical copies instead of skipping them
    #[arg(long)]
    process_duplicates: bool,

    /// Where the review checklist goes (overrides `checklist_dir`)
    #[arg(long)]
    checklist_dir: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(long)]
    auto_confirm: bool,

    /// Move files instead of copying them
    #[arg(long = "move")]
    move_files: bool,
}

impl Cli {
    fn run_options(&self, config: &Config) -> RunOptions {
        let settings = &config.settings;
        RunOptions {
            input: self.input.clone().unwrap_or_else(|| settings.input_folder.clone()),
            output: self.output.clone().unwrap_or_else(|| settings.processed_folder.clone()),
            checklist_dir: self.checklist_dir.clone().unwrap_or_else(|| settings.checklist_dir.clone()),
            dry_run: self.dry_run,
            show_preview: self.show_preview,
            process_duplicates: self.process_duplicates,
            confirm: if self.auto_confirm { Confirm::Auto } else { Confirm::Prompt },
            transfer: if self.move_files { Transfer::Move } else { Transfer::Copy },
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let config_existed = cli.config.exists();
    let config = Config::load_or_init(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;

    let now = Local::now().naive_local();
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| logging::default_log_path(Path::new("logs"), now));
    logging::init(cli.log_level.as_deref(), config.settings.log_level.as_deref(), &log_file)?;
    if !config_existed {
        tracing::warn!(path = %cli.config.display(), "no settings file found, wrote defaults");
    }
    tracing::info!(config = %cli.config.display(), log = %log_file.display(), "starting");

    let sensitive_path = cli
        .sensitive_accounts
        .clone()
        .unwrap_or_else(|| config.sensitive_accounts_path(&cli.config));
    let sensitive = SensitiveAccounts::load(&sensitive_path)
        .with_context(|| format!("loading sensitive accounts from {}", sensitive_path.display()))?;

    let options = cli.run_options(&config);
    if options.dry_run {
        tracing::info!("dry run: no files will be copied or moved");
    }
    let processor = StatementProcessor::new(&config, sensitive, now.date());
    let summary = Pipeline::new(config.settings.clone(), options, processor).run().await?;
    Ok(summary.exit_code())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        // The prompt's stdin reader may still be blocked; don't wait for it.
        Ok(130) => std::process::exit(130),
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "fatal");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
