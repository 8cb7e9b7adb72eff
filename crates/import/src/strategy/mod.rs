//! Per-bank extraction and naming.
//!
//! Each strategy reads the statement's text lines, fills in a
//! [`StatementInfo`], and decides where the file goes. Identity is settled in
//! tiers: the sensitive-account list first, then what the regexes found,
//! then the static mapping tables, then a templated default name.

use chrono::NaiveDate;
use std::path::PathBuf;

use stmtfile_core::{AccountMappings, Bank, PatternSettings, SensitiveAccount, StatementInfo};

pub mod bank_united;
pub mod berkshire;
pub mod cambridge;
pub mod naming;
pub mod pnc;
pub mod unlabeled;

pub use bank_united::BankUnitedStrategy;
pub use berkshire::BerkshireStrategy;
pub use cambridge::CambridgeStrategy;
pub use pnc::PncStrategy;
pub use unlabeled::UnlabeledStrategy;

/// Everything a strategy may consult besides the statement itself.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    /// Sensitive accounts for the strategy's bank only.
    pub sensitive: &'a [SensitiveAccount],
    pub mappings: &'a AccountMappings,
    pub patterns: &'a PatternSettings,
    /// Reference date for year sanity checks and undated fallbacks.
    pub today: NaiveDate,
}

pub trait BankStrategy: Send + Sync {
    fn bank(&self) -> Bank;

    /// Fill `info` from the statement's text lines. `lines` may be empty for
    /// image-only PDFs.
    fn extract(&self, lines: &[String], info: &mut StatementInfo, ctx: &StrategyContext<'_>);

    /// Destination file name, already sanitized and ending in `.pdf`.
    fn filename(&self, info: &StatementInfo) -> String;

    /// Destination folder relative to the output root.
    fn subfolder(&self, info: &StatementInfo) -> PathBuf;
}

static PNC: PncStrategy = PncStrategy;
static BERKSHIRE: BerkshireStrategy = BerkshireStrategy;
static BANK_UNITED: BankUnitedStrategy = BankUnitedStrategy;
static CAMBRIDGE: CambridgeStrategy = CambridgeStrategy;
static UNLABELED: UnlabeledStrategy = UnlabeledStrategy;

pub fn strategy_for(bank: Bank) -> &'static dyn BankStrategy {
    match bank {
        Bank::Pnc => &PNC,
        Bank::Berkshire => &BERKSHIRE,
        Bank::BankUnited => &BANK_UNITED,
        Bank::Cambridge => &CAMBRIDGE,
        Bank::Unlabeled => &UNLABELED,
    }
}

/// Collapse whitespace and uppercase a candidate account name.
pub(crate) fn clean_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}
