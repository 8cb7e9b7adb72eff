use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use stmtfile_core::{AccountMappings, Bank, Config, PatternSettings, SensitiveAccounts, StatementInfo};

use crate::identify::{identify_bank, IdentifiedBy};
use crate::strategy::naming::basename;
use crate::strategy::{strategy_for, StrategyContext};

/// Outcome of running identification and a bank strategy over one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Processed {
    /// A labeled bank with enough detail to build a destination.
    Filed { info: StatementInfo, bank: Bank },
    /// No bank claimed the file. `info` is only filled in when unlabeled
    /// files are routed to their own folder.
    Unlabeled { info: Option<StatementInfo> },
    /// A bank was found but the strategy came up short.
    Insufficient { info: StatementInfo },
}

impl Processed {
    pub fn info(&self) -> Option<&StatementInfo> {
        match self {
            Processed::Filed { info, .. } | Processed::Insufficient { info } => Some(info),
            Processed::Unlabeled { info } => info.as_ref(),
        }
    }
}

/// Counters reported in the run summary, keyed by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    counts: BTreeMap<&'static str, usize>,
}

impl ExtractionStats {
    pub const SUCCESS: &'static str = "success";
    pub const EXTRACTION_FAILED: &'static str = "extraction_failed";
    pub const UNLABELED_IDENTIFIED: &'static str = "unlabeled_identified";
    pub const NO_TEXT: &'static str = "no_text";
    pub const TEXT_EXTRACTION_FAILED: &'static str = "text_extraction_failed";

    pub fn increment(&mut self, key: &'static str) {
        *self.counts.entry(key).or_default() += 1;
    }

    pub fn get(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn record(&mut self, processed: &Processed) {
        match processed {
            Processed::Filed { .. } => self.increment(Self::SUCCESS),
            Processed::Unlabeled { .. } => self.increment(Self::UNLABELED_IDENTIFIED),
            Processed::Insufficient { .. } => self.increment(Self::EXTRACTION_FAILED),
        }
    }

    pub fn merge(&mut self, other: &ExtractionStats) {
        for (key, n) in &other.counts {
            *self.counts.entry(key).or_default() += n;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl fmt::Display for ExtractionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Identifies the bank behind a statement and runs its strategy. Holds only
/// read-only configuration, so one instance can be shared across workers.
#[derive(Debug, Clone)]
pub struct StatementProcessor {
    sensitive: SensitiveAccounts,
    mappings: AccountMappings,
    patterns: PatternSettings,
    bank_id_min_score: usize,
    route_unlabeled: bool,
    today: NaiveDate,
}

impl StatementProcessor {
    pub fn new(config: &Config, sensitive: SensitiveAccounts, today: NaiveDate) -> Self {
        Self {
            sensitive,
            mappings: config.account_mappings.clone(),
            patterns: config.settings.patterns.clone(),
            bank_id_min_score: config.settings.bank_id_min_score,
            route_unlabeled: config.settings.route_unlabeled,
            today,
        }
    }

    /// Process one statement from its already-extracted, trimmed text lines.
    pub fn process(&self, filename: &str, lines: &[String]) -> Processed {
        let filename = basename(filename);
        let text = lines.join("\n");
        let id = identify_bank(filename, &text, self.bank_id_min_score);
        tracing::debug!(file = filename, bank = %id.bank, by = ?id.by, "identified");

        if id.by == IdentifiedBy::Nothing && !self.route_unlabeled {
            tracing::info!(file = filename, "unlabeled, leaving in place");
            return Processed::Unlabeled { info: None };
        }

        let strategy = strategy_for(id.bank);
        let ctx = StrategyContext {
            sensitive: self.sensitive.for_bank(id.bank),
            mappings: &self.mappings,
            patterns: &self.patterns,
            today: self.today,
        };
        let mut info = StatementInfo::new(filename, id.bank);
        strategy.extract(lines, &mut info, &ctx);

        if id.bank == Bank::Unlabeled {
            return Processed::Unlabeled { info: Some(info) };
        }
        if info.is_sufficient() {
            tracing::info!(
                file = filename,
                bank = %info.bank,
                account = info.account_name.as_deref().unwrap_or(""),
                date = ?info.date,
                status = %info.match_status,
                "extracted"
            );
            Processed::Filed { bank: id.bank, info }
        } else {
            tracing::warn!(
                file = filename,
                bank = %info.bank,
                account = ?info.account_name,
                date = ?info.date,
                "insufficient information extracted"
            );
            Processed::Insufficient { info }
        }
    }

    /// Destination subfolder and file name for a processed statement.
    pub fn destination(&self, info: &StatementInfo) -> (PathBuf, String) {
        let strategy = strategy_for(info.bank);
        (strategy.subfolder(info), strategy.filename(info))
    }
}
