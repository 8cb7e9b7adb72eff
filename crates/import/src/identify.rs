use regex::Regex;
use std::sync::OnceLock;

use stmtfile_core::Bank;

use crate::re;

/// Where a bank identification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifiedBy {
    Filename,
    Content,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identification {
    pub bank: Bank,
    pub by: IdentifiedBy,
    /// Keyword score behind a content identification, 0 otherwise.
    pub score: usize,
}

// ── Filename rules ────────────────────────────────────────────────────────────

/// Literal filename markers, checked in this order. A marker ending in `_`
/// must prefix the name; anything else may appear anywhere.
const FILENAME_MARKERS: &[(Bank, &[&str])] = &[
    (Bank::Cambridge, &["online statements_", "online_statements"]),
    (Bank::BankUnited, &["dxweb"]),
    (Bank::Berkshire, &["newstatement", "new_statement"]),
    (Bank::Pnc, &["statement_"]),
];

re!(re_pnc_name, r"pnc.*statement|statement.*pnc|virtual.*wallet|pnc.*account");
re!(re_berkshire_name, r"berk.*bank|berkshire.*statement|berk.*statement|mybanknow");
re!(re_bankunited_name, r"bankunited|bank.*united|statement.*united|bu.*online");
re!(re_cambridge_name, r"cambridge.*savings|cambridge.*bank|csb.*statement|cambridge.*statement");

fn filename_regex(bank: Bank) -> Option<&'static Regex> {
    match bank {
        Bank::Pnc => Some(re_pnc_name()),
        Bank::Berkshire => Some(re_berkshire_name()),
        Bank::BankUnited => Some(re_bankunited_name()),
        Bank::Cambridge => Some(re_cambridge_name()),
        Bank::Unlabeled => None,
    }
}

/// Guess the bank from the file name alone.
pub fn bank_from_filename(filename: &str) -> Option<Bank> {
    let lower = filename.to_lowercase();

    for (bank, markers) in FILENAME_MARKERS {
        let hit = markers.iter().any(|m| {
            if m.ends_with('_') {
                lower.starts_with(m)
            } else {
                lower.contains(m)
            }
        });
        if hit {
            tracing::debug!(file = filename, bank = %bank, "bank identified by filename marker");
            return Some(*bank);
        }
    }

    for bank in Bank::LABELED {
        if filename_regex(bank).is_some_and(|re| re.is_match(&lower)) {
            tracing::debug!(file = filename, bank = %bank, "bank identified by filename pattern");
            return Some(bank);
        }
    }

    Bank::LABELED.into_iter().find(|bank| lower.contains(bank.key()))
}

// ── Content scoring ───────────────────────────────────────────────────────────

/// Strings that show up in each bank's statements. Entries overlap, so
/// `PNC BANK` scores once for itself and once for `PNC`.
const INDICATORS: &[(Bank, &[&str])] = &[
    (
        Bank::Pnc,
        &[
            "PNC BANK", "WWW.PNC.COM", "PNC.COM", "PNCBANK.COM", "PNC FINANCIAL SERVICES",
            "PNC VIRTUAL WALLET", "PNC BANK, N.A.", "PNC ONLINE BANKING", "© PNC BANK", "PNC",
        ],
    ),
    (
        Bank::Berkshire,
        &[
            "BERKSHIRE BANK", "BERKSHIREBANK.COM", "WWW.BERKSHIREBANK.COM", "BERKSHIREBANKONLINE",
            "BERKBANK", "BERK BANK", "MYBANKNOW", "MEMBER FDIC BERKSHIRE", "BERKSHIRE, N.A.",
            "BERKSHIRE",
        ],
    ),
    (
        Bank::BankUnited,
        &[
            "BANKUNITED", "BANK UNITED", "BANKUNITED.COM", "WWW.BANKUNITED.COM", "BANKUNITEDONLINE",
            "BANKUNITED, N.A.", "BKU", "BU ONLINE", "WWW.BANKUNITEDFL.COM",
        ],
    ),
    (
        Bank::Cambridge,
        &[
            "CAMBRIDGE SAVINGS", "CAMBRIDGE SAVINGS BANK", "CAMBRIDGESAVINGS.COM",
            "WWW.CAMBRIDGESAVINGS.COM", "CSB", "CAMBRIDGESAVINGSBANK", "CAMBRIDGE BANK",
            "CAMBRIDGE, MA", "CSB CUSTOMER SERVICE",
        ],
    ),
];

/// Keyword score per bank, in `Bank::LABELED` order.
pub fn content_scores(text: &str) -> Vec<(Bank, usize)> {
    let upper = text.to_uppercase();
    INDICATORS
        .iter()
        .map(|(bank, indicators)| {
            let score = indicators.iter().map(|i| upper.matches(i).count()).sum();
            (*bank, score)
        })
        .collect()
}

/// Highest-scoring bank if it reaches `min_score`. Ties go to the earlier bank.
pub fn bank_from_content(text: &str, min_score: usize) -> Option<(Bank, usize)> {
    let scores = content_scores(text);
    let mut best: Option<(Bank, usize)> = None;
    for (bank, score) in scores {
        if score > 0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((bank, score));
        }
    }
    match best {
        Some((bank, score)) if score >= min_score.max(1) => Some((bank, score)),
        Some((bank, score)) => {
            tracing::debug!(top = %bank, score, min_score, "content score below threshold");
            None
        }
        None => None,
    }
}

/// Filename first, then content; `Unlabeled` when neither is conclusive.
pub fn identify_bank(filename: &str, text: &str, min_score: usize) -> Identification {
    if let Some(bank) = bank_from_filename(filename) {
        return Identification { bank, by: IdentifiedBy::Filename, score: 0 };
    }
    if !text.trim().is_empty() {
        if let Some((bank, score)) = bank_from_content(text, min_score) {
            tracing::info!(file = filename, bank = %bank, score, "bank identified from content");
            return Identification { bank, by: IdentifiedBy::Content, score };
        }
    }
    tracing::info!(file = filename, "could not identify bank");
    Identification { bank: Bank::Unlabeled, by: IdentifiedBy::Nothing, score: 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_markers() {
        assert_eq!(bank_from_filename("Online Statements_2024-01-31 (3).pdf"), Some(Bank::Cambridge));
        assert_eq!(bank_from_filename("my_online_statements.pdf"), Some(Bank::Cambridge));
        assert_eq!(bank_from_filename("dxweb (12).pdf"), Some(Bank::BankUnited));
        assert_eq!(bank_from_filename("NewStatement_20240131_4455.pdf"), Some(Bank::Berkshire));
        assert_eq!(bank_from_filename("Statement_Jan_2024.pdf"), Some(Bank::Pnc));
    }

    #[test]
    fn prefix_markers_must_prefix() {
        // "statement_" appears but not at the start.
        assert_eq!(bank_from_filename("acme_statement_jan.pdf"), None);
    }

    #[test]
    fn filename_patterns_and_keys() {
        assert_eq!(bank_from_filename("PNC-Virtual-Wallet-Jan.pdf"), Some(Bank::Pnc));
        assert_eq!(bank_from_filename("Cambridge Savings Jan.pdf"), Some(Bank::Cambridge));
        assert_eq!(bank_from_filename("mybanknow-export.pdf"), Some(Bank::Berkshire));
        assert_eq!(bank_from_filename("berkshire.pdf"), Some(Bank::Berkshire));
        assert_eq!(bank_from_filename("scan0001.pdf"), None);
    }

    #[test]
    fn marker_order_wins_over_later_banks() {
        // Both a Cambridge marker and PNC's prefix marker; Cambridge is checked first.
        assert_eq!(bank_from_filename("statement_online_statements.pdf"), Some(Bank::Cambridge));
    }

    #[test]
    fn content_scoring_counts_occurrences() {
        let scores = content_scores("Cambridge Savings Bank\ncambridgesavings.com");
        let cambridge = scores.iter().find(|(b, _)| *b == Bank::Cambridge).unwrap().1;
        // CAMBRIDGE SAVINGS, CAMBRIDGE SAVINGS BANK, CAMBRIDGESAVINGS.COM
        assert_eq!(cambridge, 3);
    }

    #[test]
    fn content_threshold() {
        assert_eq!(bank_from_content("Member of BKU", 2), None);
        assert_eq!(bank_from_content("BankUnited N.A. statement", 1), Some((Bank::BankUnited, 1)));
        assert_eq!(bank_from_content("nothing here", 2), None);
    }

    #[test]
    fn content_ties_go_to_earlier_bank() {
        // One hit each for PNC ("PNC") and Berkshire ("BERKSHIRE").
        assert_eq!(bank_from_content("pnc berkshire", 1), Some((Bank::Pnc, 1)));
    }

    #[test]
    fn identify_prefers_filename() {
        let id = identify_bank("dxweb (1).pdf", "PNC BANK PNC BANK", 2);
        assert_eq!(id.bank, Bank::BankUnited);
        assert_eq!(id.by, IdentifiedBy::Filename);
    }

    #[test]
    fn identify_falls_back_to_content_then_unlabeled() {
        let id = identify_bank("scan.pdf", "Thank you for banking with PNC Bank", 2);
        assert_eq!(id.bank, Bank::Pnc);
        assert_eq!(id.by, IdentifiedBy::Content);
        assert!(id.score >= 2);

        let id = identify_bank("scan.pdf", "", 2);
        assert_eq!(id.bank, Bank::Unlabeled);
        assert_eq!(id.by, IdentifiedBy::Nothing);
    }
}
