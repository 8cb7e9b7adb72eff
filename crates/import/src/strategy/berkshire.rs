use chrono::NaiveDate;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

use stmtfile_core::{Bank, MatchStatus, StatementInfo};

use super::naming::{
    basename, parse_date, sanitize_filename, truncate_filename, year_month_folder, MAX_FILENAME_LEN,
};
use super::{BankStrategy, StrategyContext};
use crate::re;
use crate::sensitive::SensitiveMatcher;

re!(re_trailing_last4, r"_(\d{4})(?:\.pdf)?$");
re!(re_filename_date, r"(\d{4})[-_]?(\d{2})[-_]?(\d{2})");

fn is_new_statement(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower.contains("newstatement") || lower.contains("new_statement")
}

fn date_from_filename(filename: &str) -> Option<NaiveDate> {
    re_filename_date()
        .captures_iter(filename)
        .find_map(|c| parse_date(&format!("{}{}{}", &c[1], &c[2], &c[3]), &["%Y%m%d"]))
}

/// Berkshire statements arrive as scanned images, so everything comes from
/// the download name, e.g. `NewStatement_2024-01-31_4455.pdf`.
pub struct BerkshireStrategy;

impl BankStrategy for BerkshireStrategy {
    fn bank(&self) -> Bank {
        Bank::Berkshire
    }

    fn extract(&self, lines: &[String], info: &mut StatementInfo, ctx: &StrategyContext<'_>) {
        info.match_status = MatchStatus::ManualReviewImagePdf;
        let filename = basename(&info.original_filename).to_string();
        let mut account_from_filename = false;

        if is_new_statement(&filename) {
            match re_trailing_last4().captures(&filename) {
                Some(c) => {
                    let last4 = &c[1];
                    account_from_filename = true;
                    match SensitiveMatcher::new(ctx.sensitive).by_number(last4) {
                        Some(m) => {
                            info.account_name = Some(m.account.name.clone());
                            info.account_number = Some(m.account.number.clone());
                            info.match_status = MatchStatus::FilenameHeuristic;
                        }
                        None => {
                            info.account_name = Some(format!("BERKSHIRE ACCOUNT {last4}"));
                            info.account_number = Some(format!("xxxx{last4}"));
                            info.match_status = MatchStatus::FilenameFallback;
                        }
                    }
                }
                None => tracing::debug!(file = %filename, "no trailing last 4 in NewStatement name"),
            }
        }

        info.date = date_from_filename(&filename);

        if lines.is_empty() {
            tracing::debug!(file = %filename, "no text, as expected for an image PDF");
        } else {
            tracing::warn!(file = %filename, lines = lines.len(), "Berkshire PDF has text; still filing by filename");
        }

        if info.account_name.is_none() {
            let last4 = info.last4().unwrap_or_else(|| "XXXX".to_string());
            info.account_name = Some(format!("BERKSHIRE ACCOUNT {last4}"));
            if !account_from_filename {
                info.match_status = MatchStatus::DefaultImagePdf;
            }
        }
        if info.date.is_none() {
            tracing::warn!(file = %filename, "no date in Berkshire filename");
        }
    }

    /// `<last4>-<NAME>-<YYYYMMDD>.pdf`.
    fn filename(&self, info: &StatementInfo) -> String {
        let last4 = info.last4().unwrap_or_else(|| "XXXX".to_string());
        let name = sanitize_filename(
            &info.account_name.as_deref().unwrap_or("Unknown_Account").to_uppercase(),
            false,
        );
        let date = info
            .date
            .map(|d| d.format("%Y%m%d").to_string())
            .unwrap_or_else(|| "NODATE".to_string());
        truncate_filename(&format!("{last4}-{name}-{date}.pdf"), MAX_FILENAME_LEN)
    }

    fn subfolder(&self, info: &StatementInfo) -> PathBuf {
        year_month_folder(Bank::Berkshire, info.date)
    }
}
