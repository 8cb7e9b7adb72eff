use chrono::Datelike;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

use stmtfile_core::{Bank, MatchStatus, StatementInfo};

use super::naming::{basename, parse_date, year_month_folder};
use super::{BankStrategy, StrategyContext};
use crate::re;

re!(re_full_account, r"(?i)(?:Account|Acct)[^0-9]*(\d{6,})\b");
re!(re_account_last4, r"(?i)(?:Account|Acct)[^0-9]*(?:[\dX]+-){0,2}(\d{4})\b");

re!(re_statement_date_numeric, r"(?i)Statement Date[:\s]*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})");
re!(re_statement_date_long, r"(?i)Statement Date[:\s]*(\w+\s+\d{1,2},\s+\d{4})");
re!(re_period_end_numeric, r"(?i)Statement Period.*?to\s+(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})");
re!(re_period_end_long, r"(?i)Statement Period.*?-\s+(\w+\s+\d{1,2},\s+\d{4})");
re!(re_ending, r"(?i)Ending\s+(\d{1,2}/\d{1,2}/\d{2,4})");
re!(re_as_of, r"(?i)As of\s+(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})");
re!(re_labeled_date, r"(?i)Date\s+(\d{1,2}/\d{1,2}/\d{4})\b");
re!(re_any_date, r"\b(\d{1,2}/\d{1,2}/\d{4})\b");

const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y", "%m/%d/%y", "%m-%d-%Y", "%m-%d-%y", "%B %d, %Y", "%b %d, %Y", "%Y-%m-%d",
];

fn date_patterns() -> [&'static Regex; 8] {
    [
        re_statement_date_numeric(),
        re_statement_date_long(),
        re_period_end_numeric(),
        re_period_end_long(),
        re_ending(),
        re_as_of(),
        re_labeled_date(),
        re_any_date(),
    ]
}

/// Catch-all for statements no bank claimed: a generic account number and
/// date, filed under the original name.
pub struct UnlabeledStrategy;

impl BankStrategy for UnlabeledStrategy {
    fn bank(&self) -> Bank {
        Bank::Unlabeled
    }

    fn extract(&self, lines: &[String], info: &mut StatementInfo, ctx: &StrategyContext<'_>) {
        info.match_status = MatchStatus::UnlabeledGeneric;

        info.account_number = lines.iter().find_map(|line| {
            if let Some(c) = re_full_account().captures(line) {
                return Some(c[1].to_string());
            }
            re_account_last4().captures(line).map(|c| format!("xxxx{}", &c[1]))
        });

        let max_year = ctx.today.year() + 1;
        let found_date = lines.iter().find_map(|line| {
            date_patterns().into_iter().find_map(|re| {
                let c = re.captures(line)?;
                parse_date(&c[1], DATE_FORMATS).filter(|d| (2000..=max_year).contains(&d.year()))
            })
        });

        match found_date {
            Some(d) => info.date = Some(d),
            None => {
                tracing::warn!(file = %info.original_filename, "no date in unlabeled statement, using today");
                info.date = Some(ctx.today);
                info.match_status = MatchStatus::UnlabeledNoDate;
            }
        }

        if info.account_name.is_none() {
            match info.last4() {
                Some(l4) => info.account_name = Some(format!("UNLABELED ACCOUNT {l4}")),
                None => {
                    info.account_name = Some("UNKNOWN UNLABELED ACCOUNT".to_string());
                    info.match_status = if found_date.is_some() {
                        MatchStatus::UnlabeledNoAccount
                    } else {
                        MatchStatus::UnlabeledNoInfo
                    };
                }
            }
        }
        tracing::info!(
            file = %info.original_filename,
            status = %info.match_status,
            "unlabeled extraction finished"
        );
    }

    /// The original base name, unchanged.
    fn filename(&self, info: &StatementInfo) -> String {
        let name = basename(&info.original_filename);
        if name.is_empty() {
            tracing::warn!("unlabeled statement has no original filename");
            "UNLABELED_FILE_ERROR.pdf".to_string()
        } else {
            name.to_string()
        }
    }

    fn subfolder(&self, info: &StatementInfo) -> PathBuf {
        year_month_folder(Bank::Unlabeled, info.date)
    }
}
