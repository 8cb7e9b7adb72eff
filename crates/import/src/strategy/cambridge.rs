use chrono::NaiveDate;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

use stmtfile_core::{Bank, MatchStatus, StatementInfo};

use super::naming::{basename, month_name, parse_date, sanitize_filename, year_month_folder, SLASH_FORMATS};
use super::{clean_name, BankStrategy, StrategyContext};
use crate::re;
use crate::sensitive::{SensitiveMatcher, CAMBRIDGE_NAME_THRESHOLD};
use crate::util::digits;

re!(re_account_landmark,
    r"(?im)^Account(?:[ \t]+Number)?[ \t#:]*(\d+-?\d+)\b");

re!(re_sub_cde_line, r"(?im)^(SUB[- ]?CDE[ \t]+\d+[ \t]+LLC)[ \t]*$");
re!(re_labeled_sub_cde, r"(?i)(?:Owner|Name)[: \t]+(SUB[- ]?CDE[ \t]+\d+[ \t]+LLC)");
re!(re_labeled_entity, r"(?i)(?:Owner|Name):[ \t]*([A-Z][A-Z0-9&,.' \t-]*?[ \t](?:LLC|LP|INC))\b");
re!(re_upper_entity_line, r"(?m)^([A-Z][A-Z0-9&,.' -]*[ ,](?:LLC|LP|INC)\.?)[ \t]*$");
re!(re_any_entity_line, r"(?im)^([A-Z0-9][A-Z0-9 ,.-]*[ ,](?:LLC|LP|INC))[ \t]*$");

re!(re_slash_date, r"(\d{1,2}/\d{1,2}/\d{2,4})");

/// `Online Statements_2024-01-31 (3).pdf`
re!(re_online_download,
    r"(?i)^online[ _]statements_(\d{4}-\d{2}-\d{2})(?:[ \t]*\((\d+)\))?");

fn name_patterns() -> [&'static Regex; 5] {
    [
        re_sub_cde_line(),
        re_labeled_sub_cde(),
        re_labeled_entity(),
        re_upper_entity_line(),
        re_any_entity_line(),
    ]
}

/// First plausible account name, trying patterns in priority order.
fn find_name(text: &str) -> Option<String> {
    name_patterns().into_iter().find_map(|re| {
        re.captures_iter(text).find_map(|c| {
            let name = clean_name(&c[1]);
            (name.len() > 5 && !name.contains("CAMBRIDGE SAVINGS BANK") && !name.contains("PAGE"))
                .then_some(name)
        })
    })
}

/// Latest date within three lines of a `statement period` / `statement date` label.
pub(crate) fn landmark_date(
    lines: &[String],
    date_re: &Regex,
    formats: &[&str],
) -> Option<NaiveDate> {
    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if !lower.contains("statement period") && !lower.contains("statement date") {
            continue;
        }
        let window = &lines[i..(i + 3).min(lines.len())];
        let latest = window
            .iter()
            .flat_map(|l| date_re.captures_iter(l))
            .filter_map(|c| parse_date(&c[1], formats))
            .max();
        if latest.is_some() {
            return latest;
        }
    }
    None
}

struct OnlineDownload {
    date: Option<NaiveDate>,
    /// Zero-padded download index, `0000` for the unnumbered file.
    index: String,
}

fn online_download(filename: &str) -> Option<OnlineDownload> {
    let c = re_online_download().captures(filename)?;
    let index = c.get(2).map_or(0, |m| m.as_str().parse::<u32>().unwrap_or(0));
    Some(OnlineDownload {
        date: NaiveDate::parse_from_str(&c[1], "%Y-%m-%d").ok(),
        index: format!("{index:04}"),
    })
}

/// Cambridge Savings: an `Account Number` landmark, the entity name on its own
/// line, and a statement-period window. Read as whole text in several passes.
pub struct CambridgeStrategy;

impl BankStrategy for CambridgeStrategy {
    fn bank(&self) -> Bank {
        Bank::Cambridge
    }

    fn extract(&self, lines: &[String], info: &mut StatementInfo, ctx: &StrategyContext<'_>) {
        let matcher = SensitiveMatcher::new(ctx.sensitive);
        let full_text = lines.join("\n");

        // Pass 1: account number.
        let extracted_number = re_account_landmark()
            .captures(&full_text)
            .map(|c| c[1].to_string());
        let number_match = extracted_number.as_deref().and_then(|n| matcher.by_number(n));

        // Pass 2: account name.
        let extracted_name = find_name(&full_text);
        let name_match = extracted_name
            .as_deref()
            .and_then(|n| matcher.by_name(n, CAMBRIDGE_NAME_THRESHOLD));

        tracing::debug!(
            number = ?extracted_number,
            name = ?extracted_name,
            number_match = number_match.is_some(),
            name_match = name_match.is_some(),
            "Cambridge candidates"
        );

        // Validation, strongest evidence first.
        if let Some(m) = number_match {
            info.account_name = Some(m.account.name.clone());
            info.account_number = Some(m.account.number.clone());
            info.match_status = MatchStatus::SensitiveNumber;
        } else if let Some(m) = name_match {
            info.account_name = Some(m.account.name.clone());
            match &extracted_number {
                Some(pdf_number) if digits(pdf_number) == digits(&m.account.number) => {
                    info.account_number = Some(pdf_number.clone());
                    info.match_status = MatchStatus::NameAndNumberVerified;
                }
                Some(pdf_number) => {
                    tracing::warn!(
                        pdf = %pdf_number,
                        sensitive = %m.account.number,
                        "sensitive name matched but account number differs"
                    );
                    info.account_number = Some(pdf_number.clone());
                    info.match_status = MatchStatus::NameNumberMismatch;
                }
                None => {
                    info.account_number = Some(m.account.number.clone());
                    info.match_status = MatchStatus::SensitiveNameUnverified;
                }
            }
        } else if let Some(number) = &extracted_number {
            info.account_name = Some(
                extracted_name
                    .clone()
                    .unwrap_or_else(|| format!("CAMBRIDGE ACCOUNT {number}")),
            );
            info.account_number = Some(number.clone());
            info.match_status = MatchStatus::RegexReview;
        } else if let Some(name) = &extracted_name {
            info.account_name = Some(name.clone());
            info.match_status = MatchStatus::RegexReview;
        }

        // Pass 3: statement date.
        info.date = landmark_date(lines, re_slash_date(), SLASH_FORMATS);

        // Downloaded file names carry a date and an index into the mapping table.
        if let Some(download) = online_download(basename(&info.original_filename)) {
            if info.date.is_none() {
                info.date = download.date;
            }
            if info.account_name.is_none() {
                if let Some(number) = ctx.mappings.cambridge_online_statements_numbered.get(&download.index) {
                    info.account_number = Some(number.clone());
                    info.account_name = Some(match matcher.by_number(number) {
                        Some(m) => m.account.name.clone(),
                        None => format!("CAMBRIDGE ACCOUNT {number}"),
                    });
                    info.match_status = MatchStatus::Mapping;
                }
            }
        }

        if info.account_name.is_none() {
            info.account_name = Some("CAMBRIDGE UNKNOWN ACCOUNT".to_string());
            info.account_number = None;
            info.match_status = MatchStatus::Default;
        }
        if info.date.is_none() {
            tracing::warn!(file = %info.original_filename, "no Cambridge statement date found");
        }
    }

    /// `<NAME> <number> Cambridge Savings <Month> <YYYY>.pdf`.
    fn filename(&self, info: &StatementInfo) -> String {
        let name = sanitize_filename(
            &info.account_name.as_deref().unwrap_or("Unknown Account").to_uppercase(),
            false,
        );
        let number = sanitize_filename(info.account_number.as_deref().unwrap_or("0000"), false);
        let (month, year) = match info.date {
            Some(d) => (month_name(d), d.format("%Y").to_string()),
            None => ("NoMonth".to_string(), "NoYear".to_string()),
        };
        format!("{name} {number} Cambridge Savings {month} {year}.pdf")
    }

    fn subfolder(&self, info: &StatementInfo) -> PathBuf {
        year_month_folder(Bank::Cambridge, info.date)
    }
}
