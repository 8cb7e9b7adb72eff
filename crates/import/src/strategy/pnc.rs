use chrono::NaiveDate;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

use stmtfile_core::{AccountMappings, Bank, MatchStatus, StatementInfo};

use super::naming::{
    basename, ensure_pdf_extension, month_name, parse_date, sanitize_filename, truncate_filename,
    MAX_FILENAME_LEN, SLASH_FORMATS,
};
use super::{BankStrategy, StrategyContext};
use crate::re;
use crate::sensitive::{SensitiveMatcher, PNC_NAME_THRESHOLD};
use crate::util::digits;

// ── Compiled regex cache ─────────────────────────────────────────────────────

re!(re_full_account,
    r"(?i)\bAccount\s*(?:Number|No\.?|#)?\s*:?\s*(\d{2}-?\d{4}-?\d{4})\b");
re!(re_masked_account,
    r"(?i)(?:XX|\*\*)-?(?:XXXX|\*\*\*\*)-?(\d{4})\b");

re!(re_impact_program,
    r"(?i)([A-Z][A-Z\s-]*?\bIMPACT\s+PROGRAM(?:\s+[A-Z-]+)*)");
re!(re_product_dev,
    r"(?i)([A-Z][A-Z\s]*?\bPRODUCT\s+DEV(?:ELOPMENT)?\s+(?:[IVX]+|\d+))\b");
re!(re_cde_llc,
    r"(?i)([A-Z][A-Z\s-]*?CDE[^A-Z0-9]*\d+[^A-Z0-9]*LLC)\b");
re!(re_opportunity_zone,
    r"(?i)([A-Z]+\s+OPPORTUNITY\s+ZONE(?:\s+[A-Z]+)*)");
re!(re_entity,
    r"^([A-Z][A-Z0-9&,.'\s-]*?\b(?:LLC|LP|INC)\b\.?)");
re!(re_tax_id_tail,
    r"(?i)\s+Tax\s+ID.*$");

re!(re_date_range,
    r"(?i)(\d{1,2}/\d{1,2}/\d{2,4})\s*(?:to|through|thru|-)\s*(\d{1,2}/\d{1,2}/\d{2,4})");

fn name_patterns() -> [&'static Regex; 5] {
    [re_impact_program(), re_product_dev(), re_cde_llc(), re_opportunity_zone(), re_entity()]
}

/// `<marker> 01/01/2024 to 01/31/2024`, with the marker taken from config.
fn period_regex(marker: &str) -> Option<Regex> {
    if marker.trim().is_empty() {
        return None;
    }
    Regex::new(&format!(
        r"(?i){}\s*:?\s*(\d{{1,2}}/\d{{1,2}}/\d{{2,4}})\s*(?:to|through|thru|-)\s*(\d{{1,2}}/\d{{1,2}}/\d{{2,4}})",
        regex::escape(marker.trim())
    ))
    .ok()
}

// ── Line scanner ──────────────────────────────────────────────────────────────

enum AccountHit {
    Full(String),
    Masked(String),
}

impl AccountHit {
    fn display(&self) -> String {
        match self {
            AccountHit::Full(n) => n.clone(),
            AccountHit::Masked(l4) => format!("xxxx{l4}"),
        }
    }
}

fn find_account(line: &str) -> Option<AccountHit> {
    if let Some(c) = re_full_account().captures(line) {
        return Some(AccountHit::Full(digits(&c[1])));
    }
    re_masked_account()
        .captures(line)
        .map(|c| AccountHit::Masked(c[1].to_string()))
}

fn clean_candidate(raw: &str, stop_markers: &[String]) -> Option<String> {
    let no_punct: String = raw.chars().filter(|c| *c != ',' && *c != '.').collect();
    let no_tax = re_tax_id_tail().replace(&no_punct, "");
    let cleaned = no_tax
        .split_whitespace()
        .take_while(|w| !stop_markers.iter().any(|m| m.eq_ignore_ascii_case(w)))
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    (cleaned.len() > 3 && !cleaned.contains("SUMMARY") && !cleaned.contains("PNC BANK"))
        .then_some(cleaned)
}

fn name_candidates(line: &str, stop_markers: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for re in name_patterns() {
        if let Some(c) = re.captures(line) {
            if let Some(name) = clean_candidate(&c[1], stop_markers) {
                if !out.contains(&name) {
                    out.push(name);
                }
            }
        }
    }
    out
}

fn period_end(line: &str, period: Option<&Regex>) -> Option<NaiveDate> {
    let caps = period
        .and_then(|re| re.captures(line))
        .or_else(|| re_date_range().captures(line))?;
    parse_date(&caps[2], SLASH_FORMATS)
}

fn is_skipped(line: &str, skip_starters: &[String]) -> bool {
    skip_starters.iter().any(|s| !s.is_empty() && line.starts_with(s.as_str()))
}

#[derive(Default)]
struct Scan {
    account_found: bool,
    /// Confirmed against the sensitive list; stop looking for names.
    definitive: bool,
    tentative_name: Option<String>,
}

// ── Strategy ──────────────────────────────────────────────────────────────────

/// PNC statements carry a full or masked account number, the entity name on
/// its own line, and a `FOR THE PERIOD a to b` range. One pass over the lines.
pub struct PncStrategy;

impl PncStrategy {
    fn mapped_name<'m>(info: &StatementInfo, mappings: &'m AccountMappings) -> Option<&'m String> {
        let number = info.account_number.as_deref()?;
        if !number.starts_with("xxxx") {
            let full = digits(number);
            let hit = mappings.pnc.iter().find(|(k, _)| digits(k) == full).map(|(_, v)| v);
            if hit.is_some() {
                return hit;
            }
        }
        mappings.pnc_last4.get(&info.last4()?)
    }
}

impl BankStrategy for PncStrategy {
    fn bank(&self) -> Bank {
        Bank::Pnc
    }

    fn extract(&self, lines: &[String], info: &mut StatementInfo, ctx: &StrategyContext<'_>) {
        let matcher = SensitiveMatcher::new(ctx.sensitive);
        let period = period_regex(&ctx.patterns.period_marker);
        let mut scan = Scan::default();

        for line in lines {
            if scan.definitive && info.date.is_some() {
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if !scan.account_found {
                if let Some(hit) = find_account(line) {
                    scan.account_found = true;
                    match matcher.by_number(&hit.display()) {
                        Some(m) => {
                            info.account_name = Some(m.account.name.clone());
                            info.account_number = Some(m.account.number.clone());
                            info.match_status = MatchStatus::SensitiveNumber;
                            scan.definitive = true;
                        }
                        None => info.account_number = Some(hit.display()),
                    }
                }
            }

            if !scan.definitive && !is_skipped(line, &ctx.patterns.skip_starters) {
                for candidate in name_candidates(line, &ctx.patterns.stop_markers) {
                    if let Some(m) = matcher.by_name(&candidate, PNC_NAME_THRESHOLD) {
                        if let Some(existing) = info.account_number.as_deref() {
                            if !digits(&m.account.number).ends_with(&digits(existing)) {
                                tracing::warn!(
                                    extracted = existing,
                                    sensitive = %m.account.number,
                                    "name matched a sensitive account with a different number, using sensitive number"
                                );
                            }
                        }
                        info.account_name = Some(m.account.name.clone());
                        info.account_number = Some(m.account.number.clone());
                        info.match_status = MatchStatus::SensitiveName;
                        scan.account_found = true;
                        scan.definitive = true;
                        break;
                    }
                    scan.tentative_name.get_or_insert(candidate);
                }
            }

            if info.date.is_none() {
                info.date = period_end(line, period.as_ref());
            }
        }

        if scan.definitive {
            return;
        }
        // A mapped number outranks a name the regexes guessed.
        if let Some(name) = Self::mapped_name(info, ctx.mappings) {
            info.account_name = Some(name.clone());
            info.match_status = MatchStatus::Mapping;
        } else if let Some(name) = scan.tentative_name {
            info.account_name = Some(name);
            info.match_status = MatchStatus::RegexReview;
        } else {
            info.account_name = Some(match info.last4() {
                Some(l4) => format!("PNC Account {l4}"),
                None => "UNKNOWN PNC ACCOUNT".to_string(),
            });
            info.match_status = MatchStatus::Default;
        }
        tracing::info!(
            file = %info.original_filename,
            status = %info.match_status,
            "PNC extraction finished without a sensitive match"
        );
    }

    /// The account name prefixed to the original file name.
    fn filename(&self, info: &StatementInfo) -> String {
        let name = sanitize_filename(info.account_name.as_deref().unwrap_or("UNKNOWN PNC ACCOUNT"), true);
        let original = basename(&info.original_filename);
        if original.is_empty() {
            let number = sanitize_filename(
                info.account_number.as_deref().unwrap_or("UNKNOWN_ACCOUNT_NUM"),
                false,
            );
            return format!("{name} statement_{number}_NODATE.pdf");
        }
        ensure_pdf_extension(&truncate_filename(&format!("{name} {original}"), MAX_FILENAME_LEN))
    }

    /// `PNC/<YYYY>/<Month>`.
    fn subfolder(&self, info: &StatementInfo) -> PathBuf {
        let mut path = PathBuf::from(Bank::Pnc.name());
        match info.date {
            Some(d) => {
                path.push(d.format("%Y").to_string());
                path.push(month_name(d));
            }
            None => path.push("UnknownDate"),
        }
        path
    }
}
