use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use stmtfile_core::{Bank, MatchStatus, StatementInfo};

use super::cambridge::landmark_date;
use super::naming::{
    basename, month_name, sanitize_filename, truncate_filename, year_month_folder, LONG_FORMATS,
    MAX_FILENAME_LEN,
};
use super::{clean_name, BankStrategy, StrategyContext};
use crate::re;
use crate::sensitive::{SensitiveMatcher, BANKUNITED_NAME_THRESHOLD};
use crate::util::{digits, last4};

re!(re_masked_account, r"(?i)(?:Account[ \t]+Number|Account[ \t]*#).*?\*+(\d{4})\b");
re!(re_plain_account, r"(?i)Account(?:[ \t]+Number)?:?[ \t]*(\d+)\b");

re!(re_sub_cde_line, r"(?im)^(SUB[- ]?CDE[ \t]+\d+[ \t]+LLC)[ \t]*$");
re!(re_upper_entity_line, r"(?m)^([A-Z][A-Z &\d,.'-]*[ ,](?:LLC|LP|INC))[ \t]*$");
re!(re_any_entity_line, r"(?im)^([A-Z0-9][A-Z0-9 ,.-]*[ ,](?:LLC|LP|INC))[ \t]*$");

re!(re_long_date, r"(\w+\s+\d{1,2},\s+\d{4})");
re!(re_dxweb_download, r"(?i)dxweb\s*\((\d+)\)");

/// Account number as printed: `xxxx1234` for masked numbers.
fn find_account(lines: &[String]) -> Option<(String, bool)> {
    lines.iter().find_map(|line| {
        if let Some(c) = re_masked_account().captures(line) {
            return Some((c[1].to_string(), true));
        }
        re_plain_account().captures(line).map(|c| (c[1].to_string(), false))
    })
}

fn find_name(text: &str) -> Option<String> {
    [re_sub_cde_line(), re_upper_entity_line(), re_any_entity_line()]
        .into_iter()
        .find_map(|re| {
            re.captures_iter(text).find_map(|c| {
                let name = clean_name(&c[1]);
                (name.len() > 5 && !name.contains("BANKUNITED") && !name.contains("PAGE"))
                    .then_some(name)
            })
        })
}

fn dxweb_index(filename: &str) -> Option<String> {
    let c = re_dxweb_download().captures(filename)?;
    c[1].parse::<u32>().ok().map(|n| n.to_string())
}

/// BankUnited: masked account numbers, an entity-name line, and a
/// `Month D, YYYY` statement period.
pub struct BankUnitedStrategy;

impl BankStrategy for BankUnitedStrategy {
    fn bank(&self) -> Bank {
        Bank::BankUnited
    }

    fn extract(&self, lines: &[String], info: &mut StatementInfo, ctx: &StrategyContext<'_>) {
        let matcher = SensitiveMatcher::new(ctx.sensitive);
        let mut definitive = false;

        if let Some((found, masked)) = find_account(lines) {
            match matcher.by_number(&found) {
                Some(m) => {
                    info.account_name = Some(m.account.name.clone());
                    info.account_number = Some(m.account.number.clone());
                    info.match_status = MatchStatus::SensitiveNumber;
                    definitive = true;
                }
                None => {
                    info.account_number = Some(if masked { format!("xxxx{found}") } else { found });
                    info.match_status = MatchStatus::RegexReview;
                }
            }
        }

        if !definitive {
            let full_text = lines.join("\n");
            if let Some(name) = find_name(&full_text) {
                match matcher.by_name(&name, BANKUNITED_NAME_THRESHOLD) {
                    Some(m) => {
                        info.account_name = Some(m.account.name.clone());
                        let sensitive_digits = digits(&m.account.number);
                        match info.last4() {
                            Some(l4) if last4(&sensitive_digits) == Some(l4.as_str()) => {
                                info.match_status = MatchStatus::NameAndNumberVerified;
                            }
                            Some(l4) => {
                                tracing::warn!(
                                    name = %m.account.name,
                                    pdf_last4 = %l4,
                                    "sensitive name matched but last 4 differs"
                                );
                                info.match_status = MatchStatus::NameNumberMismatch;
                            }
                            None => {
                                info.account_number = Some(m.account.number.clone());
                                info.match_status = MatchStatus::SensitiveNameUnverified;
                            }
                        }
                    }
                    None => {
                        tracing::debug!(name = %name, "BankUnited name not in sensitive list");
                        info.account_name = Some(name);
                        info.match_status = MatchStatus::RegexReview;
                    }
                }
            }
        }

        info.date = landmark_date(lines, re_long_date(), LONG_FORMATS);

        if info.account_name.is_none() {
            let mapped = info
                .last4()
                .and_then(|l4| ctx.mappings.bankunited_last4.get(&l4));
            if let Some(name) = mapped {
                info.account_name = Some(name.clone());
                info.match_status = MatchStatus::Mapping;
            }
        }

        if info.account_name.is_none() {
            let mapped = dxweb_index(basename(&info.original_filename))
                .and_then(|n| ctx.mappings.bankunited_dxweb.get(&n));
            if let Some(name) = mapped {
                info.account_name = Some(name.clone());
                info.match_status = MatchStatus::Mapping;
            }
        }

        if info.account_name.is_none() {
            let l4 = info.last4().unwrap_or_else(|| "XXXX".to_string());
            tracing::warn!(file = %info.original_filename, "using default BankUnited name");
            info.account_name = Some(format!("BANKUNITED ACCOUNT {l4}"));
            info.match_status = MatchStatus::Default;
        }
        if info.date.is_none() {
            tracing::warn!(file = %info.original_filename, "no BankUnited statement date found");
        }
    }

    /// `<Name> <number> BankUnited <Month> <YYYY>.pdf`, spaces kept.
    fn filename(&self, info: &StatementInfo) -> String {
        let name = sanitize_filename(
            info.account_name.as_deref().unwrap_or("Unknown BankUnited Account"),
            true,
        );
        let number = sanitize_filename(
            info.account_number.as_deref().unwrap_or("UNKNOWN_ACCOUNT_NUM"),
            false,
        );
        let (month, year) = match info.date {
            Some(d) => (month_name(d), d.format("%Y").to_string()),
            None => ("NoMonth".to_string(), "NoYear".to_string()),
        };
        truncate_filename(&format!("{name} {number} BankUnited {month} {year}.pdf"), MAX_FILENAME_LEN)
    }

    fn subfolder(&self, info: &StatementInfo) -> PathBuf {
        year_month_folder(Bank::BankUnited, info.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::fixtures::{date, Fixture};

    const STATEMENT: &str = "\
BankUnited
HARBOR FUND LLC
Account Number ******4455
Statement Period
January 1, 2024 through January 31, 2024
Page 1 of 2";

    #[test]
    fn masked_number_matches_sensitive_last4() {
        let fx = Fixture::new(&[("HARBOR FUND LLC", "9900114455")]);
        let info = fx.run(Bank::BankUnited, "bu.pdf", STATEMENT);
        assert_eq!(info.account_name.as_deref(), Some("HARBOR FUND LLC"));
        assert_eq!(info.account_number.as_deref(), Some("9900114455"));
        assert_eq!(info.match_status, MatchStatus::SensitiveNumber);
        assert_eq!(info.date, Some(date(2024, 1, 31)));
    }

    #[test]
    fn regex_only_keeps_masked_number() {
        let fx = Fixture::new(&[]);
        let info = fx.run(Bank::BankUnited, "bu.pdf", STATEMENT);
        assert_eq!(info.account_name.as_deref(), Some("HARBOR FUND LLC"));
        assert_eq!(info.account_number.as_deref(), Some("xxxx4455"));
        assert_eq!(info.match_status, MatchStatus::RegexReview);
    }

    #[test]
    fn sensitive_name_checked_against_last4() {
        let text = "HARBOR FUND LLC\nAccount Number: 12";
        let fx = Fixture::new(&[("HARBOR FUND LLC", "9900114455")]);
        let info = fx.run(Bank::BankUnited, "bu.pdf", text);
        // Too short to compare.
        assert_eq!(info.account_number.as_deref(), Some("9900114455"));
        assert_eq!(info.match_status, MatchStatus::SensitiveNameUnverified);

        let info = fx.run(Bank::BankUnited, "bu.pdf", "HARBOR FUND LLC\nAccount Number: 77778888");
        assert_eq!(info.account_name.as_deref(), Some("HARBOR FUND LLC"));
        assert_eq!(info.account_number.as_deref(), Some("77778888"));
        assert_eq!(info.match_status, MatchStatus::NameNumberMismatch);
    }

    #[test]
    fn name_without_number_is_unverified() {
        let fx = Fixture::new(&[("HARBOR FUND LLC", "9900114455")]);
        let info = fx.run(Bank::BankUnited, "bu.pdf", "HARBOR FUND LLC\nStatement Date\nMarch 31, 2024");
        assert_eq!(info.account_number.as_deref(), Some("9900114455"));
        assert_eq!(info.match_status, MatchStatus::SensitiveNameUnverified);
        assert_eq!(info.date, Some(date(2024, 3, 31)));
    }

    #[test]
    fn bank_header_is_not_a_name() {
        assert_eq!(find_name("BANKUNITED N.A. INC\nPAGE 2 LLC"), None);
        assert_eq!(find_name("SUB-CDE 4 LLC").as_deref(), Some("SUB-CDE 4 LLC"));
    }

    #[test]
    fn last4_mapping_names_an_unnamed_account() {
        let mut fx = Fixture::new(&[]);
        fx.mappings.bankunited_last4.insert("4455".into(), "MAPPED FUND LP".into());
        let info = fx.run(Bank::BankUnited, "bu.pdf", "Account # ****4455");
        assert_eq!(info.account_name.as_deref(), Some("MAPPED FUND LP"));
        assert_eq!(info.account_number.as_deref(), Some("xxxx4455"));
        assert_eq!(info.match_status, MatchStatus::Mapping);
    }

    #[test]
    fn dxweb_index_mapping() {
        let mut fx = Fixture::new(&[]);
        fx.mappings.bankunited_dxweb.insert("3".into(), "DXWEB FUND LLC".into());
        let info = fx.run(Bank::BankUnited, "dxweb (3).pdf", "");
        assert_eq!(info.account_name.as_deref(), Some("DXWEB FUND LLC"));
        assert_eq!(info.match_status, MatchStatus::Mapping);
        assert_eq!(dxweb_index("DXWEB(012).pdf").as_deref(), Some("12"));
    }

    #[test]
    fn default_name() {
        let fx = Fixture::new(&[]);
        let info = fx.run(Bank::BankUnited, "bu.pdf", "nothing here");
        assert_eq!(info.account_name.as_deref(), Some("BANKUNITED ACCOUNT XXXX"));
        assert_eq!(info.match_status, MatchStatus::Default);

        let info = fx.run(Bank::BankUnited, "bu.pdf", "Account Number ****9876");
        assert_eq!(info.account_name.as_deref(), Some("BANKUNITED ACCOUNT 9876"));
        assert_eq!(info.account_number.as_deref(), Some("xxxx9876"));
        assert_eq!(info.match_status, MatchStatus::Default);
    }

    #[test]
    fn output_name_and_folder() {
        let mut info = StatementInfo::new("bu.pdf", Bank::BankUnited);
        info.account_name = Some("Harbor Fund LLC".into());
        info.account_number = Some("xxxx4455".into());
        info.date = Some(date(2024, 1, 31));
        assert_eq!(
            BankUnitedStrategy.filename(&info),
            "Harbor Fund LLC xxxx4455 BankUnited January 2024.pdf"
        );
        assert_eq!(BankUnitedStrategy.subfolder(&info), PathBuf::from("BankUnited/2024-01"));

        let bare = StatementInfo::new("bu.pdf", Bank::BankUnited);
        assert_eq!(
            BankUnitedStrategy.filename(&bare),
            "Unknown BankUnited Account UNKNOWN_ACCOUNT_NUM BankUnited NoMonth NoYear.pdf"
        );
    }
}
