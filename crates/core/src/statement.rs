use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bank::{Bank, MatchStatus};

/// Everything learned about a single statement PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementInfo {
    /// Base name of the source file, e.g. `Statement_Jan_2024.pdf`.
    pub original_filename: String,
    pub bank: Bank,
    pub account_name: Option<String>,
    /// Full number when known, otherwise masked as `xxxx1234`.
    pub account_number: Option<String>,
    /// Statement end date.
    pub date: Option<NaiveDate>,
    pub match_status: MatchStatus,
}

impl StatementInfo {
    pub fn new(original_filename: impl Into<String>, bank: Bank) -> Self {
        Self {
            original_filename: original_filename.into(),
            bank,
            account_name: None,
            account_number: None,
            date: None,
            match_status: MatchStatus::Default,
        }
    }

    /// Bank, name and date are all known.
    pub fn is_complete(&self) -> bool {
        self.bank != Bank::Unlabeled && self.account_name.is_some() && self.date.is_some()
    }

    /// Enough to build a destination: a real bank, a name or number, and a date.
    pub fn is_sufficient(&self) -> bool {
        self.bank != Bank::Unlabeled
            && (self.account_name.is_some() || self.account_number.is_some())
            && self.date.is_some()
    }

    /// Last four digits of the account number, ignoring masks and separators.
    pub fn last4(&self) -> Option<String> {
        let digits: String = self
            .account_number
            .as_deref()?
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        (digits.len() >= 4).then(|| digits[digits.len() - 4..].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn new_statement_is_empty() {
        let info = StatementInfo::new("a.pdf", Bank::Pnc);
        assert!(!info.is_complete());
        assert!(!info.is_sufficient());
        assert_eq!(info.match_status, MatchStatus::Default);
    }

    #[test]
    fn sufficient_needs_identity_and_date() {
        let mut info = StatementInfo::new("a.pdf", Bank::Cambridge);
        info.account_number = Some("1234567".into());
        assert!(!info.is_sufficient());
        info.date = Some(d(2024, 1, 31));
        assert!(info.is_sufficient());
        assert!(!info.is_complete());
        info.account_name = Some("ACME LLC".into());
        assert!(info.is_complete());
    }

    #[test]
    fn unlabeled_is_never_sufficient() {
        let mut info = StatementInfo::new("a.pdf", Bank::Unlabeled);
        info.account_name = Some("X".into());
        info.date = Some(d(2024, 1, 31));
        assert!(!info.is_sufficient());
        assert!(!info.is_complete());
    }

    #[test]
    fn last4_strips_masks_and_dashes() {
        let mut info = StatementInfo::new("a.pdf", Bank::Pnc);
        info.account_number = Some("xxxx1234".into());
        assert_eq!(info.last4().as_deref(), Some("1234"));
        info.account_number = Some("12-3456-7890".into());
        assert_eq!(info.last4().as_deref(), Some("7890"));
        info.account_number = Some("12".into());
        assert_eq!(info.last4(), None);
        info.account_number = None;
        assert_eq!(info.last4(), None);
    }
}
