use serde::{Deserialize, Serialize};
use std::fmt;

/// Institutions with a dedicated extraction strategy, plus the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bank {
    Pnc,
    Berkshire,
    BankUnited,
    Cambridge,
    Unlabeled,
}

impl Bank {
    /// Real banks in identification tie-break order.
    pub const LABELED: [Bank; 4] = [Bank::Pnc, Bank::Berkshire, Bank::BankUnited, Bank::Cambridge];

    /// Display name, also the top-level destination folder.
    pub fn name(self) -> &'static str {
        match self {
            Bank::Pnc => "PNC",
            Bank::Berkshire => "Berkshire",
            Bank::BankUnited => "BankUnited",
            Bank::Cambridge => "Cambridge",
            Bank::Unlabeled => "Unlabeled",
        }
    }

    /// Lowercase key used in config tables and filename matching.
    pub fn key(self) -> &'static str {
        match self {
            Bank::Pnc => "pnc",
            Bank::Berkshire => "berkshire",
            Bank::BankUnited => "bankunited",
            Bank::Cambridge => "cambridge",
            Bank::Unlabeled => "unlabeled",
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Bank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pnc" => Ok(Bank::Pnc),
            "berkshire" => Ok(Bank::Berkshire),
            "bankunited" | "bank_united" => Ok(Bank::BankUnited),
            "cambridge" => Ok(Bank::Cambridge),
            "unlabeled" => Ok(Bank::Unlabeled),
            other => Err(format!("Unknown bank: '{other}'")),
        }
    }
}

/// How an account identity was established for a statement.
///
/// The `Display` form is what lands in the checklist, so the strings are
/// stable and meant for humans reviewing the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    SensitiveNumber,
    SensitiveName,
    NameAndNumberVerified,
    SensitiveNameUnverified,
    FilenameHeuristic,
    NameNumberMismatch,
    Mapping,
    FilenameFallback,
    RegexReview,
    Default,
    DefaultImagePdf,
    ManualReviewImagePdf,
    UnlabeledGeneric,
    UnlabeledNoDate,
    UnlabeledNoAccount,
    UnlabeledNoInfo,
}

impl MatchStatus {
    /// True when the identity was confirmed against the sensitive-account list.
    pub fn is_confirmed(self) -> bool {
        matches!(
            self,
            MatchStatus::SensitiveNumber
                | MatchStatus::SensitiveName
                | MatchStatus::NameAndNumberVerified
                | MatchStatus::SensitiveNameUnverified
                | MatchStatus::FilenameHeuristic
        )
    }

    pub fn needs_review(self) -> bool {
        !self.is_confirmed()
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::SensitiveNumber => "Success! (Sensitive Number)",
            MatchStatus::SensitiveName => "Success! (Sensitive Name)",
            MatchStatus::NameAndNumberVerified => "Success! (Name & Num Verified)",
            MatchStatus::SensitiveNameUnverified => "Success! (Sensitive Name, Num Unverified)",
            MatchStatus::FilenameHeuristic => "Success! (Filename Heuristic)",
            MatchStatus::NameNumberMismatch => "Warning (Sensitive Name Match, Num Mismatch)",
            MatchStatus::Mapping => "Fallback (Mapping)",
            MatchStatus::FilenameFallback => "Fallback (Filename Heuristic)",
            MatchStatus::RegexReview => "Regex Match (Review)",
            MatchStatus::Default => "Fallback (Default)",
            MatchStatus::DefaultImagePdf => "Fallback (Default - Image PDF)",
            MatchStatus::ManualReviewImagePdf => "Manual Review (Image PDF)",
            MatchStatus::UnlabeledGeneric => "Unlabeled (Generic Extraction)",
            MatchStatus::UnlabeledNoDate => "Unlabeled (Generic - No Date)",
            MatchStatus::UnlabeledNoAccount => "Unlabeled (Needs Review - No Account)",
            MatchStatus::UnlabeledNoInfo => "Unlabeled (Needs Review - No Info)",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn bank_key_roundtrip() {
        for bank in Bank::LABELED.into_iter().chain([Bank::Unlabeled]) {
            assert_eq!(Bank::from_str(bank.key()).unwrap(), bank);
        }
    }

    #[test]
    fn bank_from_str_accepts_aliases() {
        assert_eq!(Bank::from_str("Bank_United").unwrap(), Bank::BankUnited);
        assert_eq!(Bank::from_str(" PNC ").unwrap(), Bank::Pnc);
        assert!(Bank::from_str("chase").is_err());
    }

    #[test]
    fn bank_display_is_folder_name() {
        assert_eq!(Bank::BankUnited.to_string(), "BankUnited");
        assert_eq!(Bank::Pnc.to_string(), "PNC");
    }

    #[test]
    fn status_strings_match_checklist_vocabulary() {
        assert_eq!(MatchStatus::SensitiveNumber.to_string(), "Success! (Sensitive Number)");
        assert_eq!(
            MatchStatus::NameNumberMismatch.to_string(),
            "Warning (Sensitive Name Match, Num Mismatch)"
        );
        assert_eq!(MatchStatus::UnlabeledNoInfo.to_string(), "Unlabeled (Needs Review - No Info)");
    }

    #[test]
    fn confirmed_statuses() {
        assert!(MatchStatus::NameAndNumberVerified.is_confirmed());
        assert!(MatchStatus::FilenameHeuristic.is_confirmed());
        assert!(MatchStatus::RegexReview.needs_review());
        assert!(MatchStatus::NameNumberMismatch.needs_review());
    }
}
