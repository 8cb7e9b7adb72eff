use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::bank::Bank;
use crate::config::ConfigError;

/// A known-good account: the canonical name and number a statement should
/// be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitiveAccount {
    pub name: String,
    #[serde(deserialize_with = "number_or_string")]
    pub number: String,
}

impl SensitiveAccount {
    pub fn new(name: &str, number: &str) -> Self {
        Self { name: name.to_string(), number: number.to_string() }
    }
}

/// Account numbers are often written as bare integers in hand-edited files.
fn number_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }
    Ok(match Raw::deserialize(d)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

/// The sensitive-account list, kept per bank.
///
/// ```toml
/// [[pnc]]
/// name = "ACME IMPACT PROGRAM LLC"
/// number = "1234567890"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitiveAccounts {
    pub pnc: Vec<SensitiveAccount>,
    pub berkshire: Vec<SensitiveAccount>,
    #[serde(alias = "bank_united")]
    pub bankunited: Vec<SensitiveAccount>,
    pub cambridge: Vec<SensitiveAccount>,
}

impl SensitiveAccounts {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from disk. A missing file is an empty list, not an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "sensitive accounts file not found, continuing without it");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let accounts = Self::from_toml(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        tracing::info!(
            path = %path.display(),
            pnc = accounts.pnc.len(),
            berkshire = accounts.berkshire.len(),
            bankunited = accounts.bankunited.len(),
            cambridge = accounts.cambridge.len(),
            "loaded sensitive accounts"
        );
        Ok(accounts)
    }

    pub fn for_bank(&self, bank: Bank) -> &[SensitiveAccount] {
        match bank {
            Bank::Pnc => &self.pnc,
            Bank::Berkshire => &self.berkshire,
            Bank::BankUnited => &self.bankunited,
            Bank::Cambridge => &self.cambridge,
            Bank::Unlabeled => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.pnc.len() + self.berkshire.len() + self.bankunited.len() + self.cambridge.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[pnc]]
name = "ACME IMPACT PROGRAM LLC"
number = "12-3456-7890"

[[bank_united]]
name = "SUB-CDE 12 LLC"
number = 9876543210

[[cambridge]]
name = "RIVER FUND LLC"
number = "55501234"
"#;

    #[test]
    fn parses_per_bank_lists() {
        let accounts = SensitiveAccounts::from_toml(SAMPLE).unwrap();
        assert_eq!(accounts.for_bank(Bank::Pnc).len(), 1);
        assert_eq!(accounts.for_bank(Bank::Berkshire).len(), 0);
        assert_eq!(accounts.for_bank(Bank::Cambridge)[0].name, "RIVER FUND LLC");
        assert_eq!(accounts.len(), 3);
    }

    #[test]
    fn integer_numbers_become_strings() {
        let accounts = SensitiveAccounts::from_toml(SAMPLE).unwrap();
        assert_eq!(accounts.for_bank(Bank::BankUnited)[0].number, "9876543210");
    }

    #[test]
    fn unlabeled_has_no_accounts() {
        let accounts = SensitiveAccounts::from_toml(SAMPLE).unwrap();
        assert!(accounts.for_bank(Bank::Unlabeled).is_empty());
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let accounts = SensitiveAccounts::load(&dir.path().join("nope.toml")).unwrap();
        assert!(accounts.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[[pnc]]\nname = ").unwrap();
        assert!(matches!(SensitiveAccounts::load(&path), Err(ConfigError::Parse { .. })));
    }
}
