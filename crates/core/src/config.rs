use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level settings file.
///
/// Every field carries a serde default, so a file only needs the keys it
/// wants to change; everything else falls back to [`Config::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
    pub account_mappings: AccountMappings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input_folder: PathBuf,
    pub processed_folder: PathBuf,
    pub checklist_dir: PathBuf,
    /// Unset leaves the level to `RUST_LOG`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    pub batch_size: usize,
    pub max_workers: usize,
    pub check_duplicates: bool,
    pub file_verification: bool,
    pub auto_recovery: bool,
    pub delete_originals: bool,
    /// File statements no bank claimed under `Unlabeled/` instead of skipping them.
    pub route_unlabeled: bool,
    pub pdf_scan_max_pages: usize,
    pub bank_id_min_score: usize,
    /// Relative paths resolve against the settings file's directory.
    pub sensitive_accounts_file: PathBuf,
    pub patterns: PatternSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_folder: PathBuf::from("input_statements"),
            processed_folder: PathBuf::from("processed_statements"),
            checklist_dir: PathBuf::from("checklists"),
            log_level: None,
            batch_size: 50,
            max_workers: 4,
            check_duplicates: true,
            file_verification: true,
            auto_recovery: true,
            delete_originals: false,
            route_unlabeled: false,
            pdf_scan_max_pages: 10,
            bank_id_min_score: 2,
            sensitive_accounts_file: PathBuf::from("sensitive_accounts.toml"),
            patterns: PatternSettings::default(),
        }
    }
}

/// Text markers used by the PNC line scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSettings {
    pub period_marker: String,
    /// A cleaned name is cut at the first of these tokens.
    pub stop_markers: Vec<String>,
    /// Lines starting with any of these never yield a name.
    pub skip_starters: Vec<String>,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            period_marker: "FOR THE PERIOD".to_string(),
            stop_markers: vec!["STE".to_string()],
            skip_starters: ["Number", "Tax ID", "For Client", "Visit", "For 24-hour", "PNC Bank"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Static lookup tables used when nothing in the statement matched the
/// sensitive-account list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountMappings {
    /// Full account number → name.
    pub pnc: BTreeMap<String, String>,
    /// Last four digits → name.
    #[serde(alias = "pnc_special_mapping_last4")]
    pub pnc_last4: BTreeMap<String, String>,
    /// Last four digits → name.
    pub bankunited_last4: BTreeMap<String, String>,
    /// Zero-padded download index of `Online Statements_... (N).pdf` → account number.
    pub cambridge_online_statements_numbered: BTreeMap<String, String>,
    /// Download index of `dxweb (N).pdf` → name.
    #[serde(alias = "bank_united_dxweb")]
    pub bankunited_dxweb: BTreeMap<String, String>,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load settings, writing a default file when none exists yet.
    pub fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config file not found, writing defaults");
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config = Self::from_toml(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_toml()?).map_err(io_err)
    }

    /// Where the sensitive-account list lives for a config loaded from `config_path`.
    pub fn sensitive_accounts_path(&self, config_path: &Path) -> PathBuf {
        let file = &self.settings.sensitive_accounts_file;
        if file.is_absolute() {
            return file.clone();
        }
        match config_path.parent() {
            Some(dir) => dir.join(file),
            None => file.clone(),
        }
    }
}
