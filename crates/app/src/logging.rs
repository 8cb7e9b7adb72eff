use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn default_log_path(logs_dir: &Path, now: NaiveDateTime) -> PathBuf {
    logs_dir.join(format!("stmtfile_{}.log", now.format("%Y%m%d_%H%M%S")))
}

/// `--log-level`, then the config's level, then `RUST_LOG`, then `info`.
fn filter(cli_level: Option<&str>, config_level: Option<&str>) -> EnvFilter {
    let explicit = cli_level.or(config_level).filter(|l| !l.trim().is_empty());
    match explicit {
        Some(level) => EnvFilter::try_new(level.to_lowercase()).unwrap_or_else(|_| EnvFilter::new("info")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// Console output plus a plain-text copy in `log_file`.
pub fn init(cli_level: Option<&str>, config_level: Option<&str>, log_file: &Path) -> Result<()> {
    if let Some(dir) = log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating log folder {}", dir.display()))?;
    }
    let file = File::create(log_file).with_context(|| format!("creating log file {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(filter(cli_level, config_level))
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .context("installing log subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn log_path_is_timestamped() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap().and_hms_opt(7, 8, 9).unwrap();
        assert_eq!(
            default_log_path(Path::new("logs"), now),
            PathBuf::from("logs/stmtfile_20240506_070809.log")
        );
    }

    #[test]
    fn cli_level_wins() {
        assert_eq!(filter(Some("DEBUG"), Some("warn")).to_string(), "debug");
        assert_eq!(filter(None, Some("warn")).to_string(), "warn");
    }
}
