pub mod bank;
pub mod config;
pub mod sensitive;
pub mod statement;

pub use bank::{Bank, MatchStatus};
pub use config::{AccountMappings, Config, ConfigError, PatternSettings, Settings};
pub use sensitive::{SensitiveAccount, SensitiveAccounts};
pub use statement::StatementInfo;
