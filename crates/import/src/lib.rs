//! Statement identification and per-bank extraction.
//!
//! Works on text lines already pulled out of a PDF: [`identify`] picks the
//! bank, a [`strategy::BankStrategy`] reads account and date details, and
//! [`processor::StatementProcessor`] ties the two together.

/// Declare a function returning a lazily compiled, cached [`regex::Regex`].
/// The caller must have `Regex` and `OnceLock` in scope.
macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}
pub(crate) use re;

pub mod identify;
pub mod processor;
pub mod sensitive;
pub mod strategy;
pub(crate) mod util;

pub use identify::{identify_bank, IdentifiedBy, Identification};
pub use processor::{ExtractionStats, Processed, StatementProcessor};
pub use sensitive::SensitiveMatcher;
pub use strategy::{strategy_for, BankStrategy, StrategyContext};
