use stmtfile_core::SensitiveAccount;

use crate::util::{digits, last4, similarity_ratio};

pub const PNC_NAME_THRESHOLD: f64 = 0.85;
pub const CAMBRIDGE_NAME_THRESHOLD: f64 = 0.90;
pub const BANKUNITED_NAME_THRESHOLD: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberMatchKind {
    Full,
    Last4,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberMatch<'a> {
    pub account: &'a SensitiveAccount,
    pub kind: NumberMatchKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameMatch<'a> {
    pub account: &'a SensitiveAccount,
    pub ratio: f64,
}

/// Reconciles extracted candidates against one bank's sensitive accounts.
#[derive(Debug, Clone, Copy)]
pub struct SensitiveMatcher<'a> {
    accounts: &'a [SensitiveAccount],
}

impl<'a> SensitiveMatcher<'a> {
    pub fn new(accounts: &'a [SensitiveAccount]) -> Self {
        Self { accounts }
    }

    /// Match by account number, ignoring separators and masks.
    ///
    /// A full-number match anywhere in the list beats any last-4 match; within
    /// a tier the first account in list order wins. Last-4 needs at least four
    /// digits on both sides.
    pub fn by_number(&self, candidate: &str) -> Option<NumberMatch<'a>> {
        let wanted = digits(candidate);
        if wanted.is_empty() {
            return None;
        }
        let normalized: Vec<(&'a SensitiveAccount, String)> =
            self.accounts.iter().map(|a| (a, digits(&a.number))).collect();

        if let Some(&(account, _)) = normalized.iter().find(|(_, n)| !n.is_empty() && *n == wanted) {
            tracing::debug!(name = %account.name, "sensitive number match (full)");
            return Some(NumberMatch { account, kind: NumberMatchKind::Full });
        }

        let wanted4 = last4(&wanted)?;
        let &(account, _) = normalized.iter().find(|(_, n)| last4(n) == Some(wanted4))?;
        tracing::debug!(name = %account.name, last4 = wanted4, "sensitive number match (last 4)");
        Some(NumberMatch { account, kind: NumberMatchKind::Last4 })
    }

    /// Best fuzzy name match at or above `threshold`, case-insensitive.
    /// Ties go to the earlier account.
    pub fn by_name(&self, candidate: &str, threshold: f64) -> Option<NameMatch<'a>> {
        let wanted = candidate.trim().to_uppercase();
        if wanted.is_empty() {
            return None;
        }
        let mut best: Option<NameMatch<'a>> = None;
        for account in self.accounts {
            let ratio = similarity_ratio(&wanted, &account.name.trim().to_uppercase());
            if ratio >= threshold && best.map_or(true, |b| ratio > b.ratio) {
                best = Some(NameMatch { account, ratio });
            }
        }
        if let Some(m) = best {
            tracing::debug!(candidate = %wanted, name = %m.account.name, ratio = m.ratio, "sensitive name match");
        }
        best
    }
}
