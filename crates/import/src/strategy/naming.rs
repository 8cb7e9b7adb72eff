use chrono::{Datelike, NaiveDate};
use std::path::PathBuf;

use stmtfile_core::Bank;

/// Longest destination filename we produce, extension included.
pub const MAX_FILENAME_LEN: usize = 200;

const FALLBACK_NAME: &str = "sanitized_filename";

/// Make `name` safe as a path component. Reserved characters and control
/// characters become `_`; whitespace runs become one space, or `_` unless
/// `allow_spaces`. Leading and trailing spaces, underscores and dots go.
pub fn sanitize_filename(name: &str, allow_spaces: bool) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if (c as u32) < 0x20 && !c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    let joiner = if allow_spaces { " " } else { "_" };
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(joiner);
    let trimmed = collapsed.trim_matches(|c| c == ' ' || c == '_' || c == '.');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split `name.ext` into (`name`, `.ext`). Dotfiles have no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}

/// Cut `name` to `max` characters, keeping the extension and marking the cut
/// with `...`. A name without an extension gets `.pdf`.
pub fn truncate_filename(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let (base, ext) = split_extension(name);
    let ext = if ext.is_empty() { ".pdf" } else { ext };
    let keep = max.saturating_sub(ext.chars().count() + 3);
    let cut: String = base.chars().take(keep).collect();
    tracing::warn!(original = name, max, "truncated long filename");
    format!("{cut}...{ext}")
}

/// Force a `.pdf` extension, replacing any other one.
pub fn ensure_pdf_extension(name: &str) -> String {
    if name.to_lowercase().ends_with(".pdf") {
        return name.to_string();
    }
    let (base, ext) = split_extension(name);
    // Only treat short dot-suffixes as extensions; "Acme Inc. 2024" has none.
    if !ext.is_empty() && ext.len() <= 5 && !ext.contains(' ') {
        format!("{base}.pdf")
    } else {
        format!("{name}.pdf")
    }
}

/// Parse `s` with the first matching `chrono` format. Two-digit years read
/// through a four-digit format are rejected so `%y` gets its turn.
pub fn parse_date(s: &str, formats: &[&str]) -> Option<NaiveDate> {
    let s = s.trim();
    formats
        .iter()
        .filter_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .find(|d| d.year() >= 1900)
}

pub const SLASH_FORMATS: &[&str] = &["%m/%d/%Y", "%m/%d/%y"];
pub const LONG_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y"];

pub fn month_name(date: NaiveDate) -> String {
    date.format("%B").to_string()
}

/// `<Bank>/<YYYY-MM>`, or `<Bank>/UnknownDate`.
pub fn year_month_folder(bank: Bank, date: Option<NaiveDate>) -> PathBuf {
    let mut path = PathBuf::from(bank.name());
    match date {
        Some(d) => path.push(d.format("%Y-%m").to_string()),
        None => path.push("UnknownDate"),
    }
    path
}

/// Base name of a path given as a string, either separator style.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_filename("A/B:C*D?", false), "A_B_C_D");
        assert_eq!(sanitize_filename("ACME  FUND\tLLC", false), "ACME_FUND_LLC");
        assert_eq!(sanitize_filename("ACME  FUND\nLLC", true), "ACME FUND LLC");
    }

    #[test]
    fn sanitize_trims_and_falls_back() {
        assert_eq!(sanitize_filename(" ._ACME._ ", true), "ACME");
        assert_eq!(sanitize_filename("", true), "sanitized_filename");
        assert_eq!(sanitize_filename("???", false), "sanitized_filename");
    }

    #[test]
    fn truncate_keeps_extension() {
        let long = format!("{}.pdf", "A".repeat(250));
        let cut = truncate_filename(&long, MAX_FILENAME_LEN);
        assert_eq!(cut.chars().count(), MAX_FILENAME_LEN);
        assert!(cut.ends_with("....pdf"));
    }

    #[test]
    fn truncate_short_names_untouched() {
        assert_eq!(truncate_filename("a.pdf", 200), "a.pdf");
    }

    #[test]
    fn truncate_is_char_boundary_safe() {
        let long = format!("{}.pdf", "É".repeat(250));
        let cut = truncate_filename(&long, 50);
        assert_eq!(cut.chars().count(), 50);
    }

    #[test]
    fn ensure_pdf() {
        assert_eq!(ensure_pdf_extension("a.pdf"), "a.pdf");
        assert_eq!(ensure_pdf_extension("a.PDF"), "a.PDF");
        assert_eq!(ensure_pdf_extension("a.txt"), "a.pdf");
        assert_eq!(ensure_pdf_extension("Acme Inc. 2024"), "Acme Inc. 2024.pdf");
        assert_eq!(ensure_pdf_extension("noext"), "noext.pdf");
    }

    #[test]
    fn parse_date_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(parse_date("01/31/2024", SLASH_FORMATS), Some(d));
        assert_eq!(parse_date("1/31/24", SLASH_FORMATS), Some(d));
        assert_eq!(parse_date("January 31, 2024", LONG_FORMATS), Some(d));
        assert_eq!(parse_date("Jan 31, 2024", LONG_FORMATS), Some(d));
        assert_eq!(parse_date("13/45/2024", SLASH_FORMATS), None);
    }

    #[test]
    fn folders() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(year_month_folder(Bank::Cambridge, Some(d)), PathBuf::from("Cambridge/2024-03"));
        assert_eq!(year_month_folder(Bank::BankUnited, None), PathBuf::from("BankUnited/UnknownDate"));
        assert_eq!(month_name(d), "March");
    }

    #[test]
    fn basename_handles_both_separators() {
        assert_eq!(basename("C:\\in\\a.pdf"), "a.pdf");
        assert_eq!(basename("/in/b.pdf"), "b.pdf");
        assert_eq!(basename("c.pdf"), "c.pdf");
    }
}
