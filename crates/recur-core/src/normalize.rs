//! Transaction name normalization
//!
//! Reduces a free-text label such as `"Netflix - March 2024 #12"` to a
//! grouping key (`"netflix"`) so that repeated charges from the same payee
//! land in the same detection group.

use std::sync::LazyLock;

use regex::Regex;

const MONTHS: &str = concat!(
    "january|february|march|april|may|june|july|august|september|october|november|december|",
    "jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec"
);

/// Slash-delimited (`3/15`, `03/15/2024`) or ISO (`2024-03-15`) dates
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{4}-\d{1,2}-\d{1,2}|\d{1,2}/\d{1,2}(?:/\d{2,4})?)\b")
        .expect("valid regex")
});

/// A separator followed by a month and a four-digit year at the end (`- march 2024`)
static MONTH_YEAR_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\s*[-–—:|/,]\s*(?:{MONTHS})\.?\s+\d{{4}}\s*$")).expect("valid regex")
});

static MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b(?:{MONTHS})\b\.?")).expect("valid regex"));

/// Trailing sequence numbers (`#12`, ` 0042`) and separators left dangling by earlier passes
static TRAILING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\s*#?\d+|[\s\-–—:|/,#]+)+$").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize a raw transaction name into its grouping key.
///
/// Lower-cases, then strips dates, a trailing `- <month> <year>` suffix,
/// month names anywhere, and trailing sequence numbers, then collapses
/// whitespace. The passes repeat until nothing changes, so normalizing the
/// result again is a no-op.
pub fn normalize_name(raw: &str) -> String {
    let mut current = raw.to_lowercase();
    loop {
        let next = strip_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

/// One round of stripping. Every replacement shortens the string or leaves
/// it untouched, so repeating it reaches a fixed point.
fn strip_pass(name: &str) -> String {
    let without_dates = DATE_RE.replace_all(name, " ");
    let without_suffix = MONTH_YEAR_SUFFIX_RE.replace(&without_dates, "");
    let without_months = MONTH_RE.replace_all(&without_suffix, " ");
    let without_sequence = TRAILING_RE.replace(&without_months, "");

    WHITESPACE_RE
        .replace_all(&without_sequence, " ")
        .trim()
        .to_string()
}
