//! Advisory code bands for new account groups
//!
//! A group's code is a 4-digit number; children are expected inside the
//! thousand-wide band of their parent. The band is shown as help text only,
//! the accounts service decides what it accepts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("code pattern"));

/// Whether `code` has the 4-digit numeric form
pub fn is_valid_code(code: &str) -> bool {
    CODE_RE.is_match(code.trim())
}

/// Inclusive numeric band `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodeRange {
    pub start: u32,
    pub end: u32,
}

impl CodeRange {
    /// Band implied by a parent code: `floor(code / 1000) * 1000` to `+999`
    ///
    /// Returns `None` for codes that are not 4 digits.
    pub fn for_parent_code(code: &str) -> Option<Self> {
        if !is_valid_code(code) {
            return None;
        }
        let value: u32 = code.trim().parse().ok()?;
        let start = value / 1000 * 1000;
        Some(Self { start, end: start + 999 })
    }

    pub fn contains(&self, code: &str) -> bool {
        if !is_valid_code(code) {
            return false;
        }
        code.trim()
            .parse::<u32>()
            .map_or(false, |value| value >= self.start && value <= self.end)
    }

    /// Text shown under the code field, e.g. `1000–1999`
    pub fn help_text(&self) -> String {
        format!("{:04}–{:04}", self.start, self.end)
    }
}

impl std::fmt::Display for CodeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.help_text())
    }
}
