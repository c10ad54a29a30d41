//! Decree-number canonicalisation for free-text regulation references.
//!
//! Survey cells describe regulations in prose ("Decreto nº 35.606, de 2019",
//! "regulamentado pelo decreto 4123/2013"). The canonical decree number is
//! the first substring with a decree-number shape:
//!
//! - Dotted: one to three digits, a dot, three digits ("35.606", "123.456").
//! - Bare: a run of three to six digits ("4123", "35606"), only when the
//!   pattern allows it, and never a plausible calendar year (1900-2099).
//!
//! The dotted form always wins over a bare run, even one that appears first.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static DOTTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{1,3}\.\d{3}\b").unwrap());
static BARE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{3,6}\b").unwrap());

/// Cell values that spreadsheets use to mean "nothing here".
const NULL_LIKE: &[&str] = &["nan", "none", "n/a", "-"];

/// Which number shapes count as a decree number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecreePattern {
    /// Dotted form first, then a bare 3-6 digit run that is not a year.
    #[default]
    DottedOrBare,
    /// Only the dotted form.
    DottedOnly,
}

impl std::str::FromStr for DecreePattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "dotted_or_bare" => Ok(Self::DottedOrBare),
            "dotted_only" => Ok(Self::DottedOnly),
            other => Err(format!("unknown decree pattern: {other}")),
        }
    }
}

/// True if `s` parses as an integer in 1900..=2099.
pub fn is_plausible_year(s: &str) -> bool {
    s.parse::<u32>()
        .map(|v| (1900..=2099).contains(&v))
        .unwrap_or(false)
}

/// Extract the canonical decree number from a free-text cell.
///
/// Returns `None` for empty or null-like cells and when no candidate survives.
pub fn extract_decree_number(text: &str, pattern: DecreePattern) -> Option<String> {
    let text = text.trim();
    if text.is_empty() || NULL_LIKE.contains(&text.to_lowercase().as_str()) {
        return None;
    }

    if let Some(m) = DOTTED.find(text) {
        return Some(m.as_str().to_string());
    }

    if pattern == DecreePattern::DottedOnly {
        return None;
    }

    BARE.find_iter(text)
        .map(|m| m.as_str())
        .find(|candidate| !is_plausible_year(candidate))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Option<String> {
        extract_decree_number(text, DecreePattern::DottedOrBare)
    }

    #[test]
    fn dotted_form_returned_verbatim() {
        assert_eq!(extract("Decreto nº 35.606, de 2019").as_deref(), Some("35.606"));
        assert_eq!(extract("Decreto 1.234").as_deref(), Some("1.234"));
        assert_eq!(extract("123.456").as_deref(), Some("123.456"));
    }

    #[test]
    fn dotted_form_preferred_over_earlier_bare_run() {
        assert_eq!(
            extract("Lei 4123 regulamentada pelo Decreto 44.200").as_deref(),
            Some("44.200")
        );
    }

    #[test]
    fn bare_run_accepted_when_not_a_year() {
        assert_eq!(extract("decreto 4123/2013").as_deref(), Some("4123"));
        assert_eq!(extract("Decreto 35606").as_deref(), Some("35606"));
    }

    #[test]
    fn years_are_not_decree_numbers() {
        assert_eq!(extract("regulamentado em 2020"), None);
        assert_eq!(extract("1999"), None);
        assert_eq!(extract("de 2013, alterado em 2021"), None);
    }

    #[test]
    fn year_skipped_in_favour_of_later_candidate() {
        assert_eq!(extract("de 2019, decreto 7724").as_deref(), Some("7724"));
    }

    #[test]
    fn year_range_boundaries() {
        assert!(is_plausible_year("1900"));
        assert!(is_plausible_year("2099"));
        assert!(!is_plausible_year("1899"));
        assert!(!is_plausible_year("2100"));
        assert!(!is_plausible_year("20a0"));
        assert_eq!(extract("Decreto 2100").as_deref(), Some("2100"));
    }

    #[test]
    fn short_and_long_runs_ignored() {
        assert_eq!(extract("art. 12"), None);
        assert_eq!(extract("processo 1234567"), None);
    }

    #[test]
    fn null_like_cells() {
        for cell in ["", "   ", "nan", "NaN", "None", "n/a", "N/A", "-"] {
            assert_eq!(extract(cell), None, "cell {cell:?}");
        }
    }

    #[test]
    fn dotted_only_rejects_bare_runs() {
        assert_eq!(extract_decree_number("Decreto 4123", DecreePattern::DottedOnly), None);
        assert_eq!(
            extract_decree_number("Decreto 53.623", DecreePattern::DottedOnly).as_deref(),
            Some("53.623")
        );
    }

    #[test]
    fn pattern_from_str() {
        assert_eq!("dotted-only".parse::<DecreePattern>().unwrap(), DecreePattern::DottedOnly);
        assert_eq!(
            "DOTTED_OR_BARE".parse::<DecreePattern>().unwrap(),
            DecreePattern::DottedOrBare
        );
        assert!("loose".parse::<DecreePattern>().is_err());
    }
}
