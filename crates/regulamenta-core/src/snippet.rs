//! Contextual search: locate a decree number in extracted text and cut a
//! human-auditable snippet around it.
//!
//! Offsets and window sizes are in characters. Gazette text is full of
//! accented Portuguese, so byte-based windows would split code points.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Rendered in result spreadsheets when the target does not occur.
pub const NOT_FOUND: &str = "Decreto não encontrado no texto";

/// Where a snippet window starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnippetStrategy {
    /// Start at the keyword when it occurs within one window before the match.
    #[default]
    KeywordAnchored,
    /// Half a window either side of the match.
    Centered,
}

impl std::str::FromStr for SnippetStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "keyword_anchored" | "keyword" => Ok(Self::KeywordAnchored),
            "centered" | "centred" => Ok(Self::Centered),
            other => Err(format!("unknown snippet strategy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetOptions {
    pub window: usize,
    pub keyword: String,
    pub strategy: SnippetStrategy,
}

impl Default for SnippetOptions {
    fn default() -> Self {
        Self {
            window: 300,
            keyword: "decreto".to_string(),
            strategy: SnippetStrategy::default(),
        }
    }
}

/// A window of text around a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    /// Character offset of the match in the searched text.
    pub match_start: usize,
    /// Character offset one past the match.
    pub match_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Snippet),
    NotFound,
}

impl SearchOutcome {
    pub fn snippet(&self) -> Option<&Snippet> {
        match self {
            Self::Found(s) => Some(s),
            Self::NotFound => None,
        }
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(s) => f.write_str(&s.text),
            Self::NotFound => f.write_str(NOT_FOUND),
        }
    }
}

fn literal_ci(needle: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Byte offset of the `idx`-th character, or `text.len()` past the end.
fn byte_offset(text: &str, idx: usize) -> usize {
    text.char_indices()
        .nth(idx)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

/// Find the first case-insensitive occurrence of `target` in `text`.
///
/// Never fails: an empty target or a missing occurrence is `NotFound`.
pub fn find_snippet(text: &str, target: &str, opts: &SnippetOptions) -> SearchOutcome {
    let target = target.trim();
    if target.is_empty() {
        return SearchOutcome::NotFound;
    }
    let Some(m) = literal_ci(target).and_then(|re| re.find(text)) else {
        return SearchOutcome::NotFound;
    };

    let match_start = text[..m.start()].chars().count();
    let match_end = match_start + m.as_str().chars().count();
    let total = match_end + text[m.end()..].chars().count();
    let half = opts.window / 2;

    let centered = (
        match_start.saturating_sub(half),
        (match_end + half).min(total),
    );

    let (start, end) = match opts.strategy {
        SnippetStrategy::Centered => centered,
        SnippetStrategy::KeywordAnchored => {
            match keyword_before(text, m.start(), match_start, opts) {
                Some(start) => (start, match_end.max(start + opts.window).min(total)),
                None => centered,
            }
        }
    };

    let from = byte_offset(text, start);
    let to = from + byte_offset(&text[from..], end - start);
    SearchOutcome::Found(Snippet {
        text: text[from..to].trim().to_string(),
        match_start,
        match_end,
    })
}

/// Character offset of the last keyword occurrence within one window before
/// the match.
fn keyword_before(
    text: &str,
    match_byte: usize,
    match_start: usize,
    opts: &SnippetOptions,
) -> Option<usize> {
    let keyword = opts.keyword.trim();
    if keyword.is_empty() {
        return None;
    }
    let region_start_char = match_start.saturating_sub(opts.window);
    let region_start = byte_offset(text, region_start_char);
    let region = &text[region_start..match_byte];
    let hit = literal_ci(keyword)?.find_iter(region).last()?;
    Some(region_start_char + region[..hit.start()].chars().count())
}
