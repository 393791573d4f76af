//! Wikilink extraction.
//!
//! `[[Title]]` references inside note content link one note to another in
//! the graph. Matching is non-greedy and does not cross line breaks.

use once_cell::sync::Lazy;
use regex::Regex;

static WIKILINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[(.*?)\]\]").expect("valid wikilink regex"));

/// Returns referenced titles in order of appearance, duplicates included.
pub fn extract(text: &str) -> Vec<String> {
    WIKILINK_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}
