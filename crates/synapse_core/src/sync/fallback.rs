//! Demo-mode summary used when no remote endpoint is configured.

/// Appended to every locally derived summary.
pub const PENDING_MARKER: &str = "... (awaiting AI integration)";

const SUMMARY_SEGMENTS: usize = 2;

/// First two sentence-like segments of `content`, joined with `". "`,
/// followed by [`PENDING_MARKER`].
///
/// Segments are split on `.`, `!`, `?` and newlines, trimmed, and empty
/// pieces are skipped.
pub fn fallback_summary(content: &str) -> String {
    let lead = content
        .split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .take(SUMMARY_SEGMENTS)
        .collect::<Vec<_>>()
        .join(". ");
    format!("{lead}{PENDING_MARKER}")
}

#[cfg(test)]
mod tests {
    use super::{fallback_summary, PENDING_MARKER};

    #[test]
    fn keeps_first_two_sentences() {
        let summary = fallback_summary("First sentence. Second sentence. Third sentence.");
        assert!(summary.starts_with("First sentence. Second sentence"));
        assert!(summary.ends_with(PENDING_MARKER));
        assert!(!summary.contains("Third"));
    }

    #[test]
    fn splits_on_newlines_and_punctuation() {
        assert_eq!(
            fallback_summary("Wow!! really?\nyes"),
            format!("Wow. really{PENDING_MARKER}")
        );
    }

    #[test]
    fn empty_content_keeps_marker_only() {
        assert_eq!(fallback_summary(""), PENDING_MARKER);
    }
}
