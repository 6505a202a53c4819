//! Inline bold markup: the `**bold**` subset of Markdown, without nesting or escapes.

use serde::{Deserialize, Serialize};

const BOLD_MARKER: &str = "**";

/// A run of text that is uniformly plain or bold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub bold: bool,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// Splits `text` into plain and bold segments, scanning left to right.
///
/// Each `**...**` pair becomes one bold segment. An opening `**` with no closing
/// pair is kept as literal plain text, markers included. Empty segments are dropped
/// and adjacent plain segments are merged, so input without a complete pair always
/// yields at most one plain segment.
pub fn parse_bold_markup(text: &str) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some(open) = rest.find(BOLD_MARKER) else {
            push_segment(&mut segments, Segment::plain(rest));
            break;
        };

        let after_open = &rest[open + BOLD_MARKER.len()..];
        let Some(close) = after_open.find(BOLD_MARKER) else {
            // Unterminated marker: everything from here on is literal.
            push_segment(&mut segments, Segment::plain(rest));
            break;
        };

        push_segment(&mut segments, Segment::plain(&rest[..open]));
        push_segment(&mut segments, Segment::bold(&after_open[..close]));
        rest = &after_open[close + BOLD_MARKER.len()..];
    }

    segments
}

fn push_segment(segments: &mut Vec<Segment>, segment: Segment) {
    if segment.text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(last) if last.bold == segment.bold && !segment.bold => {
            last.text.push_str(&segment.text);
        }
        _ => segments.push(segment),
    }
}

/// Removes complete `**` pairs, leaving the text a reader would see.
pub fn strip_bold_markup(text: &str) -> String {
    parse_bold_markup(text)
        .into_iter()
        .map(|s| s.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_span_in_middle() {
        assert_eq!(
            parse_bold_markup("Hello **world** foo"),
            vec![
                Segment::plain("Hello "),
                Segment::bold("world"),
                Segment::plain(" foo"),
            ]
        );
    }

    #[test]
    fn test_plain_text_is_single_segment() {
        assert_eq!(
            parse_bold_markup("no markup here"),
            vec![Segment::plain("no markup here")]
        );
    }

    #[test]
    fn test_unterminated_marker_is_literal() {
        assert_eq!(
            parse_bold_markup("Led **migration to Rust"),
            vec![Segment::plain("Led **migration to Rust")]
        );
    }

    #[test]
    fn test_unterminated_after_complete_pair() {
        assert_eq!(
            parse_bold_markup("**Rust** and **Go"),
            vec![Segment::bold("Rust"), Segment::plain(" and **Go")]
        );
    }

    #[test]
    fn test_adjacent_bold_pairs_stay_separate() {
        assert_eq!(
            parse_bold_markup("**a****b**"),
            vec![Segment::bold("a"), Segment::bold("b")]
        );
    }

    #[test]
    fn test_empty_pair_is_dropped() {
        assert_eq!(parse_bold_markup("x****y"), vec![Segment::plain("xy")]);
    }

    #[test]
    fn test_empty_input_yields_no_segments() {
        assert!(parse_bold_markup("").is_empty());
    }

    #[test]
    fn test_whole_text_bold() {
        assert_eq!(
            parse_bold_markup("**Senior Engineer**"),
            vec![Segment::bold("Senior Engineer")]
        );
    }

    #[test]
    fn test_multibyte_text_around_markers() {
        assert_eq!(
            parse_bold_markup("café **naïve** résumé"),
            vec![
                Segment::plain("café "),
                Segment::bold("naïve"),
                Segment::plain(" résumé"),
            ]
        );
    }

    #[test]
    fn test_strip_bold_markup() {
        assert_eq!(strip_bold_markup("Built **fast** APIs"), "Built fast APIs");
        assert_eq!(strip_bold_markup("odd **marker"), "odd **marker");
    }
}
