//! Greedy first-fit word wrap over mixed plain/bold text.
//!
//! Each line is filled with whitespace-delimited words until the next word would
//! overflow `max_width`. Breaks are not globally optimized. A word wider than
//! `max_width` on its own still gets a line to itself rather than being split.
//!
//! Widths are additive: a run's width is the sum of its glyph widths, so the width
//! accumulated while deciding breaks equals the width of the emitted runs.

use crate::render::font_metrics::FontWeight;
use crate::render::markup::Segment;

/// A contiguous piece of a line drawn in one weight, positioned relative to the line start.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub weight: FontWeight,
    pub x_offset: f32,
    pub width: f32,
}

/// One visual line produced by the wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub runs: Vec<Run>,
    pub width: f32,
}

impl WrappedLine {
    /// The line's text with runs joined as drawn.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut cursor = 0.0_f32;
        for run in &self.runs {
            if !out.is_empty() && run.x_offset > cursor + f32::EPSILON {
                out.push(' ');
            }
            out.push_str(&run.text);
            cursor = run.x_offset + run.width;
        }
        out
    }
}

/// A word may span a segment boundary (`foo**bar**`), so it is a list of pieces.
struct Word {
    pieces: Vec<(String, FontWeight)>,
}

impl Word {
    fn last_weight(&self) -> FontWeight {
        self.pieces
            .last()
            .map(|(_, w)| *w)
            .unwrap_or(FontWeight::Regular)
    }
}

fn split_words(segments: &[Segment]) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    // True when the previous character emitted was not whitespace, i.e. the next
    // piece glues onto the current word.
    let mut open_word = false;

    for segment in segments {
        if segment.text.is_empty() {
            continue;
        }
        let weight = FontWeight::from_bold(segment.bold);
        let starts_with_space = segment.text.starts_with(char::is_whitespace);
        for (i, token) in segment.text.split_whitespace().enumerate() {
            let glue = i == 0 && open_word && !starts_with_space;
            if let Some(word) = words.last_mut().filter(|_| glue) {
                word.pieces.push((token.to_string(), weight));
                continue;
            }
            words.push(Word {
                pieces: vec![(token.to_string(), weight)],
            });
        }
        open_word = !segment.text.ends_with(char::is_whitespace);
    }

    words
}

/// Wraps styled segments into lines no wider than `max_width` where possible.
///
/// `measure(text, weight)` returns the rendered width of `text` in that weight.
pub fn wrap_segments<F>(segments: &[Segment], max_width: f32, measure: F) -> Vec<WrappedLine>
where
    F: Fn(&str, FontWeight) -> f32,
{
    let words = split_words(segments);
    let mut lines = Vec::new();
    let mut current: Vec<&Word> = Vec::new();
    let mut current_width = 0.0_f32;

    for word in &words {
        let word_width: f32 = word.pieces.iter().map(|(t, w)| measure(t.as_str(), *w)).sum();
        let candidate = match current.last() {
            None => word_width,
            Some(prev) => current_width + measure(" ", prev.last_weight()) + word_width,
        };

        if candidate > max_width && !current.is_empty() {
            lines.push(build_line(&current, &measure));
            current.clear();
            current_width = word_width;
        } else {
            current_width = candidate;
        }
        current.push(word);
    }

    if !current.is_empty() {
        lines.push(build_line(&current, &measure));
    }

    lines
}

fn build_line<F>(words: &[&Word], measure: &F) -> WrappedLine
where
    F: Fn(&str, FontWeight) -> f32,
{
    let mut runs: Vec<Run> = Vec::new();

    for (i, word) in words.iter().enumerate() {
        for (j, (text, weight)) in word.pieces.iter().enumerate() {
            let spaced = i > 0 && j == 0;

            if let Some(run) = runs.last_mut().filter(|r| r.weight == *weight) {
                if spaced {
                    run.text.push(' ');
                }
                run.text.push_str(text);
                run.width = measure(&run.text, run.weight);
                continue;
            }

            let (mut x_offset, prev_weight) = match runs.last() {
                Some(prev) => (prev.x_offset + prev.width, Some(prev.weight)),
                None => (0.0, None),
            };
            if let (true, Some(prev_weight)) = (spaced, prev_weight) {
                // The separating space is set in the preceding run's face.
                x_offset += measure(" ", prev_weight);
            }
            runs.push(Run {
                text: text.clone(),
                weight: *weight,
                x_offset,
                width: measure(text.as_str(), *weight),
            });
        }
    }

    let width = runs.last().map(|r| r.x_offset + r.width).unwrap_or(0.0);
    WrappedLine { runs, width }
}

/// Wraps unstyled text; returns one string per line.
pub fn wrap_text<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    wrap_segments(&[Segment::plain(text)], max_width, |s, _| measure(s))
        .iter()
        .map(WrappedLine::text)
        .collect()
}
