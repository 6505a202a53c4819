//! Resume layout: turns a `Resume` into positioned draw operations on A4 pages.
//!
//! Coordinates here are top-down: `y` grows toward the bottom of the page and is
//! the text baseline. The PDF writer flips them into PDF space.
//!
//! The cursor is checked after every drawn element, so a single long section
//! spills across as many pages as it needs.

use serde::Serialize;
use tracing::debug;

use crate::models::resume::Resume;
use crate::render::font_metrics::{get_metrics, FontWeight};
use crate::render::markup::{parse_bold_markup, strip_bold_markup};
use crate::render::template::TemplateStyle;
use crate::render::wrap::{wrap_segments, wrap_text};
use crate::render::RenderFailure;

pub const SUMMARY_HEADER: &str = "PROFESSIONAL SUMMARY";
pub const EDUCATION_HEADER: &str = "EDUCATION";
pub const SKILLS_HEADER: &str = "TECHNICAL SKILLS";
pub const EXPERIENCE_HEADER: &str = "RELEVANT EXPERIENCE";
pub const PROJECTS_HEADER: &str = "PROJECTS";

pub const SECTION_HEADERS: [&str; 5] = [
    SUMMARY_HEADER,
    EDUCATION_HEADER,
    SKILLS_HEADER,
    EXPERIENCE_HEADER,
    PROJECTS_HEADER,
];

const BULLET: &str = "\u{2022}";

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// A single positioned element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        weight: FontWeight,
        text: String,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        thickness: f32,
    },
}

impl DrawOp {
    pub fn y(&self) -> f32 {
        match self {
            DrawOp::Text { y, .. } | DrawOp::Rule { y, .. } => *y,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Text of every text op on the page, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rule { .. } => None,
        })
    }
}

/// A fully laid-out resume, ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaidOutDocument {
    pub title: String,
    pub style: TemplateStyle,
    pub pages: Vec<Page>,
}

impl LaidOutDocument {
    /// Section headers in the order they were drawn.
    #[cfg(test)]
    pub fn section_headers(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(Page::texts)
            .filter(|t| SECTION_HEADERS.contains(t))
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cursor
// ────────────────────────────────────────────────────────────────────────────

struct PageCursor<'a> {
    style: &'a TemplateStyle,
    finished: Vec<Page>,
    current: Page,
    y: f32,
}

impl<'a> PageCursor<'a> {
    fn new(style: &'a TemplateStyle) -> Self {
        Self {
            style,
            finished: Vec::new(),
            current: Page::default(),
            y: style.margin_top,
        }
    }

    fn draw(&mut self, op: DrawOp) {
        self.current.ops.push(op);
    }

    /// Moves the cursor down and breaks the page once it passes the bottom margin.
    fn advance(&mut self, dy: f32) {
        self.y += dy;
        if self.y > self.style.bottom_limit() {
            let page = std::mem::take(&mut self.current);
            self.finished.push(page);
            self.y = self.style.margin_top;
        }
    }

    fn finish(mut self) -> Vec<Page> {
        // A break triggered by the very last advance leaves an empty trailing page.
        if !self.current.is_empty() || self.finished.is_empty() {
            self.finished.push(self.current);
        }
        self.finished
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

/// Lays out a resume with the given style.
///
/// Sections appear in a fixed order and are omitted when their backing field is
/// empty (blank strings and blank list entries count as empty).
pub fn layout_resume(resume: &Resume, style: &TemplateStyle) -> Result<LaidOutDocument, RenderFailure> {
    validate_style(style)?;

    let mut cursor = PageCursor::new(style);
    let left = style.margin_left;
    let width = style.usable_width();

    // The name is already bold, so markup in it is dropped rather than honored.
    let name = strip_bold_markup(resume.full_name.trim());
    if !name.is_empty() {
        let title_metrics = get_metrics(FontWeight::Bold);
        let name_lines = wrap_text(&name, width, |s| {
            title_metrics.measure_str(s, style.title_size)
        });
        for line in name_lines {
            cursor.draw(DrawOp::Text {
                x: left,
                y: cursor.y,
                size: style.title_size,
                weight: FontWeight::Bold,
                text: line,
            });
            cursor.advance(style.title_advance());
        }
    }

    let contact = contact_line(resume, &style.contact_separator);
    if !contact.is_empty() {
        draw_paragraph(&mut cursor, &contact, left, width);
    }

    if !name.is_empty() || !contact.is_empty() {
        cursor.draw(DrawOp::Rule {
            x1: left,
            x2: style.page_width - style.margin_right,
            y: cursor.y,
            thickness: style.divider_thickness,
        });
        cursor.advance(style.divider_advance());
    }

    let summary = resume.summary.trim();
    if !summary.is_empty() {
        draw_header(&mut cursor, SUMMARY_HEADER);
        for paragraph in summary.lines().filter(|l| !l.trim().is_empty()) {
            draw_paragraph(&mut cursor, paragraph, left, width);
        }
        cursor.advance(style.section_gap());
    }

    draw_bulleted_section(&mut cursor, EDUCATION_HEADER, &resume.education);

    let skills = non_blank(&resume.skills);
    if !skills.is_empty() {
        draw_header(&mut cursor, SKILLS_HEADER);
        let line = skills.join(&style.skill_separator);
        draw_paragraph(
            &mut cursor,
            &line,
            left + style.entry_indent,
            width - style.entry_indent,
        );
        cursor.advance(style.section_gap());
    }

    draw_bulleted_section(&mut cursor, EXPERIENCE_HEADER, &resume.experience);
    draw_bulleted_section(&mut cursor, PROJECTS_HEADER, &resume.projects);

    let pages = cursor.finish();
    debug!(
        resume_id = %resume.id,
        pages = pages.len(),
        "Resume layout complete"
    );

    Ok(LaidOutDocument {
        title: resume.title.clone(),
        style: style.clone(),
        pages,
    })
}

fn validate_style(style: &TemplateStyle) -> Result<(), RenderFailure> {
    let dimensions = [
        style.page_width,
        style.page_height,
        style.margin_left,
        style.margin_right,
        style.margin_top,
        style.margin_bottom,
        style.title_size,
        style.header_size,
        style.body_size,
        style.leading,
    ];
    if dimensions.iter().any(|d| !d.is_finite() || *d < 0.0) {
        return Err(RenderFailure::Layout(
            "page geometry must be finite and non-negative".to_string(),
        ));
    }
    if style.usable_width() - style.entry_indent - style.bullet_gap <= 0.0 {
        return Err(RenderFailure::Layout(format!(
            "margins leave no usable width on a {}pt page",
            style.page_width
        )));
    }
    if style.margin_top >= style.bottom_limit() {
        return Err(RenderFailure::Layout(format!(
            "margins leave no usable height on a {}pt page",
            style.page_height
        )));
    }
    if style.line_advance() <= 0.0 {
        return Err(RenderFailure::Layout(
            "line advance must be positive".to_string(),
        ));
    }
    Ok(())
}

fn contact_line(resume: &Resume, separator: &str) -> String {
    [resume.email.trim(), resume.phone.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn non_blank(entries: &[String]) -> Vec<&str> {
    entries
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .collect()
}

fn draw_header(cursor: &mut PageCursor<'_>, header: &str) {
    let style = cursor.style;
    cursor.draw(DrawOp::Text {
        x: style.margin_left,
        y: cursor.y,
        size: style.header_size,
        weight: FontWeight::Bold,
        text: header.to_string(),
    });
    cursor.advance(style.header_advance());
}

fn draw_bulleted_section(cursor: &mut PageCursor<'_>, header: &str, entries: &[String]) {
    let entries = non_blank(entries);
    if entries.is_empty() {
        return;
    }
    let style = cursor.style;
    draw_header(cursor, header);

    let bullet_x = style.margin_left + style.entry_indent;
    let text_x = bullet_x + style.bullet_gap;
    let text_width = style.usable_width() - style.entry_indent - style.bullet_gap;

    for entry in entries {
        cursor.draw(DrawOp::Text {
            x: bullet_x,
            y: cursor.y,
            size: style.body_size,
            weight: FontWeight::Regular,
            text: BULLET.to_string(),
        });
        draw_paragraph(cursor, entry, text_x, text_width);
    }
    cursor.advance(style.section_gap());
}

/// Draws `text` (with `**bold**` markup) wrapped to `max_width`, one body line at a time.
fn draw_paragraph(cursor: &mut PageCursor<'_>, text: &str, x: f32, max_width: f32) {
    let style = cursor.style;
    let size = style.body_size;
    let segments = parse_bold_markup(text);
    let lines = wrap_segments(&segments, max_width, |s, weight| {
        get_metrics(weight).measure_str(s, size)
    });

    for line in lines {
        for run in line.runs {
            cursor.draw(DrawOp::Text {
                x: x + run.x_offset,
                y: cursor.y,
                size,
                weight: run.weight,
                text: run.text,
            });
        }
        cursor.advance(style.line_advance());
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
