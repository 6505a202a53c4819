//! Per-template presentation parameters.
//!
//! Templates differ only in cosmetics. Section order and content rules live in
//! `layout.rs` and never branch on the template.

use serde::{Deserialize, Serialize};

use crate::models::resume::TemplateType;

/// ISO A4 in PDF points.
pub const A4_WIDTH_PT: f32 = 595.0;
pub const A4_HEIGHT_PT: f32 = 842.0;

/// Largest margin accepted from configuration; beyond this A4 has no usable width left.
pub const MAX_MARGIN_PT: f32 = 200.0;

/// Geometry and type sizes for one template variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateStyle {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub title_size: f32,
    pub header_size: f32,
    pub body_size: f32,
    /// Extra vertical space added to `body_size` between wrapped lines.
    pub leading: f32,
    pub divider_thickness: f32,
    /// Horizontal indent of list entries and the skills line.
    pub entry_indent: f32,
    /// Gap between a bullet glyph and its entry text.
    pub bullet_gap: f32,
    /// Separator between contact fields.
    pub contact_separator: String,
    /// Separator used to join skills into one line.
    pub skill_separator: String,
}

impl TemplateStyle {
    /// Returns the style for a template, before any configured overrides.
    pub fn for_template(template: TemplateType) -> Self {
        let modern = Self::modern();
        match template {
            TemplateType::Modern => modern,
            TemplateType::Professional => Self {
                title_size: 24.0,
                header_size: 12.0,
                divider_thickness: 0.75,
                ..modern.with_margin(50.0)
            },
            TemplateType::Creative => Self {
                title_size: 32.0,
                header_size: 14.0,
                divider_thickness: 2.0,
                contact_separator: "  \u{2022}  ".to_string(),
                ..modern
            },
            TemplateType::Academic => Self {
                title_size: 22.0,
                header_size: 12.0,
                body_size: 10.5,
                divider_thickness: 0.5,
                ..modern.with_margin(50.0)
            },
        }
    }

    fn modern() -> Self {
        Self {
            page_width: A4_WIDTH_PT,
            page_height: A4_HEIGHT_PT,
            margin_left: 40.0,
            margin_right: 40.0,
            margin_top: 40.0,
            margin_bottom: 40.0,
            title_size: 28.0,
            header_size: 13.0,
            body_size: 11.0,
            leading: 4.0,
            divider_thickness: 1.0,
            entry_indent: 10.0,
            bullet_gap: 8.0,
            contact_separator: " | ".to_string(),
            skill_separator: ", ".to_string(),
        }
    }

    /// Applies the same margin on all four sides.
    pub fn with_margin(self, margin: f32) -> Self {
        Self {
            margin_left: margin,
            margin_right: margin,
            margin_top: margin,
            margin_bottom: margin,
            ..self
        }
    }

    /// Page width minus left and right margins.
    pub fn usable_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// The lowest baseline a drawn element may occupy before a page break.
    pub fn bottom_limit(&self) -> f32 {
        self.page_height - self.margin_bottom
    }

    /// Vertical advance after one wrapped body line.
    pub fn line_advance(&self) -> f32 {
        self.body_size + self.leading
    }

    /// Advance after the name line.
    pub fn title_advance(&self) -> f32 {
        self.title_size + 2.0
    }

    /// Advance after a section header.
    pub fn header_advance(&self) -> f32 {
        self.header_size + 3.0
    }

    /// Advance after the divider rule.
    pub fn divider_advance(&self) -> f32 {
        20.0
    }

    /// Space left after each section.
    pub fn section_gap(&self) -> f32 {
        12.0
    }
}

impl Default for TemplateStyle {
    fn default() -> Self {
        Self::for_template(TemplateType::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modern_matches_a4_defaults() {
        let style = TemplateStyle::for_template(TemplateType::Modern);
        assert_eq!(style.page_width, 595.0);
        assert_eq!(style.page_height, 842.0);
        assert_eq!(style.usable_width(), 515.0);
        assert_eq!(style.bottom_limit(), 802.0);
        assert_eq!(style.title_advance(), 30.0);
        assert_eq!(style.header_advance(), 16.0);
        assert_eq!(style.line_advance(), 15.0);
    }

    #[test]
    fn test_variants_only_change_cosmetics() {
        for template in TemplateType::ALL {
            let style = TemplateStyle::for_template(template);
            assert_eq!(style.page_width, A4_WIDTH_PT, "{template} page width");
            assert_eq!(style.page_height, A4_HEIGHT_PT, "{template} page height");
            assert!(
                (40.0..=50.0).contains(&style.margin_left),
                "{template} margin out of range"
            );
            assert!(style.usable_width() > 400.0);
        }
    }

    #[test]
    fn test_with_margin_sets_all_sides() {
        let style = TemplateStyle::for_template(TemplateType::Modern).with_margin(72.0);
        assert_eq!(style.margin_left, 72.0);
        assert_eq!(style.margin_right, 72.0);
        assert_eq!(style.margin_top, 72.0);
        assert_eq!(style.margin_bottom, 72.0);
        assert_eq!(style.usable_width(), 595.0 - 144.0);
    }
}
