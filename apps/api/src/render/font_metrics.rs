//! Static font-metric tables for the two PDF standard faces the renderer uses.
//!
//! Widths come from the Adobe AFM files for Helvetica and Helvetica-Bold and are
//! stored in 1/1000 em, the unit PDF uses for glyph widths. Multiplying by the
//! font size in points gives the advance in points.
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font weight enum
// ────────────────────────────────────────────────────────────────────────────

/// The two weights a line of resume text can be drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    pub fn from_bold(bold: bool) -> Self {
        if bold {
            FontWeight::Bold
        } else {
            FontWeight::Regular
        }
    }

    /// PDF base font name (one of the standard 14).
    pub fn base_font(&self) -> &'static str {
        match self {
            FontWeight::Regular => "Helvetica",
            FontWeight::Bold => "Helvetica-Bold",
        }
    }

    /// Resource name the content streams use to select this face.
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontWeight::Regular => "F1",
            FontWeight::Bold => "F2",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static glyph-width table for one face.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub weight: FontWeight,
    widths: [u16; 95],
    /// Fallback width for characters outside printable ASCII.
    pub average_char_width: u16,
    pub bullet_width: u16,
}

impl FontMetricTable {
    /// Width of a single character in 1/1000 em.
    pub fn char_width(&self, c: char) -> u16 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else if c == '\u{2022}' {
            self.bullet_width
        } else {
            self.average_char_width
        }
    }

    /// Measures the rendered width of a string in points at `size_pt`.
    pub fn measure_str(&self, s: &str, size_pt: f32) -> f32 {
        let units: u32 = s.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 * size_pt / 1000.0
    }

    /// Glyph widths for the WinAnsi range 32..=255, as embedded in the PDF font dictionary.
    pub fn pdf_widths(&self) -> Vec<u16> {
        (32u8..=255)
            .map(|b| match b {
                32..=126 => self.widths[(b - 32) as usize],
                0x95 => self.bullet_width,
                _ => self.average_char_width,
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    weight: FontWeight::Regular,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        278,  278,  355,  556,  556,  889,  667,  222,  333,  333,  389,  584,  278,  333,  278,  278,
        // 0     1     2     3     4     5     6     7     8     9
        556,  556,  556,  556,  556,  556,  556,  556,  556,  556,
        // :     ;     <     =     >     ?     @
        278,  278,  584,  584,  584,  556,  1015,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        667,  667,  722,  722,  667,  611,  778,  722,  278,  500,  667,  556,  833,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        722,  778,  667,  778,  722,  667,  611,  722,  667,  944,  667,  667,  611,
        // [     \     ]     ^     _     `
        278,  278,  278,  469,  556,  222,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        556,  556,  500,  556,  556,  278,  556,  556,  222,  222,  500,  222,  833,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        556,  556,  556,  556,  333,  500,  278,  556,  500,  722,  500,  500,  500,
        // {     |     }     ~
        334,  260,  334,  584,
    ],
    average_char_width: 556,
    bullet_width: 350,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    weight: FontWeight::Bold,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        278,  333,  474,  556,  556,  889,  722,  278,  333,  333,  389,  584,  278,  333,  278,  278,
        // 0     1     2     3     4     5     6     7     8     9
        556,  556,  556,  556,  556,  556,  556,  556,  556,  556,
        // :     ;     <     =     >     ?     @
        333,  333,  584,  584,  584,  611,  975,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        722,  722,  722,  722,  667,  611,  778,  722,  278,  556,  722,  611,  833,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        722,  778,  667,  778,  722,  667,  611,  722,  667,  944,  667,  667,  611,
        // [     \     ]     ^     _     `
        333,  278,  333,  584,  556,  278,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        556,  611,  556,  611,  556,  333,  611,  611,  278,  278,  556,  278,  889,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        611,  611,  611,  611,  389,  556,  333,  611,  556,  778,  556,  556,  500,
        // {     |     }     ~
        389,  280,  389,  584,
    ],
    average_char_width: 611,
    bullet_width: 350,
};

/// Returns the static metric table for a given weight.
pub fn get_metrics(weight: FontWeight) -> &'static FontMetricTable {
    match weight {
        FontWeight::Regular => &HELVETICA_TABLE,
        FontWeight::Bold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
