//! Minimal PDF 1.4 writer for laid-out resumes.
//!
//! Output uses only the standard Type1 faces (Helvetica, Helvetica-Bold) with
//! WinAnsi encoding, so no font data is embedded. Content streams are left
//! uncompressed. Object layout:
//!
//! ```text
//! 1 Catalog   2 Pages   3 F1 (regular)   4 F2 (bold)   5 Info
//! 6 + 2i      Page i
//! 7 + 2i      Content stream of page i
//! ```

use std::io::Write;

use crate::render::font_metrics::{get_metrics, FontWeight};
use crate::render::layout::{DrawOp, LaidOutDocument, Page};
use crate::render::RenderFailure;

const FIRST_PAGE_OBJECT: usize = 6;
const PRODUCER: &str = "resume-builder-api";

/// Serializes a laid-out document into PDF bytes.
pub fn write_pdf(doc: &LaidOutDocument) -> Result<Vec<u8>, RenderFailure> {
    let style = &doc.style;
    let page_count = doc.pages.len();
    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", FIRST_PAGE_OBJECT + 2 * i))
        .collect();

    let mut objects: Vec<Vec<u8>> = Vec::with_capacity(5 + 2 * page_count);
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        )
        .into_bytes(),
    );
    objects.push(font_object(FontWeight::Regular));
    objects.push(font_object(FontWeight::Bold));

    let mut info = Vec::new();
    info.extend_from_slice(b"<< /Title ");
    info.extend_from_slice(&pdf_string(&doc.title));
    write!(info, " /Producer ({PRODUCER}) >>")?;
    objects.push(info);

    for (i, page) in doc.pages.iter().enumerate() {
        let contents_ref = FIRST_PAGE_OBJECT + 2 * i + 1;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                fmt_num(style.page_width),
                fmt_num(style.page_height),
                contents_ref
            )
            .into_bytes(),
        );

        let content = content_stream(page, style.page_height)?;
        let mut stream = Vec::with_capacity(content.len() + 64);
        write!(stream, "<< /Length {} >>\nstream\n", content.len())?;
        stream.extend_from_slice(&content);
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        write!(out, "{} 0 obj\n", i + 1)?;
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    write!(out, "xref\n0 {}\n", objects.len() + 1)?;
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        write!(out, "{offset:010} 00000 n \n")?;
    }
    write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    )?;

    Ok(out)
}

fn font_object(weight: FontWeight) -> Vec<u8> {
    let widths: Vec<String> = get_metrics(weight)
        .pdf_widths()
        .iter()
        .map(u16::to_string)
        .collect();
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding \
         /FirstChar 32 /LastChar 255 /Widths [{}] >>",
        weight.base_font(),
        widths.join(" ")
    )
    .into_bytes()
}

fn content_stream(page: &Page, page_height: f32) -> Result<Vec<u8>, RenderFailure> {
    let mut out = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                weight,
                text,
            } => {
                write!(
                    out,
                    "BT /{} {} Tf {} {} Td ",
                    weight.resource_name(),
                    fmt_num(*size),
                    fmt_num(*x),
                    fmt_num(page_height - y)
                )?;
                out.extend_from_slice(&pdf_string(text));
                out.extend_from_slice(b" Tj ET\n");
            }
            DrawOp::Rule {
                x1,
                x2,
                y,
                thickness,
            } => {
                let pdf_y = fmt_num(page_height - y);
                writeln!(
                    out,
                    "{} w {} {} m {} {} l S",
                    fmt_num(*thickness),
                    fmt_num(*x1),
                    pdf_y,
                    fmt_num(*x2),
                    pdf_y
                )?;
            }
        }
    }
    Ok(out)
}

/// Formats a coordinate with at most two decimals and no trailing zeros.
fn fmt_num(value: f32) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Encodes text as a PDF literal string in WinAnsi, escaping delimiters.
fn pdf_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for byte in text.chars().map(win_ansi_byte) {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            _ => out.push(byte),
        }
    }
    out.push(b')');
    out
}

/// Maps a character to its WinAnsiEncoding code; unmappable characters become `?`.
pub(crate) fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\t' | '\n' | '\r' => b' ',
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}
