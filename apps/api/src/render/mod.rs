// Resume rendering: markup parsing, greedy word wrap, pagination and PDF output.
// Layout is CPU-bound and runs inside tokio::task::spawn_blocking when called from handlers.

pub mod export;
pub mod font_metrics;
pub mod handlers;
pub mod layout;
pub mod markup;
pub mod pdf;
pub mod template;
pub mod wrap;

use std::io::Write;

use thiserror::Error;
use tracing::{debug, error};

use crate::models::resume::Resume;

pub use layout::{layout_resume, LaidOutDocument};
pub use template::TemplateStyle;

#[derive(Debug, Error)]
pub enum RenderFailure {
    #[error("layout error: {0}")]
    Layout(String),

    #[error("write error: {0}")]
    Write(#[from] std::io::Error),

    #[error("render task failed: {0}")]
    Task(String),
}

/// Lays out and serializes a resume entirely in memory.
///
/// Either the complete document is returned or nothing is.
pub fn render_resume(resume: &Resume, style: &TemplateStyle) -> Result<Vec<u8>, RenderFailure> {
    let doc = layout_resume(resume, style)?;
    let bytes = pdf::write_pdf(&doc)?;
    debug!(
        resume_id = %resume.id,
        pages = doc.pages.len(),
        bytes = bytes.len(),
        "Rendered resume PDF"
    );
    Ok(bytes)
}

/// Renders a resume and writes it to `sink` only once the whole document is ready.
pub fn render_to_writer<W: Write>(
    resume: &Resume,
    style: &TemplateStyle,
    sink: &mut W,
) -> Result<usize, RenderFailure> {
    let bytes = render_resume(resume, style)?;
    sink.write_all(&bytes)?;
    sink.flush()?;
    Ok(bytes.len())
}

/// Runs `render_resume` on the blocking pool.
pub async fn render_blocking(resume: Resume, style: TemplateStyle) -> Result<Vec<u8>, RenderFailure> {
    tokio::task::spawn_blocking(move || render_resume(&resume, &style))
        .await
        .map_err(|e| {
            error!("spawn_blocking failed while rendering: {e}");
            RenderFailure::Task(e.to_string())
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::TemplateType;

    fn make_resume() -> Resume {
        Resume {
            full_name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            summary: "Compiler pioneer and **COBOL** co-designer.".to_string(),
            experience: vec!["Led the UNIVAC I programming team".to_string()],
            ..Resume::default()
        }
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_render_to_writer_writes_complete_pdf() {
        let style = TemplateStyle::for_template(TemplateType::Modern);
        let mut sink = Vec::new();
        let written = render_to_writer(&make_resume(), &style, &mut sink).unwrap();
        assert_eq!(written, sink.len());
        assert!(sink.starts_with(b"%PDF-"));
        assert!(sink.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn test_layout_failure_writes_nothing() {
        let style = TemplateStyle::for_template(TemplateType::Modern).with_margin(500.0);
        let mut sink = Vec::new();
        let err = render_to_writer(&make_resume(), &style, &mut sink).unwrap_err();
        assert!(matches!(err, RenderFailure::Layout(_)));
        assert!(sink.is_empty(), "no partial output on failure");
    }

    #[test]
    fn test_sink_failure_is_reported() {
        let style = TemplateStyle::for_template(TemplateType::Modern);
        let err = render_to_writer(&make_resume(), &style, &mut FailingSink).unwrap_err();
        assert!(matches!(err, RenderFailure::Write(_)));
    }

    #[test]
    fn test_rendered_text_is_extractable() {
        let style = TemplateStyle::for_template(TemplateType::Professional);
        let bytes = render_resume(&make_resume(), &style).unwrap();
        let text = pdf_extract::extract_text_from_mem(&bytes).unwrap();
        assert!(text.contains("Grace Hopper"), "extracted: {text}");
        assert!(text.contains("PROFESSIONAL SUMMARY"), "extracted: {text}");
        assert!(text.contains("COBOL"), "extracted: {text}");
    }

    #[tokio::test]
    async fn test_render_blocking_matches_sync_render() {
        let style = TemplateStyle::for_template(TemplateType::Creative);
        let expected = render_resume(&make_resume(), &style).unwrap();
        let actual = render_blocking(make_resume(), style).await.unwrap();
        assert_eq!(actual, expected, "rendering is deterministic");
    }
}
