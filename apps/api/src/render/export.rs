//! Export destinations for rendered PDFs: a local directory or the S3 bucket.

use std::path::{Path, PathBuf};

use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::errors::AppError;
use crate::models::resume::Resume;
use crate::render::{render_to_writer, RenderFailure, TemplateStyle};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// `{full name with spaces as underscores}_Resume_{timestamp}.pdf`.
///
/// Path separators, quotes and control characters are replaced too, and a
/// blank name drops the prefix.
pub fn export_file_name(full_name: &str, timestamp_ms: i64) -> String {
    let name: String = full_name
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | '"' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if name.is_empty() {
        format!("Resume_{timestamp_ms}.pdf")
    } else {
        format!("{name}_Resume_{timestamp_ms}.pdf")
    }
}

/// `Content-Disposition` value for downloading `file_name`.
///
/// `filename` carries an ASCII-only fallback; `filename*` carries the exact
/// UTF-8 name, percent-encoded.
pub fn attachment_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    let mut encoded = String::with_capacity(file_name.len());
    for byte in file_name.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

/// Object key under which an export is stored in S3.
pub fn export_object_key(user_id: &str, file_name: &str) -> String {
    format!("exports/{user_id}/{file_name}")
}

/// Renders `resume` into `dir/file_name`.
///
/// The PDF goes to a temporary file in the same directory and is renamed into
/// place only after a complete render and flush. On failure the temporary file
/// is removed and `file_name` is never created.
pub fn export_to_dir(
    dir: &Path,
    file_name: &str,
    resume: &Resume,
    style: &TemplateStyle,
) -> Result<(PathBuf, usize), RenderFailure> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".export-")
        .suffix(".pdf.part")
        .tempfile_in(dir)?;
    let written = render_to_writer(resume, style, tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;

    let target = dir.join(file_name);
    tmp.persist(&target).map_err(|e| RenderFailure::Write(e.error))?;
    info!("Wrote resume export to {}", target.display());
    Ok((target, written))
}

/// Uploads a finished PDF to S3.
pub async fn upload_pdf(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    bytes: Vec<u8>,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(bytes))
        .content_type(PDF_CONTENT_TYPE)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("PDF upload failed: {e}")))?;

    info!("Uploaded resume export to s3://{}/{}", bucket, key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_replaces_spaces() {
        assert_eq!(
            export_file_name("Ada King Lovelace", 1_700_000_000_000),
            "Ada_King_Lovelace_Resume_1700000000000.pdf"
        );
    }

    #[test]
    fn test_file_name_blank_name() {
        assert_eq!(export_file_name("   ", 5), "Resume_5.pdf");
    }

    #[test]
    fn test_file_name_strips_path_separators() {
        assert_eq!(export_file_name("../etc/passwd", 1), ".._etc_passwd_Resume_1.pdf");
    }

    #[test]
    fn test_file_name_replaces_quotes_and_control_characters() {
        assert_eq!(
            export_file_name("Robert \"Bob\" Smith", 1),
            "Robert__Bob__Smith_Resume_1.pdf"
        );
        assert_eq!(export_file_name("Ada\nLovelace\t", 1), "Ada_Lovelace_Resume_1.pdf");
    }

    #[test]
    fn test_disposition_is_a_valid_header_value() {
        for name in ["Robert \"Bob\" Smith", "Ada\r\nSet-Cookie: x", "Zoë Ångström"] {
            let value = attachment_disposition(&export_file_name(name, 1));
            assert!(
                axum::http::HeaderValue::from_str(&value).is_ok(),
                "rejected header for {name:?}: {value}"
            );
            assert_eq!(value.matches('"').count(), 2, "filename must be quoted once: {value}");
        }
    }

    #[test]
    fn test_disposition_encodes_non_ascii_names() {
        let value = attachment_disposition("Zoë_Resume_1.pdf");
        assert_eq!(
            value,
            "attachment; filename=\"Zo__Resume_1.pdf\"; filename*=UTF-8''Zo%C3%AB_Resume_1.pdf"
        );
    }

    #[test]
    fn test_disposition_plain_name_unchanged() {
        assert_eq!(
            attachment_disposition("Ada_Resume_1.pdf"),
            "attachment; filename=\"Ada_Resume_1.pdf\"; filename*=UTF-8''Ada_Resume_1.pdf"
        );
    }

    #[test]
    fn test_object_key_layout() {
        assert_eq!(
            export_object_key("u-1", "Ada_Resume_1.pdf"),
            "exports/u-1/Ada_Resume_1.pdf"
        );
    }

    fn sample() -> Resume {
        Resume {
            full_name: "Ada Lovelace".to_string(),
            summary: "Wrote the first program.".to_string(),
            ..Resume::default()
        }
    }

    fn file_names(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_export_to_dir_leaves_only_final_file() {
        let dir = tempfile::tempdir().unwrap();
        let style = TemplateStyle::default();
        let (path, written) =
            export_to_dir(dir.path(), "Ada_Resume_1.pdf", &sample(), &style).unwrap();

        assert_eq!(path, dir.path().join("Ada_Resume_1.pdf"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), written);
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert_eq!(file_names(dir.path()), vec!["Ada_Resume_1.pdf"], "no temp files left behind");
    }

    #[test]
    fn test_export_to_dir_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports").join("u-1");
        let (path, _) =
            export_to_dir(&nested, "x.pdf", &sample(), &TemplateStyle::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_failed_render_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let style = TemplateStyle::default().with_margin(500.0);
        let err = export_to_dir(dir.path(), "bad.pdf", &sample(), &style).unwrap_err();
        assert!(matches!(err, RenderFailure::Layout(_)));
        assert!(file_names(dir.path()).is_empty(), "partial export must not be visible");
    }
}
