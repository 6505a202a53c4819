//! HTTP handlers for PDF download, export and layout preview.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::profile::now_ms;
use crate::models::resume::Resume;
use crate::render::export::{
    attachment_disposition, export_file_name, export_object_key, export_to_dir, upload_pdf,
    PDF_CONTENT_TYPE,
};
use crate::render::{layout_resume, render_blocking, LaidOutDocument, RenderFailure, TemplateStyle};
use crate::resumes::repository::get_resume;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub file_name: String,
    /// `s3://bucket/key` or a filesystem path.
    pub location: String,
    pub size_bytes: usize,
}

/// Template style for `resume`, with the configured margin override applied.
pub fn style_for(resume: &Resume, config: &Config) -> TemplateStyle {
    let style = TemplateStyle::for_template(resume.template);
    match config.pdf_margin_pt {
        Some(margin) => style.with_margin(margin),
        None => style,
    }
}

/// GET /api/v1/resumes/:id/pdf
pub async fn handle_download_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let resume = get_resume(&state.db, id).await?;
    let file_name = export_file_name(&resume.full_name, now_ms());
    let style = style_for(&resume, &state.config);
    let bytes = render_blocking(resume, style).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PDF_CONTENT_TYPE)
        .header(header::CONTENT_DISPOSITION, attachment_disposition(&file_name))
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.into()))
}

/// POST /api/v1/resumes/:id/export
///
/// The document is fully rendered before anything is written, so a failed
/// render leaves no export behind.
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExportResponse>, AppError> {
    let resume = get_resume(&state.db, id).await?;
    let file_name = export_file_name(&resume.full_name, now_ms());
    let style = style_for(&resume, &state.config);

    let (location, size_bytes) = match state.config.export_dir.clone() {
        Some(dir) => {
            let name = file_name.clone();
            let (path, written) =
                tokio::task::spawn_blocking(move || export_to_dir(&dir, &name, &resume, &style))
                    .await
                    .map_err(|e| RenderFailure::Task(e.to_string()))??;
            (path.display().to_string(), written)
        }
        None => {
            let key = export_object_key(&resume.user_id, &file_name);
            let bytes = render_blocking(resume, style).await?;
            let size = bytes.len();
            upload_pdf(&state.s3, &state.config.s3_bucket, &key, bytes).await?;
            (format!("s3://{}/{key}", state.config.s3_bucket), size)
        }
    };

    info!("Exported resume {id} to {location}");
    Ok(Json(ExportResponse {
        file_name,
        location,
        size_bytes,
    }))
}

/// GET /api/v1/resumes/:id/layout
///
/// The laid-out pages as JSON, for previews without a PDF viewer.
pub async fn handle_layout_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LaidOutDocument>, AppError> {
    let resume = get_resume(&state.db, id).await?;
    let style = style_for(&resume, &state.config);
    let doc = tokio::task::spawn_blocking(move || layout_resume(&resume, &style))
        .await
        .map_err(|e| RenderFailure::Task(e.to_string()))??;
    Ok(Json(doc))
}
