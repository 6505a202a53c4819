//! HTTP handlers for AI rewriting of summaries and resumes.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enhance::{improve_resume, improve_summary};
use crate::errors::AppError;
use crate::models::resume::Resume;
use crate::resumes::repository::get_resume;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// POST /api/v1/enhance/summary
pub async fn handle_improve_summary(
    State(state): State<AppState>,
    Json(req): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    if req.summary.trim().is_empty() {
        return Err(AppError::Validation("summary must not be empty".to_string()));
    }
    let summary = improve_summary(state.llm.as_ref(), &req.summary).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// POST /api/v1/resumes/:id/enhance
///
/// Returns the improved resume without saving it; the client saves with PUT.
pub async fn handle_improve_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Resume>, AppError> {
    let resume = get_resume(&state.db, id).await?;
    Ok(Json(improve_resume(state.llm.as_ref(), &resume).await?))
}
