//! HTTP handlers for resume CRUD and the template catalogue.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{Resume, TemplateType};
use crate::resumes::repository::{
    create_resume, delete_resume, get_resume, list_resumes, rename_resume, update_resume,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub template: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResumeRequest {
    pub title: String,
    pub template: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplateInfo {
    pub id: TemplateType,
    pub name: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub title: String,
}

fn parse_template(raw: &str) -> Result<TemplateType, AppError> {
    raw.parse::<TemplateType>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

impl UpdateResumeRequest {
    /// Applies the request onto `current`, keeping identity fields.
    fn apply(self, current: Resume) -> Result<Resume, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        Ok(Resume {
            title,
            template: parse_template(&self.template)?,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            summary: self.summary,
            education: self.education,
            skills: self.skills,
            experience: self.experience,
            projects: self.projects,
            ..current
        })
    }
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<TemplateInfo>> {
    Json(
        TemplateType::ALL
            .into_iter()
            .map(|id| TemplateInfo {
                id,
                name: id.display_name(),
            })
            .collect(),
    )
}

/// GET /api/v1/users/:uid/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<Vec<Resume>>, AppError> {
    Ok(Json(list_resumes(&state.db, &uid).await?))
}

/// POST /api/v1/users/:uid/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    let template = match req.template.as_deref() {
        Some(raw) => parse_template(raw)?,
        None => TemplateType::default(),
    };
    let resume = create_resume(&state.db, &uid, &req.title, template).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Resume>, AppError> {
    Ok(Json(get_resume(&state.db, id).await?))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResumeRequest>,
) -> Result<Json<Resume>, AppError> {
    let current = get_resume(&state.db, id).await?;
    let updated = req.apply(current)?;
    Ok(Json(update_resume(&state.db, &updated).await?))
}

/// PATCH /api/v1/resumes/:id/title
pub async fn handle_rename_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<Resume>, AppError> {
    Ok(Json(rename_resume(&state.db, id, &req.title).await?))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_resume(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, template: &str) -> UpdateResumeRequest {
        UpdateResumeRequest {
            title: title.to_string(),
            template: template.to_string(),
            full_name: "Ada Lovelace".to_string(),
            email: String::new(),
            phone: String::new(),
            summary: "Analyst".to_string(),
            education: vec!["Home schooled".to_string()],
            skills: vec![],
            experience: vec![],
            projects: vec![],
        }
    }

    #[test]
    fn test_apply_keeps_identity_fields() {
        let current = Resume {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            created_at: 123,
            ..Resume::default()
        };
        let updated = request("Engine notes", "Creative").apply(current.clone()).unwrap();
        assert_eq!(updated.id, current.id);
        assert_eq!(updated.user_id, "u1");
        assert_eq!(updated.created_at, 123);
        assert_eq!(updated.template, TemplateType::Creative);
        assert_eq!(updated.education, vec!["Home schooled"]);
    }

    #[test]
    fn test_apply_rejects_blank_title_and_unknown_template() {
        assert!(matches!(
            request(" ", "modern").apply(Resume::default()),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            request("ok", "baroque").apply(Resume::default()),
            Err(AppError::Validation(_))
        ));
    }
}
