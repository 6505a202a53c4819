use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::now_ms;
use crate::models::resume::{Resume, ResumeRow, TemplateType};

const RESUME_COLUMNS: &str = "id, user_id, title, template_type, created_at, full_name, email, \
     phone, summary, education, skills, experience, projects";

/// A fresh, empty resume owned by `user_id`.
pub fn new_resume(user_id: &str, title: &str, template: TemplateType, created_at: i64) -> Resume {
    let title = title.trim();
    Resume {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        title: if title.is_empty() {
            "Untitled Resume".to_string()
        } else {
            title.to_string()
        },
        template,
        created_at,
        ..Resume::default()
    }
}

/// All resumes of a user, newest first.
pub async fn list_resumes(pool: &PgPool, user_id: &str) -> Result<Vec<Resume>, AppError> {
    let rows = sqlx::query_as::<_, ResumeRow>(&format!(
        "SELECT {RESUME_COLUMNS} FROM resumes WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Resume::from).collect())
}

pub async fn get_resume(pool: &PgPool, id: Uuid) -> Result<Resume, AppError> {
    let row = sqlx::query_as::<_, ResumeRow>(&format!(
        "SELECT {RESUME_COLUMNS} FROM resumes WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(row.into())
}

pub async fn create_resume(
    pool: &PgPool,
    user_id: &str,
    title: &str,
    template: TemplateType,
) -> Result<Resume, AppError> {
    if user_id.trim().is_empty() {
        return Err(AppError::Validation("user id must not be empty".to_string()));
    }
    let resume = new_resume(user_id, title, template, now_ms());
    sqlx::query(
        r#"
        INSERT INTO resumes (id, user_id, title, template_type, created_at, full_name, email,
                             phone, summary, education, skills, experience, projects)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(resume.id)
    .bind(&resume.user_id)
    .bind(&resume.title)
    .bind(resume.template.as_str())
    .bind(resume.created_at)
    .bind(&resume.full_name)
    .bind(&resume.email)
    .bind(&resume.phone)
    .bind(&resume.summary)
    .bind(&resume.education)
    .bind(&resume.skills)
    .bind(&resume.experience)
    .bind(&resume.projects)
    .execute(pool)
    .await?;

    info!("Created resume {} for user {}", resume.id, resume.user_id);
    Ok(resume)
}

/// Replaces the editable content of a resume. Owner and creation time are kept.
pub async fn update_resume(pool: &PgPool, resume: &Resume) -> Result<Resume, AppError> {
    let row = sqlx::query_as::<_, ResumeRow>(&format!(
        r#"
        UPDATE resumes SET
            title = $2, template_type = $3, full_name = $4, email = $5, phone = $6,
            summary = $7, education = $8, skills = $9, experience = $10, projects = $11
        WHERE id = $1
        RETURNING {RESUME_COLUMNS}
        "#
    ))
    .bind(resume.id)
    .bind(&resume.title)
    .bind(resume.template.as_str())
    .bind(&resume.full_name)
    .bind(&resume.email)
    .bind(&resume.phone)
    .bind(&resume.summary)
    .bind(&resume.education)
    .bind(&resume.skills)
    .bind(&resume.experience)
    .bind(&resume.projects)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Resume {} not found", resume.id)))?;
    Ok(row.into())
}

pub async fn rename_resume(pool: &PgPool, id: Uuid, title: &str) -> Result<Resume, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    let row = sqlx::query_as::<_, ResumeRow>(&format!(
        "UPDATE resumes SET title = $2 WHERE id = $1 RETURNING {RESUME_COLUMNS}"
    ))
    .bind(id)
    .bind(title)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(row.into())
}

pub async fn delete_resume(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    info!("Deleted resume {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_resume_is_empty_and_owned() {
        let resume = new_resume("u1", "  Backend roles ", TemplateType::Academic, 99);
        assert_eq!(resume.user_id, "u1");
        assert_eq!(resume.title, "Backend roles");
        assert_eq!(resume.template, TemplateType::Academic);
        assert_eq!(resume.created_at, 99);
        assert!(resume.summary.is_empty() && resume.education.is_empty());
        assert!(!resume.id.is_nil());
    }

    #[test]
    fn test_new_resume_blank_title_gets_default() {
        let resume = new_resume("u1", "   ", TemplateType::Modern, 1);
        assert_eq!(resume.title, "Untitled Resume");
    }

    #[test]
    fn test_new_resumes_get_distinct_ids() {
        let a = new_resume("u1", "a", TemplateType::Modern, 1);
        let b = new_resume("u1", "b", TemplateType::Modern, 1);
        assert_ne!(a.id, b.id);
    }
}
