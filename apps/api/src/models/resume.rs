use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Cosmetic layout variant chosen for a resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    #[default]
    Modern,
    Professional,
    Creative,
    Academic,
}

impl TemplateType {
    pub const ALL: [TemplateType; 4] = [
        TemplateType::Modern,
        TemplateType::Professional,
        TemplateType::Creative,
        TemplateType::Academic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Modern => "modern",
            TemplateType::Professional => "professional",
            TemplateType::Creative => "creative",
            TemplateType::Academic => "academic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TemplateType::Modern => "Modern - Clean & Minimal",
            TemplateType::Professional => "Professional - Traditional",
            TemplateType::Creative => "Creative - Bold & Modern",
            TemplateType::Academic => "Academic - Formal",
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown template type '{0}'")]
pub struct UnknownTemplate(pub String);

impl FromStr for TemplateType {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

/// A resume as edited by the user and consumed by the renderer.
///
/// List fields keep insertion order; an empty list or string means the
/// corresponding section is omitted from the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resume {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub template: TemplateType,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
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

/// Row shape of the `resumes` table.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub template_type: String,
    pub created_at: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub summary: String,
    pub education: Vec<String>,
    pub skills: Vec<String>,
    pub experience: Vec<String>,
    pub projects: Vec<String>,
}

impl From<ResumeRow> for Resume {
    fn from(row: ResumeRow) -> Self {
        // Rows written before a template was chosen fall back to the default.
        let template = row.template_type.parse().unwrap_or_default();
        Resume {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            template,
            created_at: row.created_at,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            summary: row.summary,
            education: row.education,
            skills: row.skills,
            experience: row.experience,
            projects: row.projects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parse_is_case_insensitive() {
        assert_eq!("Modern".parse::<TemplateType>(), Ok(TemplateType::Modern));
        assert_eq!(
            " ACADEMIC ".parse::<TemplateType>(),
            Ok(TemplateType::Academic)
        );
    }

    #[test]
    fn test_template_parse_rejects_unknown() {
        let err = "minimal".parse::<TemplateType>().unwrap_err();
        assert_eq!(err, UnknownTemplate("minimal".to_string()));
    }

    #[test]
    fn test_template_serde_lowercase() {
        let json = serde_json::to_string(&TemplateType::Professional).unwrap();
        assert_eq!(json, "\"professional\"");
    }

    #[test]
    fn test_row_with_unknown_template_falls_back_to_modern() {
        let row = ResumeRow {
            id: Uuid::new_v4(),
            user_id: "u-1".to_string(),
            title: "Backend".to_string(),
            template_type: "".to_string(),
            created_at: 1,
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            summary: String::new(),
            education: vec!["BSc".to_string()],
            skills: vec![],
            experience: vec![],
            projects: vec![],
        };
        let resume = Resume::from(row);
        assert_eq!(resume.template, TemplateType::Modern);
        assert_eq!(resume.education, vec!["BSc"]);
    }

    #[test]
    fn test_resume_deserializes_with_missing_lists() {
        let json = serde_json::json!({
            "id": Uuid::nil(),
            "user_id": "u-1",
            "title": "t",
            "template": "creative",
            "created_at": 5,
            "full_name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "",
            "summary": ""
        });
        let resume: Resume = serde_json::from_value(json).unwrap();
        assert_eq!(resume.template, TemplateType::Creative);
        assert!(resume.projects.is_empty());
    }
}
