// AI-assisted rewriting of resume text through a `TextGenerator`.

pub mod handlers;

use tracing::{debug, info};

use crate::llm_client::prompts::{
    resume_prompt, summary_prompt, EDUCATION_MARKER, EXPERIENCE_MARKER, PROJECTS_MARKER,
    SKILLS_MARKER, SUMMARY_MARKER,
};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::resume::Resume;

/// Rewrites a single summary paragraph.
pub async fn improve_summary(
    generator: &dyn TextGenerator,
    summary: &str,
) -> Result<String, LlmError> {
    let improved = generator.generate(&summary_prompt(summary)).await?;
    let improved = improved.trim();
    if improved.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    debug!("Improved summary ({} chars)", improved.len());
    Ok(improved.to_string())
}

/// Rewrites every content section of `resume` in one call.
///
/// Identity and contact fields are never touched. A section the reply does not
/// yield keeps its original content.
pub async fn improve_resume(
    generator: &dyn TextGenerator,
    resume: &Resume,
) -> Result<Resume, LlmError> {
    let reply = generator.generate(&resume_prompt(resume)).await?;
    let improved = apply_improvements(&reply, resume);
    info!("Applied AI improvements to resume {}", resume.id);
    Ok(improved)
}

/// Text between `start` and the next `end` marker (or the end of `text`).
/// Empty when `start` is missing.
pub fn extract_section<'a>(text: &'a str, start: &str, end: Option<&str>) -> &'a str {
    let Some(found) = text.find(start) else {
        return "";
    };
    let body = &text[found + start.len()..];
    let stop = end
        .and_then(|marker| body.find(marker))
        .unwrap_or(body.len());
    body[..stop].trim()
}

fn split_entries(section: &str, separator: char) -> Vec<String> {
    section
        .split(separator)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn or_original(parsed: Vec<String>, original: &[String]) -> Vec<String> {
    if parsed.is_empty() {
        original.to_vec()
    } else {
        parsed
    }
}

/// Merges a marker-delimited reply into a copy of `original`.
pub fn apply_improvements(reply: &str, original: &Resume) -> Resume {
    let summary = extract_section(reply, SUMMARY_MARKER, Some(EDUCATION_MARKER));
    let education = extract_section(reply, EDUCATION_MARKER, Some(SKILLS_MARKER));
    let skills = extract_section(reply, SKILLS_MARKER, Some(EXPERIENCE_MARKER));
    let experience = extract_section(reply, EXPERIENCE_MARKER, Some(PROJECTS_MARKER));
    let projects = extract_section(reply, PROJECTS_MARKER, None);

    Resume {
        summary: if summary.is_empty() {
            original.summary.clone()
        } else {
            summary.to_string()
        },
        education: or_original(split_entries(education, '\n'), &original.education),
        skills: or_original(split_entries(skills, ','), &original.skills),
        experience: or_original(split_entries(experience, '\n'), &original.experience),
        projects: or_original(split_entries(projects, '\n'), &original.projects),
        ..original.clone()
    }
}
