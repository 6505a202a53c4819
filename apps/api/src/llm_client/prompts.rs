// Prompt builders for resume enhancement.
// The section markers double as the parse anchors for the model's reply.

use crate::models::resume::Resume;

pub const SUMMARY_MARKER: &str = "[PROFESSIONAL SUMMARY]";
pub const EDUCATION_MARKER: &str = "[EDUCATION]";
pub const SKILLS_MARKER: &str = "[TECHNICAL SKILLS]";
pub const EXPERIENCE_MARKER: &str = "[RELEVANT EXPERIENCE]";
pub const PROJECTS_MARKER: &str = "[PROJECTS]";

/// Single-field rewrite of a summary.
pub fn summary_prompt(summary: &str) -> String {
    format!(
        "Improve this resume summary. Make it professional, impactful, with action verbs, \
         2-3 sentences max.\n\nOriginal: \"{summary}\"\n\nProvide ONLY improved text:"
    )
}

fn or_placeholder(text: String, what: &str) -> String {
    if text.trim().is_empty() {
        format!("No {what} provided")
    } else {
        text
    }
}

/// Whole-resume rewrite. The reply must repeat the five bracketed markers.
pub fn resume_prompt(resume: &Resume) -> String {
    let summary = or_placeholder(resume.summary.clone(), "summary");
    let education = or_placeholder(resume.education.join("\n"), "education");
    let skills = or_placeholder(resume.skills.join(", "), "skills");
    let experience = or_placeholder(resume.experience.join("\n"), "experience");
    let projects = or_placeholder(resume.projects.join("\n"), "projects");

    format!(
        "Improve this resume to be more professional and impactful. Enhance each section \
with action verbs and quantifiable achievements.

Return the response in EXACTLY this format (with these exact bracket markers):

{SUMMARY_MARKER}
{summary}

{EDUCATION_MARKER}
{education}

{SKILLS_MARKER}
{skills}

{EXPERIENCE_MARKER}
{experience}

{PROJECTS_MARKER}
{projects}

Now improve each section. Return in this exact format:

{SUMMARY_MARKER}
[Your improved summary here - make it powerful and concise]

{EDUCATION_MARKER}
[Line 1 improved]
[Line 2 improved]

{SKILLS_MARKER}
[Skill1, Skill2, Skill3 - improved and enhanced]

{EXPERIENCE_MARKER}
[Experience 1 improved with action verbs and metrics]
[Experience 2 improved with action verbs and metrics]

{PROJECTS_MARKER}
[Project 1 improved description]
[Project 2 improved description]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompt_quotes_original() {
        let prompt = summary_prompt("I write code");
        assert!(prompt.contains("Original: \"I write code\""));
        assert!(prompt.ends_with("Provide ONLY improved text:"));
    }

    #[test]
    fn test_resume_prompt_lists_sections_in_order() {
        let resume = Resume {
            summary: "Engineer".to_string(),
            skills: vec!["Rust".to_string(), "SQL".to_string()],
            ..Resume::default()
        };
        let prompt = resume_prompt(&resume);
        let positions: Vec<usize> = [
            SUMMARY_MARKER,
            EDUCATION_MARKER,
            SKILLS_MARKER,
            EXPERIENCE_MARKER,
            PROJECTS_MARKER,
        ]
        .iter()
        .map(|m| prompt.find(m).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.contains("Rust, SQL"));
        assert!(prompt.contains("No education provided"));
    }
}
