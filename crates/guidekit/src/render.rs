//! Rendering selected skills for injection into an assistant's context.

use guidekit_core::SkillDescriptor;
use tracing::warn;

/// Render each skill's body verbatim between `Reading:` / `Skill read:` lines.
///
/// ```text
/// Reading: <skill-name>
/// Base directory: <skill-directory>
///
/// <body>
///
/// Skill read: <skill-name>
/// ```
///
/// Blocks are separated by a blank line. An empty slice renders as "".
/// `max_body_chars` of 0 disables truncation.
pub fn render_selection(skills: &[&SkillDescriptor], max_body_chars: usize) -> String {
    skills
        .iter()
        .map(|skill| render_skill(skill, max_body_chars))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_skill(skill: &SkillDescriptor, max_body_chars: usize) -> String {
    let body = truncate_body(skill, max_body_chars);
    format!(
        "Reading: {}\nBase directory: {}\n\n{}\n\nSkill read: {}",
        skill.name,
        skill.path.display(),
        body,
        skill.name
    )
}

fn truncate_body(skill: &SkillDescriptor, max_chars: usize) -> String {
    if max_chars == 0 || skill.body.chars().count() <= max_chars {
        return skill.body.clone();
    }

    let cut = skill
        .body
        .char_indices()
        .nth(max_chars)
        .map_or(skill.body.len(), |(i, _)| i);
    warn!(
        name = %skill.name,
        max_chars,
        original_chars = skill.body.chars().count(),
        "skill body truncated"
    );
    format!("{}\n\n[Content truncated...]", &skill.body[..cut])
}

/// Render the catalog as an `<available_skills>` XML block.
pub fn render_catalog(skills: &[SkillDescriptor]) -> String {
    if skills.is_empty() {
        return String::new();
    }

    let skill_tags: Vec<String> = skills
        .iter()
        .map(|s| {
            format!(
                "<skill>\n<name>{}</name>\n<description>{}</description>\n<location>{}</location>\n</skill>",
                escape_xml(&s.name),
                escape_xml(&s.description),
                s.location.as_str()
            )
        })
        .collect();

    format!(
        "<available_skills>\n\n{}\n\n</available_skills>",
        skill_tags.join("\n\n")
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
