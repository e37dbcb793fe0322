//! Skill descriptor types and SKILL.md parsing.
//!
//! A skill is a directory containing a `SKILL.md` file: YAML frontmatter
//! (`name`, `description`, optional `triggers`) between `---` lines, followed
//! by the markdown guidance body.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a skill was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLocation {
    /// Under the workspace root (e.g., `.guidekit/skills`).
    Project,
    /// Anywhere else (home directory, built-in catalog).
    Global,
}

impl SkillLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Global => "global",
        }
    }
}

/// A loaded skill: trigger metadata plus the guidance body.
///
/// Descriptors are built once while loading the catalog and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDescriptor {
    /// Unique skill name (1-64 chars, lowercase alphanumeric + hyphens).
    pub name: String,
    /// Free-text trigger description: what the skill covers and when to use it.
    pub description: String,
    /// Extra trigger keywords declared in frontmatter.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<String>,
    /// Guidance text following the frontmatter.
    pub body: String,
    /// Skill directory.
    pub path: PathBuf,
    pub location: SkillLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkillError {
    #[error("missing YAML frontmatter")]
    MissingFrontmatter,
    #[error("invalid YAML frontmatter: {0}")]
    InvalidYaml(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("invalid description: {0}")]
    InvalidDescription(String),
    #[error("invalid trigger: {0}")]
    InvalidTrigger(String),
}

#[derive(Debug, Deserialize)]
struct RawFrontmatter {
    name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    triggers: Vec<String>,
}

/// Validates a skill name.
///
/// Rules:
/// - 1-64 characters
/// - Lowercase letters, numbers, and hyphens only
/// - No leading, trailing, or consecutive hyphens
pub fn validate_name(name: &str) -> Result<(), SkillError> {
    if name.is_empty() {
        return Err(SkillError::InvalidName("empty name".to_string()));
    }
    if name.len() > 64 {
        return Err(SkillError::InvalidName(format!(
            "name is {} characters, limit is 64",
            name.len()
        )));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(SkillError::InvalidName(
            "leading or trailing hyphen".to_string(),
        ));
    }
    if name.contains("--") {
        return Err(SkillError::InvalidName(
            "repeated hyphen".to_string(),
        ));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-')
    {
        return Err(SkillError::InvalidName(format!(
            "invalid character '{c}': only lowercase letters, numbers, and hyphens allowed"
        )));
    }
    Ok(())
}

/// Validates a trigger description (1-1024 characters).
pub fn validate_description(description: &str) -> Result<(), SkillError> {
    if description.trim().is_empty() {
        return Err(SkillError::InvalidDescription(
            "empty description".to_string(),
        ));
    }
    let chars = description.chars().count();
    if chars > 1024 {
        return Err(SkillError::InvalidDescription(format!(
            "description is {chars} characters, limit is 1024"
        )));
    }
    Ok(())
}

/// Splits SKILL.md content into `(frontmatter, body)`.
///
/// The body is returned with surrounding blank lines removed.
pub fn split_frontmatter(content: &str) -> Result<(&str, &str), SkillError> {
    let trimmed = content.trim_start();
    let after_open = trimmed
        .strip_prefix("---")
        .and_then(|rest| rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')))
        .ok_or(SkillError::MissingFrontmatter)?;

    let (frontmatter, rest) = if let Some(rest) = after_open.strip_prefix("---") {
        ("", rest)
    } else {
        let pos = after_open
            .find("\n---")
            .ok_or(SkillError::MissingFrontmatter)?;
        (
            after_open[..pos].trim_end_matches('\r'),
            &after_open[pos + 4..],
        )
    };

    Ok((frontmatter, trim_blank_lines(rest)))
}

/// Drop leading blank lines and trailing whitespace, keeping the indentation
/// of the first non-blank line.
fn trim_blank_lines(text: &str) -> &str {
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        start += line.len();
    }
    text[start..].trim_end()
}

/// Parses SKILL.md content into a validated descriptor.
pub fn parse_skill_md(
    content: &str,
    path: PathBuf,
    location: SkillLocation,
) -> Result<SkillDescriptor, SkillError> {
    let (frontmatter, body) = split_frontmatter(content)?;

    let raw: RawFrontmatter =
        serde_yaml::from_str(frontmatter).map_err(|e| SkillError::InvalidYaml(e.to_string()))?;

    let name = raw.name.ok_or(SkillError::MissingField("name"))?;
    validate_name(&name)?;

    let description = raw
        .description
        .ok_or(SkillError::MissingField("description"))?;
    validate_description(&description)?;

    if raw.triggers.iter().any(|t| t.trim().is_empty()) {
        return Err(SkillError::InvalidTrigger(
            "triggers cannot contain empty entries".to_string(),
        ));
    }

    Ok(SkillDescriptor {
        name,
        description,
        triggers: raw.triggers,
        body: body.to_string(),
        path,
        location,
    })
}
