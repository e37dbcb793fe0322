//! Skill catalog: directory scanning and loading.
//!
//! Scans the configured directories in order, then the built-in catalog. Each
//! immediate subdirectory holding a `SKILL.md` is one skill. The resulting
//! [`Catalog`] is read-only.

use guidekit_core::skills::{parse_skill_md, SkillDescriptor, SkillError, SkillLocation};
use guidekit_core::Config;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const SKILL_FILE: &str = "SKILL.md";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate skill name '{name}' in {} and {}", first.display(), second.display())]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// A `SKILL.md` that could not be read or parsed.
#[derive(Debug)]
pub struct SkippedSkill {
    /// Directory name, used when the frontmatter never yielded a name.
    pub name: String,
    pub path: PathBuf,
    pub error: SkippedReason,
}

#[derive(Debug, Error)]
pub enum SkippedReason {
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] SkillError),
}

#[derive(Debug, Default)]
pub struct Catalog {
    skills: Vec<SkillDescriptor>,
    skipped: Vec<SkippedSkill>,
}

impl Catalog {
    /// Build a catalog from already-parsed descriptors.
    pub fn from_skills(skills: Vec<SkillDescriptor>) -> Result<Self, CatalogError> {
        let mut seen: HashMap<&str, &Path> = HashMap::new();
        for skill in &skills {
            if let Some(first) = seen.insert(skill.name.as_str(), skill.path.as_path()) {
                return Err(CatalogError::DuplicateName {
                    name: skill.name.clone(),
                    first: first.to_path_buf(),
                    second: skill.path.clone(),
                });
            }
        }
        Ok(Self {
            skills,
            skipped: Vec::new(),
        })
    }

    /// Load every skill visible from `workspace_root` under `config`.
    ///
    /// Unreadable or invalid skills are skipped and kept in [`Catalog::skipped`].
    /// A name defined twice fails the whole load.
    pub fn load(config: &Config, workspace_root: &Path) -> Result<Self, CatalogError> {
        let mut skills = Vec::new();
        let mut skipped = Vec::new();

        let resolve = |dir: &Path| {
            if dir.is_relative() {
                workspace_root.join(dir)
            } else {
                dir.to_path_buf()
            }
        };
        for dir in &config.skills_dirs {
            let resolved = resolve(dir);
            let location = if resolved.starts_with(workspace_root) {
                SkillLocation::Project
            } else {
                SkillLocation::Global
            };
            scan_directory(&resolved, location, &mut skills, &mut skipped);
        }
        // The shipped catalog is global even when it sits inside the workspace.
        scan_directory(
            &resolve(&config.skills_builtin_dir),
            SkillLocation::Global,
            &mut skills,
            &mut skipped,
        );

        let mut catalog = Self::from_skills(skills)?;
        catalog.skipped = skipped;

        debug!(
            count = catalog.skills.len(),
            skipped = catalog.skipped.len(),
            "loaded skill catalog"
        );
        Ok(catalog)
    }

    pub fn skills(&self) -> &[SkillDescriptor] {
        &self.skills
    }

    pub fn skipped(&self) -> &[SkippedSkill] {
        &self.skipped
    }

    pub fn get(&self, name: &str) -> Option<&SkillDescriptor> {
        self.skills.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

fn scan_directory(
    dir: &Path,
    location: SkillLocation,
    skills: &mut Vec<SkillDescriptor>,
    skipped: &mut Vec<SkippedSkill>,
) {
    if !dir.is_dir() {
        debug!(path = %dir.display(), "skills directory not found, skipping");
        return;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "failed to read skills directory");
            return;
        }
    };

    // read_dir order is platform dependent; sort so duplicate reports are stable.
    let mut skill_dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    skill_dirs.sort();

    for skill_dir in skill_dirs {
        let skill_md_path = skill_dir.join(SKILL_FILE);
        if !skill_md_path.is_file() {
            debug!(path = %skill_dir.display(), "no SKILL.md found, skipping");
            continue;
        }

        let parsed = fs::read_to_string(&skill_md_path)
            .map_err(SkippedReason::from)
            .and_then(|content| {
                parse_skill_md(&content, skill_dir.clone(), location).map_err(SkippedReason::from)
            });

        match parsed {
            Ok(skill) => skills.push(skill),
            Err(error) => {
                warn!(
                    path = %skill_md_path.display(),
                    error = %error,
                    "skipping invalid SKILL.md"
                );
                let name = skill_dir
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unknown")
                    .to_string();
                skipped.push(SkippedSkill {
                    name,
                    path: skill_md_path,
                    error,
                });
            }
        }
    }
}
