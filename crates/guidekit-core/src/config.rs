//! Configuration parsing.
//!
//! `key=value` lines from `.guidekit/config` and an optional `--config` file.
//! Precedence: CLI flags > `--config` file > `.guidekit/config` > defaults.

use crate::format::FormatRules;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Project config file, relative to the workspace root.
pub const PROJECT_CONFIG_PATH: &str = ".guidekit/config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("invalid config line: {0}")]
    InvalidLine(String),
    #[error("invalid boolean value for {key}: {value}")]
    InvalidBool { key: String, value: String },
    #[error("invalid integer value for {key}: {value}")]
    InvalidInt { key: String, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Directories to scan for skills, in order.
    pub skills_dirs: Vec<PathBuf>,
    /// Catalog shipped with guidekit (see [`default_builtin_dir`]).
    pub skills_builtin_dir: PathBuf,
    /// Maximum skills returned per match; 0 means no limit.
    pub skills_max_selected: usize,
    /// Truncate injected bodies beyond this many characters; 0 means never.
    pub skills_max_body_chars: usize,
    /// Run formatters after edits (default: true).
    pub format_enabled: bool,
    pub format_rules: FormatRules,
}

impl Default for Config {
    fn default() -> Self {
        let mut skills_dirs = vec![PathBuf::from(".guidekit/skills")];
        if let Some(home) = dirs::home_dir() {
            skills_dirs.push(home.join(".guidekit/skills"));
        }
        Self {
            skills_dirs,
            skills_builtin_dir: default_builtin_dir(),
            skills_max_selected: 0,
            skills_max_body_chars: 0,
            format_enabled: true,
            format_rules: FormatRules::default(),
        }
    }
}

impl Config {
    /// Load defaults, then the project config under `workspace_root` if present,
    /// then `override_path` if given.
    pub fn load(workspace_root: &Path, override_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let project_config = workspace_root.join(PROJECT_CONFIG_PATH);
        if project_config.is_file() {
            config.load_file(&project_config)?;
        }
        if let Some(path) = override_path {
            config.load_file(path)?;
        }
        config.resolve_paths(workspace_root);
        Ok(config)
    }

    /// Load and merge values from a config file.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path)?;
        self.parse_content(&content, &path.display().to_string())
    }

    fn parse_content(&mut self, content: &str, source: &str) -> Result<(), ConfigError> {
        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::InvalidLine(line.to_string()));
            };

            let key = key.trim();
            let value = Self::unquote(value.trim());

            self.apply_value(key, &value, source)?;
        }
        Ok(())
    }

    fn unquote(value: &str) -> String {
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            return value[1..value.len() - 1].to_string();
        }
        value.to_string()
    }

    fn apply_value(&mut self, key: &str, value: &str, source: &str) -> Result<(), ConfigError> {
        if let Some(extension) = key.strip_prefix("format.") {
            if extension.is_empty() {
                return Err(ConfigError::InvalidLine(format!(
                    "format rule needs an extension: {key}"
                )));
            }
            self.format_rules.set(extension, value);
            return Ok(());
        }

        match key {
            "skills_dirs" => {
                self.skills_dirs = value.split_whitespace().map(PathBuf::from).collect();
            }
            "skills_builtin_dir" => self.skills_builtin_dir = PathBuf::from(value),
            "skills_max_selected" => self.skills_max_selected = Self::parse_int(key, value)?,
            "skills_max_body_chars" => self.skills_max_body_chars = Self::parse_int(key, value)?,
            "format_enabled" => self.format_enabled = Self::parse_bool(key, value)?,
            _ => {
                warn!(key, source, "unknown config key");
            }
        }
        Ok(())
    }

    fn parse_int(key: &str, value: &str) -> Result<usize, ConfigError> {
        value.parse().map_err(|_| ConfigError::InvalidInt {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" | "on" => Ok(true),
            "false" | "0" | "no" | "n" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Resolve relative paths against a workspace root and expand `~/`.
    pub fn resolve_paths(&mut self, workspace_root: &Path) {
        let resolve = |path: &Path| {
            let expanded = expand_tilde(path);
            if expanded.is_relative() {
                workspace_root.join(expanded)
            } else {
                expanded
            }
        };
        self.skills_dirs = self.skills_dirs.iter().map(|p| resolve(p)).collect();
        self.skills_builtin_dir = resolve(&self.skills_builtin_dir);
    }
}

/// `skills/` next to the running executable when present, otherwise the
/// catalog in the source tree this crate was built from.
pub fn default_builtin_dir() -> PathBuf {
    let installed = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("skills")))
        .filter(|dir| dir.is_dir());
    installed.unwrap_or_else(|| {
        let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../skills");
        std::fs::canonicalize(&source).unwrap_or(source)
    })
}

fn expand_tilde(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
